//! The marking session: single owner of all engine state
//!
//! A [`MarkingSession`] holds the boundary points, the canonical quad and
//! its homography, both slice axes, the copied-offset clipboard, and the
//! most recent bit-location snapshot with its proximity index. Operations
//! are plain methods with no notion of an active tool or mode; a UI layer
//! decides which of them a given click maps to.
//!
//! Derived state is generation-stamped. Editing the bounds bumps the bounds
//! revision (invalidating the homography until it is rebuilt, which happens
//! inline); editing bounds or slice values bumps the grid revision
//! (invalidating the bit-location snapshot and index until
//! [`MarkingSession::rebuild_bit_grid`] runs). Reading through a stale
//! stamp fails with [`Error::StaleDerivedState`] instead of quietly handing
//! out outdated geometry. Selection changes stamp nothing: they do not move
//! any geometry.

use log::debug;

use crate::error::{Error, Result};
use crate::grid::{Orientation, SliceAxis, builder};
use crate::models::{BoundsQuad, DieDescription, Line, Point};
use crate::rectify::Homography;
use crate::utils::geometry::segment_point_distance;
use crate::utils::kdtree::KdTree;

/// Pick radius (pixels) within which a click grabs an existing bounds point
pub const DEFAULT_POINT_PICK_RADIUS: f64 = 10.0;

/// Hit distance (pixels) within which a click selects a slice line
pub const DEFAULT_SLICE_PICK_DISTANCE: f64 = 5.0;

/// A slice line snapshot handed to the renderer
///
/// Two highlight states exist: selected and not. The renderer picks the
/// two colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceLine {
    /// Image-space segment
    pub line: Line,
    /// Whether this slice is currently selected
    pub selected: bool,
}

/// A derived value together with the input revision it was built from
struct Stamped<T> {
    value: T,
    revision: u64,
}

/// Owner of the rectification and grid state for one die image
pub struct MarkingSession {
    bounds_points: Vec<Point>,
    quad: Option<BoundsQuad>,
    homography: Option<Stamped<Homography>>,
    horiz: SliceAxis,
    vert: SliceAxis,
    copied_offsets: Vec<f64>,
    bit_locations: Option<Stamped<Vec<Point>>>,
    proximity: Option<Stamped<KdTree>>,
    bounds_revision: u64,
    grid_revision: u64,
}

impl Default for MarkingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkingSession {
    /// Create an empty session
    pub fn new() -> Self {
        Self {
            bounds_points: Vec::new(),
            quad: None,
            homography: None,
            horiz: SliceAxis::new(),
            vert: SliceAxis::new(),
            copied_offsets: Vec::new(),
            bit_locations: None,
            proximity: None,
            bounds_revision: 0,
            grid_revision: 0,
        }
    }

    // ----- bounds editing ---------------------------------------------

    /// Boundary points as currently stored (canonical once all 4 exist)
    pub fn bounds_points(&self) -> &[Point] {
        &self.bounds_points
    }

    /// The canonical boundary polygon, if a valid quad exists
    pub fn bounds_polygon(&self) -> Option<[Point; 4]> {
        self.quad.map(|q| *q.corners())
    }

    /// Append a boundary point; the fourth one canonicalizes the quad and
    /// builds the homography
    ///
    /// Returns whether the point was taken; a fifth point is refused.
    pub fn add_bounds_point(&mut self, position: Point) -> Result<bool> {
        if self.bounds_points.len() >= 4 {
            return Ok(false);
        }
        self.bounds_points.push(position);
        self.bump_bounds();
        if self.bounds_points.len() == 4 {
            self.rebuild_region()?;
        }
        Ok(true)
    }

    /// Index of the stored bounds point within `radius` of a click, if any
    ///
    /// The closest qualifying point wins. Used to start a corner drag.
    pub fn pick_bounds_point(&self, position: Point, radius: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, p) in self.bounds_points.iter().enumerate() {
            let d = p.distance(&position);
            if d < radius && best.is_none_or(|(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Replace one boundary point (corner drag)
    ///
    /// With all 4 points present the quad is re-canonicalized and the
    /// homography rebuilt immediately; the dragged point may land in a
    /// different canonical slot afterwards.
    pub fn move_bounds_point(&mut self, index: usize, position: Point) -> Result<()> {
        let len = self.bounds_points.len();
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        self.bounds_points[index] = position;
        self.bump_bounds();
        if self.bounds_points.len() == 4 {
            self.rebuild_region()?;
        }
        Ok(())
    }

    /// Discard the region: bounds, homography, and both slice axes
    ///
    /// With no valid quad the slice offsets are meaningless, so they go
    /// too. The copied-offset clipboard survives.
    pub fn reset_bounds(&mut self) {
        self.bounds_points.clear();
        self.quad = None;
        self.homography = None;
        self.horiz.clear();
        self.vert.clear();
        self.bit_locations = None;
        self.proximity = None;
        self.bump_bounds();
    }

    // ----- slice editing ----------------------------------------------

    /// Read access to one slice axis
    pub fn axis(&self, orientation: Orientation) -> &SliceAxis {
        match orientation {
            Orientation::Horizontal => &self.horiz,
            Orientation::Vertical => &self.vert,
        }
    }

    /// Add a slice where the operator clicked
    ///
    /// The click is mapped into die space and its x or y becomes the
    /// offset, chosen by `orientation`. Clicks outside the boundary quad
    /// are ignored (`Ok(None)`); without a valid region the call fails.
    pub fn add_slice(&mut self, orientation: Orientation, position: Point) -> Result<Option<f64>> {
        let quad = self.quad.ok_or(Error::DegenerateQuad)?;
        if !quad.contains(position) {
            return Ok(None);
        }
        let offset = self.die_offset_at(orientation, position)?;
        self.axis_mut(orientation).add(offset);
        self.bump_grid();
        Ok(Some(offset))
    }

    /// Toggle selection of the slice line near a click, if one is close
    /// enough
    ///
    /// Returns the toggled index. Clicks outside the quad or away from
    /// every line do nothing.
    pub fn select_slice(
        &mut self,
        orientation: Orientation,
        position: Point,
        threshold: f64,
    ) -> Result<Option<usize>> {
        let Some(hit) = self.hit_test_slice(orientation, position, threshold)? else {
            return Ok(None);
        };
        self.axis_mut(orientation).toggle_select(hit)?;
        Ok(Some(hit))
    }

    /// Add the slice line near a click to the selection (drag-select)
    pub fn extend_slice_selection(
        &mut self,
        orientation: Orientation,
        position: Point,
        threshold: f64,
    ) -> Result<Option<usize>> {
        let Some(hit) = self.hit_test_slice(orientation, position, threshold)? else {
            return Ok(None);
        };
        self.axis_mut(orientation).extend_select(hit)?;
        Ok(Some(hit))
    }

    /// Clear the selection on one axis
    pub fn deselect_slices(&mut self, orientation: Orientation) {
        self.axis_mut(orientation).deselect_all();
    }

    /// Delete the selected slices on one axis
    pub fn delete_selected_slices(&mut self, orientation: Orientation) {
        let axis = self.axis_mut(orientation);
        if axis.selected().is_empty() {
            return;
        }
        axis.delete_selected();
        self.bump_grid();
    }

    /// Copy the selected slices' predecessor-relative offsets into the
    /// session clipboard, replacing its contents
    pub fn copy_selected_slices(&mut self, orientation: Orientation) -> Result<usize> {
        let offsets = self.axis(orientation).copy_selected_as_offsets()?;
        let count = offsets.len();
        self.copied_offsets = offsets;
        Ok(count)
    }

    /// The clipboard as last filled by [`MarkingSession::copy_selected_slices`]
    pub fn copied_offsets(&self) -> &[f64] {
        &self.copied_offsets
    }

    /// Paste the clipboard onto an axis, the first slice landing exactly
    /// where the operator points
    ///
    /// Returns how many slices were placed (candidates past 1.0 are
    /// dropped without disturbing the spacing of the rest).
    pub fn paste_slices_at(&mut self, orientation: Orientation, position: Point) -> Result<usize> {
        let origin = self.die_offset_at(orientation, position)?;
        let offsets = std::mem::take(&mut self.copied_offsets);
        let placed = self.axis_mut(orientation).paste_offsets_at(origin, &offsets);
        self.copied_offsets = offsets;
        if placed > 0 {
            self.bump_grid();
        }
        Ok(placed)
    }

    // ----- derived reads ----------------------------------------------

    /// Snapshot of one axis's slice lines with their selection flags
    ///
    /// Owned data, computed on request: the renderer never holds references
    /// into the session.
    pub fn slice_lines(&self, orientation: Orientation) -> Result<Vec<SliceLine>> {
        let h = self.fresh_homography()?;
        let axis = self.axis(orientation);
        let lines = builder::build_lines(axis, h, orientation)?;
        Ok(lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| SliceLine {
                line,
                selected: axis.is_selected(i),
            })
            .collect())
    }

    /// Derive the bit locations and rebuild the proximity index
    ///
    /// Sorts both axes ascending (their stored order changes) and stamps
    /// the results with the current grid revision. Returns the number of
    /// bit locations.
    pub fn rebuild_bit_grid(&mut self) -> Result<usize> {
        let quad = self.quad.ok_or(Error::DegenerateQuad)?;
        let h = self.fresh_homography()?;
        let h = *h;

        let points = builder::build_bit_locations(&quad, &mut self.horiz, &mut self.vert, &h)?;
        let tree = KdTree::build(&points);
        let count = points.len();
        debug!(
            "rebuilt bit grid: {count} locations ({} x {} slices), revision {}",
            self.horiz.len(),
            self.vert.len(),
            self.grid_revision
        );

        self.bit_locations = Some(Stamped {
            value: points,
            revision: self.grid_revision,
        });
        self.proximity = Some(Stamped {
            value: tree,
            revision: self.grid_revision,
        });
        Ok(count)
    }

    /// Snapshot of the current bit locations
    ///
    /// Fails fast when the grid has not been rebuilt since the last bounds
    /// or slice edit.
    pub fn bit_locations(&self) -> Result<Vec<Point>> {
        let stamped = self.bit_locations.as_ref().ok_or(Error::EmptyIndex)?;
        self.check_grid_stamp(stamped.revision)?;
        Ok(stamped.value.clone())
    }

    /// Nearest bit location to a query point, as (index, distance)
    ///
    /// The index refers into the scanline-ordered bit-location snapshot.
    pub fn nearest_bit(&self, query: Point) -> Result<(usize, f64)> {
        let stamped = self.proximity.as_ref().ok_or(Error::EmptyIndex)?;
        self.check_grid_stamp(stamped.revision)?;
        stamped.value.nearest(query).ok_or(Error::EmptyIndex)
    }

    // ----- description I/O --------------------------------------------

    /// Capture the session as a description document
    ///
    /// Bounds come out in canonical order once a quad exists; slice arrays
    /// are written in stored order, sorted or not.
    pub fn to_description(&self) -> DieDescription {
        let mut doc = DieDescription::new();
        let corners: &[Point] = match &self.quad {
            Some(quad) => quad.corners(),
            None => &self.bounds_points,
        };
        doc.rom_bounds = corners.iter().map(|p| [p.x, p.y]).collect();
        doc.horizontal_slices = self.horiz.values().to_vec();
        doc.vertical_slices = self.vert.values().to_vec();
        doc
    }

    /// Replace the session state with a description document's contents
    ///
    /// Runs the full pipeline: bounds, homography, axes, bit grid. The
    /// document is assumed validated (see [`DieDescription::from_json`]).
    /// Documents with fewer than 4 bounds points load without a region;
    /// slices still load and become meaningful once the bounds are
    /// completed.
    pub fn apply_description(&mut self, doc: &DieDescription) -> Result<()> {
        self.reset_bounds();
        for &[x, y] in &doc.rom_bounds {
            self.add_bounds_point(Point::new(x, y))?;
        }
        for &offset in &doc.horizontal_slices {
            self.horiz.add(offset);
        }
        for &offset in &doc.vertical_slices {
            self.vert.add(offset);
        }
        self.bump_grid();
        if self.quad.is_some() {
            self.rebuild_bit_grid()?;
        }
        debug!(
            "applied description: {} bounds points, {} + {} slices",
            doc.rom_bounds.len(),
            doc.horizontal_slices.len(),
            doc.vertical_slices.len()
        );
        Ok(())
    }

    // ----- internals --------------------------------------------------

    fn axis_mut(&mut self, orientation: Orientation) -> &mut SliceAxis {
        match orientation {
            Orientation::Horizontal => &mut self.horiz,
            Orientation::Vertical => &mut self.vert,
        }
    }

    /// Canonicalize the 4 stored points and rebuild the homography
    ///
    /// The stored points are replaced with their canonical order, so point
    /// indices and corner slots agree from here on.
    fn rebuild_region(&mut self) -> Result<()> {
        self.quad = None;
        self.homography = None;

        let points: [Point; 4] = self.bounds_points[..]
            .try_into()
            .map_err(|_| Error::DegenerateQuad)?;
        let quad = BoundsQuad::from_unordered(points)?;
        let homography = Homography::from_bounds(&quad)?;

        self.bounds_points = quad.corners().to_vec();
        self.quad = Some(quad);
        self.homography = Some(Stamped {
            value: homography,
            revision: self.bounds_revision,
        });
        debug!("rebuilt region homography at revision {}", self.bounds_revision);
        Ok(())
    }

    fn fresh_homography(&self) -> Result<&Homography> {
        let stamped = self.homography.as_ref().ok_or(Error::DegenerateQuad)?;
        if stamped.revision != self.bounds_revision {
            return Err(Error::StaleDerivedState {
                built: stamped.revision,
                current: self.bounds_revision,
            });
        }
        Ok(&stamped.value)
    }

    fn check_grid_stamp(&self, built: u64) -> Result<()> {
        if built != self.grid_revision {
            return Err(Error::StaleDerivedState {
                built,
                current: self.grid_revision,
            });
        }
        Ok(())
    }

    /// Die-space offset of an image point along one axis
    fn die_offset_at(&self, orientation: Orientation, position: Point) -> Result<f64> {
        let h = self.fresh_homography()?;
        let die = h.to_die_space(position)?;
        Ok(match orientation {
            Orientation::Horizontal => die.x,
            Orientation::Vertical => die.y,
        })
    }

    /// Index of the slice line within `threshold` of a click, if any
    ///
    /// Clicks outside the boundary quad never hit. Lines are tested in
    /// stored order and the first hit wins.
    fn hit_test_slice(
        &self,
        orientation: Orientation,
        position: Point,
        threshold: f64,
    ) -> Result<Option<usize>> {
        let quad = self.quad.ok_or(Error::DegenerateQuad)?;
        if !quad.contains(position) {
            return Ok(None);
        }
        let h = self.fresh_homography()?;
        for (i, &offset) in self.axis(orientation).values().iter().enumerate() {
            let line = builder::slice_line(h, offset, orientation)?;
            if segment_point_distance(&line, position) < threshold {
                return Ok(Some(i));
            }
        }
        Ok(None)
    }

    fn bump_bounds(&mut self) {
        self.bounds_revision += 1;
        self.grid_revision += 1;
    }

    fn bump_grid(&mut self) {
        self.grid_revision += 1;
    }
}
