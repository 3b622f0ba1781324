//! End-to-end tests over the public session API
//!
//! These walk the same paths a host application does: define a region,
//! place and edit slices, derive the bit grid, query it, and round-trip the
//! description document.

use die_grid::{
    DEFAULT_SLICE_PICK_DISTANCE, DieDescription, Error, MarkingSession, Orientation, Point,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn define_region(session: &mut MarkingSession, corners: [(f64, f64); 4]) {
    for (x, y) in corners {
        assert!(session.add_bounds_point(Point::new(x, y)).unwrap());
    }
}

#[test]
fn test_full_marking_workflow() {
    init_logging();
    let mut session = MarkingSession::new();

    // A perspective-distorted region
    define_region(&mut session, [(12.0, 18.0), (88.0, 14.0), (94.0, 83.0), (6.0, 91.0)]);
    assert!(session.bounds_polygon().is_some());

    // Three column slices, two row slices, clicked in no particular order
    for p in [(60.0, 50.0), (30.0, 50.0), (75.0, 50.0)] {
        let added = session
            .add_slice(Orientation::Horizontal, Point::new(p.0, p.1))
            .unwrap();
        assert!(added.is_some());
    }
    for p in [(50.0, 65.0), (50.0, 35.0)] {
        session
            .add_slice(Orientation::Vertical, Point::new(p.0, p.1))
            .unwrap()
            .unwrap();
    }

    let count = session.rebuild_bit_grid().unwrap();
    assert_eq!(count, (3 + 2) * (2 + 2));

    // Derivation sorted both axes ascending
    let horiz = session.axis(Orientation::Horizontal).values().to_vec();
    assert!(horiz.windows(2).all(|w| w[0] <= w[1]));

    // Every bit location maps into the unit square, scanline-monotone rows
    let points = session.bit_locations().unwrap();
    assert_eq!(points.len(), 20);
    for row in points.chunks(5) {
        assert!(row.windows(2).all(|w| w[0].x < w[1].x));
    }

    // Nearest lookup agrees with brute force
    let query = Point::new(47.0, 52.0);
    let (index, distance) = session.nearest_bit(query).unwrap();
    let brute = points
        .iter()
        .map(|p| p.distance(&query))
        .fold(f64::INFINITY, f64::min);
    assert!((distance - brute).abs() < 1e-12);
    assert!((points[index].distance(&query) - brute).abs() < 1e-12);
}

#[test]
fn test_axis_aligned_region_produces_expected_points() {
    init_logging();
    let mut session = MarkingSession::new();
    define_region(&mut session, [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);

    session
        .add_slice(Orientation::Horizontal, Point::new(5.0, 5.0))
        .unwrap()
        .unwrap();

    session.rebuild_bit_grid().unwrap();
    let points = session.bit_locations().unwrap();

    let expected = [
        (0.0, 0.0),
        (5.0, 0.0),
        (10.0, 0.0),
        (0.0, 10.0),
        (5.0, 10.0),
        (10.0, 10.0),
    ];
    assert_eq!(points.len(), expected.len());
    for (p, (x, y)) in points.iter().zip(expected) {
        assert!((p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9, "got {p:?}");
    }
}

#[test]
fn test_degenerate_region_refuses_grid() {
    init_logging();
    let mut session = MarkingSession::new();
    // Fourth point collides with an existing corner slot
    for (x, y) in [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)] {
        session.add_bounds_point(Point::new(x, y)).unwrap();
    }
    let result = session.add_bounds_point(Point::new(9.0, 9.0));
    assert_eq!(result, Err(Error::AmbiguousBounds));

    // No region, so no slices and no grid
    assert!(session.bounds_polygon().is_none());
    assert_eq!(
        session.add_slice(Orientation::Horizontal, Point::new(5.0, 5.0)),
        Err(Error::DegenerateQuad)
    );
    assert_eq!(session.rebuild_bit_grid(), Err(Error::DegenerateQuad));
}

#[test]
fn test_selection_copy_paste_with_hit_testing() {
    init_logging();
    let mut session = MarkingSession::new();
    define_region(&mut session, [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]);

    // Evenly spaced columns at 0.2, 0.3, 0.4, 0.5
    for x in [20.0, 30.0, 40.0, 50.0] {
        session
            .add_slice(Orientation::Horizontal, Point::new(x, 50.0))
            .unwrap()
            .unwrap();
    }

    // Select the last three by clicking near their lines
    session
        .select_slice(
            Orientation::Horizontal,
            Point::new(31.0, 70.0),
            DEFAULT_SLICE_PICK_DISTANCE,
        )
        .unwrap()
        .unwrap();
    for x in [39.0, 51.0] {
        session
            .extend_slice_selection(
                Orientation::Horizontal,
                Point::new(x, 20.0),
                DEFAULT_SLICE_PICK_DISTANCE,
            )
            .unwrap()
            .unwrap();
    }

    assert_eq!(session.copy_selected_slices(Orientation::Horizontal).unwrap(), 3);

    // Three highlighted lines, one not
    let lines = session.slice_lines(Orientation::Horizontal).unwrap();
    assert_eq!(
        lines.iter().filter(|l| l.selected).count(),
        3,
        "selection should reach the render snapshot"
    );

    // Paste near the right edge: the pattern starts at 0.85 and the entry
    // that would land past 1.0 is dropped without squeezing the rest
    let placed = session
        .paste_slices_at(Orientation::Horizontal, Point::new(85.0, 50.0))
        .unwrap();
    assert_eq!(placed, 2);
    let values = session.axis(Orientation::Horizontal).values();
    assert_eq!(values.len(), 6);
    assert!((values[4] - 0.85).abs() < 1e-9);
    assert!((values[5] - 0.95).abs() < 1e-9);
}

#[test]
fn test_description_json_round_trip() {
    init_logging();
    let mut session = MarkingSession::new();
    define_region(&mut session, [(5.0, 90.0), (10.0, 20.0), (90.0, 15.0), (95.0, 85.0)]);
    session
        .add_slice(Orientation::Horizontal, Point::new(50.0, 50.0))
        .unwrap()
        .unwrap();
    session
        .add_slice(Orientation::Vertical, Point::new(50.0, 30.0))
        .unwrap()
        .unwrap();

    let text = session.to_description().to_json_pretty().unwrap();
    let doc = DieDescription::from_json(&text).unwrap();

    let mut restored = MarkingSession::new();
    restored.apply_description(&doc).unwrap();

    assert_eq!(restored.bounds_polygon(), session.bounds_polygon());
    assert_eq!(restored.bit_locations().unwrap().len(), 9);

    // Saving the restored session reproduces the document
    assert_eq!(restored.to_description(), doc);
}

#[test]
fn test_export_strip_from_grid() {
    init_logging();
    let mut session = MarkingSession::new();
    define_region(&mut session, [(0.0, 0.0), (7.0, 0.0), (7.0, 7.0), (0.0, 7.0)]);
    session.rebuild_bit_grid().unwrap();
    let locations = session.bit_locations().unwrap();
    assert_eq!(locations.len(), 4); // just the corners

    let photo = image::RgbImage::from_fn(8, 8, |x, _| image::Rgb([(x * 20) as u8, 0, 0]));
    let strip = die_grid::export::export_bit_strip(&photo, &locations, 2);
    assert_eq!(strip.width(), 5 * 4);
    assert_eq!(strip.height(), 5);
}
