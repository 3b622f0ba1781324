//! Bit image export
//!
//! Renders the neighborhood of every bit location into one horizontal strip
//! image, sampling the die photograph bilinearly at sub-pixel coordinates.
//! Downstream classification tooling reads the strip instead of the full
//! photograph.

use image::{Rgb, RgbImage};
use rayon::prelude::*;

use crate::models::Point;

/// Bilinear color sample at a sub-pixel position
///
/// Boundary behavior: when the 2x2 neighborhood would run off the right or
/// bottom edge the top-left sample is returned as-is, and positions left of
/// or above the image come back black.
pub fn bilinear_sample(image: &RgbImage, p: Point) -> Rgb<u8> {
    let w = image.width() as i64;
    let h = image.height() as i64;

    let x1 = p.x.floor() as i64;
    let y1 = p.y.floor() as i64;
    let x2 = x1 + 1;
    let y2 = y1 + 1;

    if x1 < 0 || y1 < 0 || x1 >= w || y1 >= h {
        return Rgb([0, 0, 0]);
    }
    if x2 >= w || y2 >= h {
        return *image.get_pixel(x1 as u32, y1 as u32);
    }

    let c11 = image.get_pixel(x1 as u32, y1 as u32).0;
    let c12 = image.get_pixel(x1 as u32, y2 as u32).0;
    let c21 = image.get_pixel(x2 as u32, y1 as u32).0;
    let c22 = image.get_pixel(x2 as u32, y2 as u32).0;

    let fx = p.x - x1 as f64;
    let fy = p.y - y1 as f64;

    let mut out = [0u8; 3];
    for ch in 0..3 {
        let value = (1.0 - fx) * (1.0 - fy) * c11[ch] as f64
            + (1.0 - fx) * fy * c12[ch] as f64
            + fx * (1.0 - fy) * c21[ch] as f64
            + fx * fy * c22[ch] as f64;
        out[ch] = value.round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}

/// Render every bit location's neighborhood into one strip image
///
/// Each location contributes a (2r+1) x (2r+1) patch; patches are laid out
/// left to right in bit-location order, so the strip is
/// `(2r+1) * locations.len()` wide and `2r+1` tall. Rows are filled in
/// parallel.
pub fn export_bit_strip(image: &RgbImage, locations: &[Point], radius: usize) -> RgbImage {
    let patch = 2 * radius + 1;
    if locations.is_empty() {
        return RgbImage::new(0, patch as u32);
    }
    let width = patch * locations.len();
    let mut data = vec![0u8; width * patch * 3];

    data.par_chunks_mut(width * 3).enumerate().for_each(|(row, buf)| {
        let dy = row as f64 - radius as f64;
        for x in 0..width {
            let bit = x / patch;
            let dx = (x % patch) as f64 - radius as f64;
            let sample = bilinear_sample(image, locations[bit].translate(dx, dy));
            buf[x * 3..x * 3 + 3].copy_from_slice(&sample.0);
        }
    });

    RgbImage::from_raw(width as u32, patch as u32, data)
        .expect("strip buffer matches its dimensions")
}
