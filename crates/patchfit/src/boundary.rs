//! Boundary diagnostics for the two-point circle.
//!
//! The ring drawn at cell granularity is re-measured at pixel
//! granularity: every pixel of the rendered frame painted in the ring
//! color contributes its distance from the center. The nearest and
//! farthest such pixels bound the ring, and their midpoint is the
//! best-fit radius. The bands painted from these radii visualize how far
//! the cell approximation strays from a true circle.

use image::Rgb;

use crate::types::{Palette, Point, RgbImage};

/// Half-width in pixels of every painted band.
pub const BAND_TOLERANCE: f64 = 1.0;

/// Radii recovered from a rendered ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryRadii {
    /// Nearest ring pixel from the center.
    pub min: f64,
    /// Farthest ring pixel from the center.
    pub max: f64,
    /// Midpoint of `min` and `max`.
    pub target: f64,
}

impl BoundaryRadii {
    /// Scan `frame` for pixels equal to `color` and measure their
    /// distances from `center`. `None` when no pixel matches.
    #[must_use]
    pub fn measure(frame: &RgbImage, center: Point, color: Rgb<u8>) -> Option<Self> {
        let mut range: Option<(f64, f64)> = None;
        for (x, y, pixel) in frame.enumerate_pixels() {
            if *pixel != color {
                continue;
            }
            let d = pixel_point(x, y).distance(center);
            range = Some(match range {
                Some((lo, hi)) => (lo.min(d), hi.max(d)),
                None => (d, d),
            });
        }
        let (min, max) = range?;
        Some(Self {
            min,
            max,
            target: (min + max) / 2.0,
        })
    }
}

/// Paint the inner and outer bands in the accent color and the target
/// band in the selected color.
///
/// A pixel close to both an outer band and the target band takes the
/// accent color.
pub fn paint_bands(frame: &mut RgbImage, center: Point, radii: &BoundaryRadii, palette: &Palette) {
    let accent = palette.accent.rgb();
    let selected = palette.selected.rgb();
    for (x, y, pixel) in frame.enumerate_pixels_mut() {
        let d = pixel_point(x, y).distance(center);
        if within_band(d, radii.max) || within_band(d, radii.min) {
            *pixel = accent;
        } else if within_band(d, radii.target) {
            *pixel = selected;
        }
    }
}

/// Paint every pixel within [`BAND_TOLERANCE`] of `radius` from
/// `center`.
pub fn paint_circle(frame: &mut RgbImage, center: Point, radius: f64, color: Rgb<u8>) {
    for (x, y, pixel) in frame.enumerate_pixels_mut() {
        if within_band(pixel_point(x, y).distance(center), radius) {
            *pixel = color;
        }
    }
}

fn within_band(distance: f64, radius: f64) -> bool {
    (distance - radius).abs() < BAND_TOLERANCE
}

fn pixel_point(x: u32, y: u32) -> Point {
    Point::new(f64::from(x), f64::from(y))
}
