//! Display scaling between the original board image and its resized view.
//!
//! The board image is resized once at load time to fit the display box,
//! with one uniform factor for both axes. Clicks arrive in display space;
//! every containment test runs in original space. This module is the only
//! place that conversion lives.

use crate::geometry::Point;

/// A uniform display scale factor, computed once per loaded image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayScale {
    /// Display pixels per original pixel.
    pub factor: f64,
}

impl DisplayScale {
    /// Fit an image of `orig_w x orig_h` into a `max_w x max_h` box,
    /// preserving aspect ratio: `factor = min(max_w/orig_w, max_h/orig_h)`.
    pub fn fit(orig_w: u32, orig_h: u32, max_w: u32, max_h: u32) -> Self {
        let sx = max_w as f64 / orig_w as f64;
        let sy = max_h as f64 / orig_h as f64;
        Self { factor: sx.min(sy) }
    }

    /// Identity scale (display space == original space).
    pub fn identity() -> Self {
        Self { factor: 1.0 }
    }

    /// Size of the resized display image.
    pub fn display_size(&self, orig_w: u32, orig_h: u32) -> (u32, u32) {
        (
            (orig_w as f64 * self.factor) as u32,
            (orig_h as f64 * self.factor) as u32,
        )
    }

    /// Convert a display-space click to original image space.
    ///
    /// Rounded to the nearest pixel: `orig = round(display / factor)`.
    #[inline]
    pub fn to_original(&self, display: Point) -> Point {
        Point::new(
            (display.x / self.factor).round(),
            (display.y / self.factor).round(),
        )
    }

    /// Convert an original-space point to display space (rounded).
    #[inline]
    pub fn to_display(&self, original: Point) -> Point {
        Point::new(
            (original.x * self.factor).round(),
            (original.y * self.factor).round(),
        )
    }
}
