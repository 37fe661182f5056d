//! Uniform scale-to-fit of icons inside a circular token.

use std::f32::consts::SQRT_2;

/// Where and how large an icon is drawn inside the circle's bounding square.
///
/// Offsets are measured from the top-left corner of the square of side
/// `diameter` that encloses the circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconPlacement {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    /// Scaled width.
    pub width: f32,
    /// Scaled height.
    pub height: f32,
}

/// Side of the largest square inscribed in a circle of `diameter`.
pub fn inscribed_side(diameter: f32) -> f32 {
    diameter / SQRT_2
}

/// Fits an icon of intrinsic size `width x height` into a circle of
/// `diameter`, preserving aspect ratio.
///
/// The longer side is scaled to the inscribed square, so no corner of the
/// icon's box leaves the circle. A zero-sized box keeps scale 1.
pub fn fit_icon(width: f32, height: f32, diameter: f32) -> IconPlacement {
    let longest = width.max(height);
    let scale = if width <= 0.0 || height <= 0.0 {
        1.0
    } else {
        inscribed_side(diameter) / longest
    };

    let scaled_w = width * scale;
    let scaled_h = height * scale;
    IconPlacement {
        scale,
        offset_x: (diameter - scaled_w) / 2.0,
        offset_y: (diameter - scaled_h) / 2.0,
        width: scaled_w,
        height: scaled_h,
    }
}
