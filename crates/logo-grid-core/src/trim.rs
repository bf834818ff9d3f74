//! Border trimming.
//!
//! A pixel is background when its alpha is at or below the threshold (a fully
//! transparent reference). Images without an alpha channel are read as opaque, so
//! they never lose any border.

use image::{DynamicImage, GenericImageView, RgbaImage};

use crate::model::Rect;

/// Bounding rectangle of every pixel whose alpha exceeds `threshold`.
///
/// Scans inward from each edge. Returns `None` for a blank or zero-sized image.
pub fn content_bounds(rgba: &RgbaImage, threshold: u8) -> Option<Rect> {
    let (w, h) = rgba.dimensions();
    if w == 0 || h == 0 {
        return None;
    }
    let opaque = |x: u32, y: u32| rgba.get_pixel(x, y)[3] > threshold;

    let mut x1 = 0;
    // left
    while x1 < w && (0..h).all(|y| !opaque(x1, y)) {
        x1 += 1;
    }
    if x1 >= w {
        return None;
    }
    // right
    let mut x2 = w - 1;
    while x2 > x1 && (0..h).all(|y| !opaque(x2, y)) {
        x2 -= 1;
    }
    // top
    let mut y1 = 0;
    while y1 < h && (x1..=x2).all(|x| !opaque(x, y1)) {
        y1 += 1;
    }
    // bottom
    let mut y2 = h - 1;
    while y2 > y1 && (x1..=x2).all(|x| !opaque(x, y2)) {
        y2 -= 1;
    }
    Some(Rect::new(x1, y1, x2 - x1 + 1, y2 - y1 + 1))
}

/// Same as [`content_bounds`] for any color model.
pub fn image_content_bounds(image: &DynamicImage, threshold: u8) -> Option<Rect> {
    if !image.color().has_alpha() {
        let (w, h) = image.dimensions();
        return (w > 0 && h > 0).then(|| Rect::new(0, 0, w, h));
    }
    content_bounds(&image.to_rgba8(), threshold)
}

/// Crops `image` to its non-transparent content.
///
/// Blank images are returned unchanged. The color model of the input is kept.
pub fn trim(image: &DynamicImage) -> DynamicImage {
    trim_with_threshold(image, 0)
}

/// [`trim`] treating alpha values `<= threshold` as background.
pub fn trim_with_threshold(image: &DynamicImage, threshold: u8) -> DynamicImage {
    match image_content_bounds(image, threshold) {
        Some(r) if (r.w, r.h) != image.dimensions() => image.crop_imm(r.x, r.y, r.w, r.h),
        _ => image.clone(),
    }
}
