use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgb, RgbImage, Rgba, Rgba32FImage, RgbaImage};

use crate::model::Size;

/// Scale-to-fit result for one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    /// Uniform scale factor, `min(cell_w / w, cell_h / h)`.
    pub scale: f64,
    /// Scaled size, rounded half-up; the binding dimension equals the cell's.
    pub size: Size,
    /// Top-left of the scaled image inside the cell (floor-centered).
    pub offset: (u32, u32),
}

/// Computes the largest uniform scale that fits `src` inside `cell`.
///
/// Integer arithmetic decides the binding side and rounds the other one, so the result does
/// not drift with float precision. Both `src` and `cell` must be non-empty.
pub fn fit_to_cell(src: Size, cell: Size) -> Fit {
    let (sw, sh) = (src.w.max(1) as u64, src.h.max(1) as u64);
    let (cw, ch) = (cell.w as u64, cell.h as u64);
    let (w, h, scale) = if cw * sh <= ch * sw {
        // width binds
        let h = (2 * sh * cw + sw) / (2 * sw);
        (cw, h.clamp(1, ch), cw as f64 / sw as f64)
    } else {
        let w = (2 * sw * ch + sh) / (2 * sh);
        (w.clamp(1, cw), ch, ch as f64 / sh as f64)
    };
    let size = Size::new(w as u32, h as u32);
    let offset = ((cell.w - size.w) / 2, (cell.h - size.h) / 2);
    Fit {
        scale,
        size,
        offset,
    }
}

/// Resizes with Lanczos3 on premultiplied alpha so fully transparent pixels
/// do not bleed their color into visible edges.
pub fn resize_rgba(src: &RgbaImage, w: u32, h: u32) -> RgbaImage {
    if src.dimensions() == (w, h) {
        return src.clone();
    }
    let (sw, sh) = src.dimensions();
    let mut pre: Rgba32FImage = ImageBuffer::new(sw, sh);
    for (x, y, p) in src.enumerate_pixels() {
        let a = p[3] as f32 / 255.0;
        pre.put_pixel(
            x,
            y,
            Rgba([
                p[0] as f32 / 255.0 * a,
                p[1] as f32 / 255.0 * a,
                p[2] as f32 / 255.0 * a,
                a,
            ]),
        );
    }
    let scaled = imageops::resize(&pre, w, h, FilterType::Lanczos3);
    let mut out = RgbaImage::new(w, h);
    for (x, y, p) in scaled.enumerate_pixels() {
        let a = p[3].clamp(0.0, 1.0);
        if a <= 0.0 {
            continue;
        }
        let unmul = |c: f32| ((c / a).clamp(0.0, 1.0) * 255.0).round() as u8;
        out.put_pixel(
            x,
            y,
            Rgba([unmul(p[0]), unmul(p[1]), unmul(p[2]), (a * 255.0).round() as u8]),
        );
    }
    out
}

/// Pastes `src` onto `dst` at (dx, dy) using `src`'s alpha as the mask.
///
/// Every channel, alpha included, moves toward `src` by `alpha / 255`:
/// `out = dst + (src - dst) * a / 255`. Pixels outside `dst` are skipped.
pub fn paste_masked(dst: &mut RgbaImage, src: &RgbaImage, dx: u32, dy: u32) {
    let (dw, dh) = dst.dimensions();
    for (x, y, s) in src.enumerate_pixels() {
        let (tx, ty) = (dx + x, dy + y);
        if tx >= dw || ty >= dh {
            continue;
        }
        let a = s[3] as u32;
        if a == 0 {
            continue;
        }
        let d = dst.get_pixel_mut(tx, ty);
        for c in 0..4 {
            d[c] = ((d[c] as u32 * (255 - a) + s[c] as u32 * a + 127) / 255) as u8;
        }
    }
}

/// Drops the alpha channel. Transparent areas keep whatever color they carry,
/// which is the background for cells built by [`render_cell`].
pub fn flatten(cell: &RgbaImage) -> RgbImage {
    let (w, h) = cell.dimensions();
    RgbImage::from_fn(w, h, |x, y| {
        let p = cell.get_pixel(x, y);
        Rgb([p[0], p[1], p[2]])
    })
}

/// Opaque paste with clipping; `x`/`y` may be negative or past the canvas.
pub fn paste_opaque(canvas: &mut RgbImage, cell: &RgbImage, x: i64, y: i64) {
    imageops::replace(canvas, cell, x, y);
}

/// Builds one transparent cell holding `logo` scaled to `fit` and centered.
pub fn render_cell(logo: &RgbaImage, cell: Size, fit: &Fit, background: [u8; 3]) -> RgbaImage {
    let [r, g, b] = background;
    let mut canvas = RgbaImage::from_pixel(cell.w, cell.h, Rgba([r, g, b, 0]));
    let resized = resize_rgba(logo, fit.size.w, fit.size.h);
    paste_masked(&mut canvas, &resized, fit.offset.0, fit.offset.1);
    canvas
}
