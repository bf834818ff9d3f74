use image::{DynamicImage, GenericImageView, Rgb, RgbImage, Rgba, RgbaImage};
use logo_grid_core::{content_bounds, trim, trim_with_threshold};
use rand::{Rng, SeedableRng};

fn random_logo(rng: &mut rand::rngs::StdRng) -> RgbaImage {
    let w = rng.gen_range(1..=48);
    let h = rng.gen_range(1..=48);
    let mut img = RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 0]));
    let blobs = rng.gen_range(0..4);
    for _ in 0..blobs {
        let x = rng.gen_range(0..w);
        let y = rng.gen_range(0..h);
        let a = rng.gen_range(0..=255u8);
        img.put_pixel(x, y, Rgba([rng.r#gen(), rng.r#gen(), rng.r#gen(), a]));
    }
    img
}

#[test]
fn trimming_twice_changes_nothing() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    for _ in 0..300 {
        let img = DynamicImage::ImageRgba8(random_logo(&mut rng));
        let once = trim(&img);
        let twice = trim(&once);
        assert_eq!(once, twice);
    }
}

#[test]
fn trimming_with_threshold_is_idempotent() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let img = DynamicImage::ImageRgba8(random_logo(&mut rng));
        let thr = rng.gen_range(0..=200u8);
        let once = trim_with_threshold(&img, thr);
        assert_eq!(once, trim_with_threshold(&once, thr));
    }
}

#[test]
fn trimmed_image_has_content_on_every_edge() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(3);
    for _ in 0..200 {
        let img = DynamicImage::ImageRgba8(random_logo(&mut rng));
        let once = trim(&img).to_rgba8();
        if let Some(r) = content_bounds(&once, 0) {
            assert_eq!((r.x, r.y), (0, 0));
            assert_eq!((r.w, r.h), once.dimensions());
        }
    }
}

#[test]
fn trim_keeps_the_color_model() {
    let mut la = image::GrayAlphaImage::from_pixel(10, 10, image::LumaA([0, 0]));
    la.put_pixel(4, 5, image::LumaA([90, 255]));
    let out = trim(&DynamicImage::ImageLumaA8(la));
    assert_eq!(out.color(), image::ColorType::La8);
    assert_eq!(out.dimensions(), (1, 1));

    let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(6, 4, Rgb([1, 2, 3])));
    assert_eq!(trim(&rgb), rgb);
}
