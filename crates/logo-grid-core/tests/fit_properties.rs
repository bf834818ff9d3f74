use logo_grid_core::Size;
use logo_grid_core::compositing::fit_to_cell;
use rand::{Rng, SeedableRng};

#[test]
fn fitted_size_is_contained_and_binding() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    for _ in 0..5000 {
        let src = Size::new(rng.gen_range(1..=3000), rng.gen_range(1..=3000));
        let cell = Size::new(rng.gen_range(100..=1000), rng.gen_range(100..=1000));
        let fit = fit_to_cell(src, cell);
        assert!(fit.size.w <= cell.w && fit.size.h <= cell.h, "{:?} in {:?}", fit, cell);
        assert!(
            fit.size.w == cell.w || fit.size.h == cell.h,
            "neither side binds: {:?} in {:?}",
            fit,
            cell
        );
        assert!(fit.size.w >= 1 && fit.size.h >= 1);
    }
}

#[test]
fn aspect_ratio_is_preserved_within_a_pixel() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(1234);
    for _ in 0..5000 {
        let src = Size::new(rng.gen_range(1..=3000), rng.gen_range(1..=3000));
        let cell = Size::new(rng.gen_range(100..=1000), rng.gen_range(100..=1000));
        let fit = fit_to_cell(src, cell);
        let ideal_w = src.w as f64 * fit.scale;
        let ideal_h = src.h as f64 * fit.scale;
        assert!((fit.size.w as f64 - ideal_w).abs() <= 1.0, "{:?} {:?}", src, fit);
        assert!((fit.size.h as f64 - ideal_h).abs() <= 1.0, "{:?} {:?}", src, fit);
        let expected = f64::min(cell.w as f64 / src.w as f64, cell.h as f64 / src.h as f64);
        assert!((fit.scale - expected).abs() < 1e-9);
    }
}

#[test]
fn logo_is_centered_with_floor_division() {
    let fit = fit_to_cell(Size::new(100, 51), Size::new(450, 300));
    // 450 / 100 = 4.5 < 300 / 51; height = round(229.5) = 230
    assert_eq!(fit.size, Size::new(450, 230));
    assert_eq!(fit.offset, (0, 35));

    let fit = fit_to_cell(Size::new(1, 1), Size::new(451, 300));
    assert_eq!(fit.size, Size::new(300, 300));
    assert_eq!(fit.offset, (75, 0));
}
