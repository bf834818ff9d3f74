use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use image::{DynamicImage, Rgba, RgbaImage};
use logo_grid_core::prelude::*;

fn generate_logos(count: usize, min_size: u32, max_size: u32) -> Vec<InputImage> {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(2024);
    (0..count)
        .map(|i| {
            let w = rng.gen_range(min_size..=max_size);
            let h = rng.gen_range(min_size..=max_size);
            let mut img = RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 0]));
            for y in h / 8..h - h / 8 {
                for x in w / 8..w - w / 8 {
                    img.put_pixel(x, y, Rgba([(x % 255) as u8, (y % 255) as u8, 90, 255]));
                }
            }
            InputImage::new(format!("logo_{}", i), DynamicImage::ImageRgba8(img))
        })
        .collect()
}

fn bench_compose(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose_grid");
    group.sample_size(10);

    for count in [4usize, 8, 16] {
        let logos = generate_logos(count, 64, 512);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("plan", count), &logos, |b, logos| {
            let cfg = GridConfig::default();
            b.iter(|| black_box(plan_grid(logos, &cfg).expect("plan")));
        });

        group.bench_with_input(BenchmarkId::new("compose", count), &logos, |b, logos| {
            let cfg = GridConfig::builder().rows(2).build();
            b.iter(|| black_box(compose_grid(logos, &cfg).expect("compose")));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compose);
criterion_main!(benches);
