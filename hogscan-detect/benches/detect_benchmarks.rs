use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hogscan_core::Image;
use hogscan_detect::{pyramid, slide_window, DetectorBuilder, FeatureExtractor, HogExtractor, WindowSize, DEFAULT_MIN_SIZE};

/// Benchmark scene: textured background with a few bright blocks
fn create_benchmark_image(width: usize, height: usize) -> Image {
    let mut img = Image::from_fn(width, height, |x, y| 0.4 + ((x * 3 + y * 5) % 17) as f32 / 100.0);
    for i in 0..6 {
        let cx = (i * width / 6 + width / 12) % width;
        let cy = (i * height / 5 + height / 10) % height;
        for y in cy.saturating_sub(8)..(cy + 8).min(height) {
            for x in cx.saturating_sub(8)..(cx + 8).min(width) {
                img.set(x, y, 1.0);
            }
        }
    }
    img
}

fn bench_hog_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("hog_extract");
    let hog = HogExtractor::default();

    for &side in &[32usize, 64, 128] {
        let patch = create_benchmark_image(side, side);
        group.bench_with_input(BenchmarkId::from_parameter(side), &patch, |b, patch| {
            b.iter(|| black_box(hog.extract(black_box(patch)).unwrap()))
        });
    }

    group.finish();
}

fn bench_slide_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("slide_window");
    let hog = HogExtractor::default();
    let img = create_benchmark_image(256, 256);
    let window = WindowSize::square(32);
    let reference = hog.extract(&img.crop(0, 0, 32, 32).unwrap()).unwrap();

    for &step in &[16usize, 8, 4] {
        group.bench_with_input(BenchmarkId::new("256x256", step), &step, |b, &step| {
            b.iter(|| black_box(slide_window(black_box(&img), &reference, &hog, step, window).unwrap()))
        });
    }

    group.finish();
}

fn bench_pyramid(c: &mut Criterion) {
    let img = create_benchmark_image(640, 480);
    c.bench_function("pyramid_640x480", |b| {
        b.iter(|| {
            let levels = pyramid(black_box(&img), 0.9, DEFAULT_MIN_SIZE).unwrap();
            black_box(levels.map(|level| level.unwrap().scale).sum::<f32>())
        })
    });
}

fn bench_full_detection(c: &mut Criterion) {
    let img = create_benchmark_image(320, 240);
    let detector = DetectorBuilder::new(64, 64).preset_coarse().build().unwrap();
    let reference = detector.reference_feature(&img.crop(40, 40, 64, 64).unwrap()).unwrap();
    c.bench_function("detect_320x240_coarse", |b| {
        b.iter(|| black_box(detector.detect(black_box(&img), &reference).unwrap()))
    });
}

criterion_group!(benches, bench_hog_extract, bench_slide_window, bench_pyramid, bench_full_detection);
criterion_main!(benches);
