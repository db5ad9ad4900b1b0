// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the flatpage-document pipeline stages: boundary
// detection, rectification, and the tone pipeline.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{Rgba, RgbaImage};

use flatpage_core::{FilterMode, PaperSize, ProcessorSettings, Quadrilateral};
use flatpage_document::transform::warp::DEFAULT_TARGET_WIDTH;
use flatpage_document::{EdgeDetector, PixelSurface, apply_filters, rectify};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// 1600x2000 photo: dark desk with a white sheet from (200, 300) to (1400, 1800).
fn desk_photo() -> PixelSurface {
    let (width, height) = (1600u32, 2000u32);
    let mut img = RgbaImage::from_pixel(width, height, Rgba([35, 30, 28, 255]));
    for y in 300..1800 {
        for x in 200..1400 {
            img.put_pixel(x, y, Rgba([245, 245, 240, 255]));
        }
    }
    PixelSurface::from_rgba(img)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Detection downsamples to 512 px first, so photo size mostly affects the
/// resize.
fn bench_detect(c: &mut Criterion) {
    let photo = desk_photo();
    let detector = EdgeDetector::default();

    c.bench_function("detect (1600x2000)", |b| {
        b.iter(|| black_box(detector.detect(black_box(&photo))));
    });
}

fn bench_rectify(c: &mut Criterion) {
    let photo = desk_photo();
    let quad = Quadrilateral::inset(1600, 2000, 0.1);

    c.bench_function("rectify to A4 (1240 wide)", |b| {
        b.iter(|| black_box(rectify(&photo, black_box(&quad), DEFAULT_TARGET_WIDTH, PaperSize::A4)));
    });
}

fn bench_filters(c: &mut Criterion) {
    let page = PixelSurface::filled(1240, 1754, [200, 190, 180, 255]);
    let settings = ProcessorSettings {
        mode: FilterMode::Enhanced,
        sharpness: 60,
        contrast: 20,
        ..ProcessorSettings::default()
    };

    c.bench_function("filters enhanced+sharpen (1240x1754)", |b| {
        b.iter(|| {
            let mut surface = page.clone();
            apply_filters(&mut surface, black_box(&settings));
            black_box(surface);
        });
    });
}

criterion_group!(benches, bench_detect, bench_rectify, bench_filters);
criterion_main!(benches);
