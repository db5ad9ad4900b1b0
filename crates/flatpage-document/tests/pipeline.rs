// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end pipeline tests on synthetic document photos.

use flatpage_core::error::FlatpageError;
use flatpage_core::human_errors::{Recovery, humanize_error};
use flatpage_core::{FilterMode, PaperSize, Point, ProcessorSettings, Quadrilateral, ScanConfig};
use flatpage_document::{
    CornerSource, DocumentScanner, HomographyMatrix, ImageCodec, PixelSurface, StandardCodec,
    apply_filters, detect_document_edges, perform_warp, rectify, solve, validate_detection, warp,
};
use image::{Rgba, RgbaImage};

// -- Fixtures -----------------------------------------------------------------

/// 800x1000 black photo with a white sheet covering (100, 150)-(700, 900).
fn black_desk_white_sheet() -> PixelSurface {
    let mut img = RgbaImage::from_pixel(800, 1000, Rgba([0, 0, 0, 255]));
    for y in 150..900 {
        for x in 100..700 {
            img.put_pixel(x, y, Rgba([255, 255, 255, 255]));
        }
    }
    PixelSurface::from_rgba(img)
}

/// Deterministic noise so filter properties see every tone.
fn noisy_surface(width: u32, height: u32) -> PixelSurface {
    let mut state: u32 = 0x2545_F491;
    let mut surface = PixelSurface::new(width, height);
    for px in surface.data_mut().chunks_exact_mut(4) {
        for c in px.iter_mut().take(3) {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            *c = (state >> 24) as u8;
        }
        px[3] = 255;
    }
    surface
}

fn assert_corner(actual: Point, expected: (f64, f64)) {
    // The 3x3 box blur plus the Sobel stencil widen a step edge by about two
    // working pixels, which is over 4 source pixels at 512/1000 scale.
    let tolerance = 5.0;
    assert!(
        (actual.x - expected.0).abs() <= tolerance && (actual.y - expected.1).abs() <= tolerance,
        "corner {actual:?} not within {tolerance} px of {expected:?}"
    );
}

// -- End to end ---------------------------------------------------------------

#[test]
fn white_sheet_is_detected_validated_and_rectified() {
    let photo = black_desk_white_sheet();

    let quad = detect_document_edges(&photo).expect("sheet detected");
    assert_corner(quad.top_left(), (100.0, 150.0));
    assert_corner(quad.top_right(), (700.0, 150.0));
    assert_corner(quad.bottom_right(), (700.0, 900.0));
    assert_corner(quad.bottom_left(), (100.0, 900.0));
    // The right and bottom edges sit closer to the sheet than the widened
    // top-left side.
    for corner in [quad.top_right(), quad.bottom_right()] {
        assert!((corner.x - 700.0).abs() <= 3.5, "right edge at {corner:?}");
    }
    for corner in [quad.bottom_right(), quad.bottom_left()] {
        assert!((corner.y - 900.0).abs() <= 1.0, "bottom edge at {corner:?}");
    }
    assert!(validate_detection(&quad, 800, 1000));

    // 4:5 paper gives exactly a 600x750 page.
    let paper = PaperSize::Custom {
        width_mm: 160,
        height_mm: 200,
    };
    let page = rectify(&photo, &quad, 600, paper).expect("rectified");
    assert_eq!(page.dimensions(), (600, 750));

    let total: u64 = page
        .data()
        .chunks_exact(4)
        .map(|px| px[..3].iter().map(|&c| u64::from(255 - c)).sum::<u64>())
        .sum();
    let mean_error = total as f64 / (600.0 * 750.0 * 3.0 * 255.0);
    assert!(mean_error < 0.02, "mean pixel error {mean_error}");
}

#[test]
fn perform_warp_encodes_an_a4_png() {
    let photo = black_desk_white_sheet();
    let quad = detect_document_edges(&photo).expect("sheet detected");
    let png = perform_warp(&photo, &quad, 620).expect("warped");

    let page = StandardCodec.decode(&png).expect("png decodes");
    assert_eq!(page.dimensions(), (620, 877));
    let [r, g, b, a] = page.pixel(310, 438);
    assert_eq!((r, g, b, a), (255, 255, 255, 255));
}

#[test]
fn scanner_exports_single_page_pdf() {
    let mut config = ScanConfig::default();
    config.warp.target_width = 310;
    let mut scanner = DocumentScanner::from_surface(black_desk_white_sheet(), config);
    assert_eq!(scanner.corner_source(), CornerSource::Detected);

    let settings = ProcessorSettings {
        mode: FilterMode::Enhanced,
        sharpness: 40,
        margin: 5,
        ..ProcessorSettings::default()
    };
    let pdf = scanner.export_pdf(&settings).expect("pdf");
    let doc = lopdf::Document::load_mem(&pdf).expect("valid pdf");
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn scanner_reads_encoded_photos() {
    let photo = black_desk_white_sheet();
    let png = StandardCodec
        .encode(&photo, flatpage_core::OutputFormat::Png, 100)
        .expect("encode");
    let scanner = DocumentScanner::from_bytes(&png, ScanConfig::default()).expect("decode");
    assert_eq!(scanner.source().dimensions(), (800, 1000));
    assert_eq!(scanner.corner_source(), CornerSource::Detected);

    assert!(matches!(
        DocumentScanner::from_bytes(b"not an image", ScanConfig::default()),
        Err(FlatpageError::Decode(_))
    ));
}

// -- Properties ---------------------------------------------------------------

#[test]
fn binary_mode_is_pure_black_and_white() {
    for sharpness in [0, 50, 100] {
        let mut surface = noisy_surface(64, 48);
        let settings = ProcessorSettings {
            mode: FilterMode::Binary,
            threshold: 100,
            sharpness,
            contrast: 40,
            ..ProcessorSettings::default()
        };
        apply_filters(&mut surface, &settings);
        for px in surface.data().chunks_exact(4) {
            assert!(px[0] == 0 || px[0] == 255, "{px:?}");
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
    }
}

#[test]
fn zero_sharpness_matches_tone_pass_alone() {
    let original = noisy_surface(40, 30);
    let settings = ProcessorSettings {
        mode: FilterMode::Enhanced,
        contrast: 25,
        brightness: -10,
        sharpness: 0,
        ..ProcessorSettings::default()
    };
    let mut filtered = original.clone();
    apply_filters(&mut filtered, &settings);
    assert_ne!(filtered, original);

    // Each pixel filtered on its own, with no neighbours to convolve.
    for y in 0..original.height() {
        for x in 0..original.width() {
            let mut single = PixelSurface::filled(1, 1, original.pixel(x, y));
            apply_filters(&mut single, &settings);
            assert_eq!(filtered.pixel(x, y), single.pixel(0, 0), "pixel ({x}, {y})");
        }
    }

    let mut sharpened = original.clone();
    apply_filters(
        &mut sharpened,
        &ProcessorSettings {
            sharpness: 60,
            ..settings
        },
    );
    assert_ne!(sharpened, filtered);
}

#[test]
fn rectangle_onto_itself_is_identity() {
    let rect = Quadrilateral::rectangle(800.0, 1000.0);
    let matrix = solve(&rect, &rect).expect("solvable");
    for (got, want) in matrix
        .coefficients()
        .iter()
        .zip(HomographyMatrix::identity().coefficients())
    {
        assert!((got - want).abs() < 1e-6);
    }
}

#[test]
fn collinear_corners_never_produce_nan() {
    let line = Quadrilateral::new(
        Point::new(0.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(20.0, 20.0),
        Point::new(30.0, 30.0),
    );
    let err = solve(&Quadrilateral::rectangle(100.0, 100.0), &line).expect_err("degenerate");
    assert!(matches!(err, FlatpageError::DegenerateTransform { .. }));
    assert_eq!(humanize_error(&err).recovery, Recovery::AdjustCorners);
}

#[test]
fn destination_outside_source_is_opaque_white() {
    let photo = noisy_surface(50, 50);
    let away = HomographyMatrix::from_free([1.0, 0.0, -1000.0, 0.0, 1.0, -1000.0, 0.0, 0.0]);
    let out = warp(&photo, &away, 40, 40);
    assert!(out.data().iter().all(|&c| c == 255));
}

#[test]
fn uniform_photo_falls_back_to_inset_crop() {
    let blank = PixelSurface::filled(640, 480, [128, 64, 32, 255]);
    assert!(detect_document_edges(&blank).is_none());

    let scanner = DocumentScanner::from_surface(blank, ScanConfig::default());
    assert_eq!(scanner.corner_source(), CornerSource::Fallback);
    assert_eq!(scanner.corners(), Quadrilateral::inset(640, 480, 0.1));
    assert_eq!(
        humanize_error(&FlatpageError::NotFound).recovery,
        Recovery::FallbackCrop
    );
}

#[test]
fn area_gate_on_square_frame() {
    let side = 0.995f64.sqrt() * 1000.0;
    assert!(!validate_detection(&Quadrilateral::rectangle(side, side), 1000, 1000));
    assert!(validate_detection(&Quadrilateral::inset(1000, 1000, 0.1464), 1000, 1000));
}
