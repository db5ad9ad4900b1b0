// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// flatpage-document — Turns a photo of a paper document into a flat page.
//
// Provides document boundary detection, homography solving, perspective
// rectification, tone filtering and page layout, the codec boundary, and
// single-page PDF export.

pub mod pdf;
pub mod raster;
pub mod scan;
pub mod transform;

// Re-export the primary entry points so callers can use `flatpage_document::DocumentScanner` etc.
pub use pdf::writer::PdfWriter;
pub use raster::{ImageCodec, PixelSurface, StandardCodec, apply_filters};
pub use scan::{
    CornerSource, DetectionReport, DocumentScanner, EdgeDetector, detect_document_edges,
    perform_warp, rectify, validate_detection,
};
pub use transform::{HomographyMatrix, solve, target_dimensions, warp};
