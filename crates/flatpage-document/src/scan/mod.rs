// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — document boundary detection and the scanner facade
// that carries a photo from decode to finished page.

pub mod detect;
pub mod scanner;

pub use detect::{DetectionReport, EdgeDetector};
pub use scanner::{
    CornerSource, DocumentScanner, detect_document_edges, perform_warp, rectify,
    validate_detection,
};
