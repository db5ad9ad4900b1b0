// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Flatpage.

use thiserror::Error;

/// Top-level error type for all Flatpage operations.
#[derive(Debug, Error)]
pub enum FlatpageError {
    // -- Detection / geometry --
    #[error("no document boundary found in the image")]
    NotFound,

    #[error("degenerate perspective transform (pivot magnitude {pivot:e})")]
    DegenerateTransform { pivot: f64 },

    #[error("invalid quadrilateral: {0}")]
    InvalidQuadrilateral(String),

    // -- Codec boundary --
    #[error("image decoding failed: {0}")]
    Decode(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    // -- Settings / configuration --
    #[error("invalid processor settings: {0}")]
    InvalidSettings(String),

    #[error("configuration error: {0}")]
    Config(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FlatpageError>;
