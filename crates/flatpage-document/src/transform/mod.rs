// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometric transforms — homography solving and perspective warping.

pub mod homography;
pub mod warp;

pub use homography::{HomographyMatrix, solve};
pub use warp::{target_dimensions, warp};
