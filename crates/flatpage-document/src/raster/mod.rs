// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster module — pixel surfaces, tone filters, page layout, and the codec
// boundary.

pub mod codec;
pub mod filter;
pub mod layout;
pub mod surface;

pub use codec::{ImageCodec, StandardCodec};
pub use filter::apply_filters;
pub use surface::PixelSurface;
