// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective warp — inverse-map every destination pixel through a homography
// and bilinear-sample the source.

use flatpage_core::PaperSize;
use tracing::{debug, instrument};

use super::homography::HomographyMatrix;
use crate::raster::surface::{CHANNELS, PixelSurface};

/// Fill for destination pixels whose pre-image falls outside the source.
pub const BACKGROUND: [u8; 4] = [255, 255, 255, 255];

/// Default rectified page width in pixels (A4 at 150 DPI).
pub const DEFAULT_TARGET_WIDTH: u32 = 1240;

/// Output dimensions for a page `target_width` pixels wide.
pub fn target_dimensions(target_width: u32, paper_size: PaperSize) -> (u32, u32) {
    let width = target_width.max(1);
    (width, paper_size.height_for_width(width))
}

/// Resample `source` into a `target_width x target_height` surface.
///
/// `homography` maps destination coordinates to source coordinates. Pixels
/// whose pre-image lies outside `[0, w-1) x [0, h-1)` become opaque white, so
/// this never fails.
#[instrument(skip(source, homography), fields(src_w = source.width(), src_h = source.height()))]
pub fn warp(
    source: &PixelSurface,
    homography: &HomographyMatrix,
    target_width: u32,
    target_height: u32,
) -> PixelSurface {
    let mut output = PixelSurface::new(target_width, target_height);
    if target_width == 0 || target_height == 0 {
        return output;
    }
    let h = *homography.coefficients();

    let src_w = source.width() as usize;
    let max_x = source.width() as f64 - 1.0;
    let max_y = source.height() as f64 - 1.0;
    let src = source.data();
    let src_stride = src_w * CHANNELS;

    let mut filled = 0usize;
    for (y, row) in output
        .data_mut()
        .chunks_exact_mut(target_width as usize * CHANNELS)
        .enumerate()
    {
        let fy = y as f64;
        for (x, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
            let fx = x as f64;
            let w = h[6] * fx + h[7] * fy + h[8];
            let src_x = (h[0] * fx + h[1] * fy + h[2]) / w;
            let src_y = (h[3] * fx + h[4] * fy + h[5]) / w;

            // NaN and infinities fail these comparisons too.
            if !(src_x >= 0.0 && src_x < max_x && src_y >= 0.0 && src_y < max_y) {
                px.copy_from_slice(&BACKGROUND);
                filled += 1;
                continue;
            }

            let x0 = src_x as usize;
            let y0 = src_y as usize;
            let wx = src_x - x0 as f64;
            let wy = src_y - y0 as f64;

            let w00 = (1.0 - wx) * (1.0 - wy);
            let w10 = wx * (1.0 - wy);
            let w01 = (1.0 - wx) * wy;
            let w11 = wx * wy;

            let off00 = y0 * src_stride + x0 * CHANNELS;
            let off10 = off00 + CHANNELS;
            let off01 = off00 + src_stride;
            let off11 = off01 + CHANNELS;

            for c in 0..3 {
                let value = f64::from(src[off00 + c]) * w00
                    + f64::from(src[off10 + c]) * w10
                    + f64::from(src[off01 + c]) * w01
                    + f64::from(src[off11 + c]) * w11;
                px[c] = value.round().clamp(0.0, 255.0) as u8;
            }
            px[3] = 255;
        }
    }

    debug!(
        target_width,
        target_height, background_pixels = filled, "Perspective warp complete"
    );
    output
}
