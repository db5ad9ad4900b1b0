// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page layout — quarter-turn rotation and margin scaling of the rectified
// page before tone filtering.

use flatpage_core::Rotation;
use image::{Rgba, RgbaImage, imageops};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use tracing::{debug, instrument};

use super::surface::PixelSurface;

/// Page background used for the margin band.
const PAPER_WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Rotate `surface` clockwise and shrink it into a white page margin.
///
/// The canvas keeps the rotated dimensions (width and height swap for 90 and
/// 270 degrees). Content is scaled by `1 - margin/100` about the canvas
/// centre; the uncovered band is opaque white.
#[instrument(skip(surface), fields(width = surface.width(), height = surface.height()))]
pub fn compose(surface: &PixelSurface, rotation: Rotation, margin: u8) -> PixelSurface {
    let rgba = surface.as_rgba();

    // Quarter turns are lossless.
    let rotated: RgbaImage = match rotation {
        Rotation::Upright => rgba.clone(),
        Rotation::Clockwise90 => imageops::rotate90(rgba),
        Rotation::Half => imageops::rotate180(rgba),
        Rotation::Clockwise270 => imageops::rotate270(rgba),
    };
    debug!(
        degrees = rotation.degrees(),
        swapped = rotation.swaps_dimensions(),
        "Page rotated"
    );

    let margin = margin.min(flatpage_core::ProcessorSettings::MAX_MARGIN);
    if margin == 0 {
        return PixelSurface::from_rgba(rotated);
    }

    let (width, height) = rotated.dimensions();
    let scale = 1.0 - f32::from(margin) / 100.0;
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let projection = Projection::translate(cx, cy)
        * Projection::scale(scale, scale)
        * Projection::translate(-cx, -cy);

    let mut canvas = RgbaImage::from_pixel(width, height, PAPER_WHITE);
    warp_into(
        &rotated,
        &projection,
        Interpolation::Bilinear,
        PAPER_WHITE,
        &mut canvas,
    );

    debug!(width, height, scale, "Page composed with margin");
    PixelSurface::from_rgba(canvas)
}
