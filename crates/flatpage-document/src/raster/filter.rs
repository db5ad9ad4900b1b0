// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tone and sharpness filters applied to the rectified page.

use flatpage_core::{FilterMode, ProcessorSettings};
use tracing::{debug, instrument};

use super::surface::{CHANNELS, PixelSurface};

/// Luminance weights (ITU-R BT.601) in thousandths; they sum to 1000 so a
/// neutral gray maps to exactly its own level.
const LUMA_R: f64 = 299.0;
const LUMA_G: f64 = 587.0;
const LUMA_B: f64 = 114.0;
const LUMA_SCALE: f64 = 1000.0;

/// Tone curve knees for the enhanced mode.
const HIGHLIGHT_KNEE: f64 = 180.0;
const SHADOW_KNEE: f64 = 100.0;
const HIGHLIGHT_GAIN: f64 = 1.2;
const SHADOW_GAIN: f64 = 0.5;

/// Brightness and contrast sliders are stretched by this factor.
const SLIDER_GAIN: f64 = 1.5;

#[inline]
pub(crate) fn luminance(r: f64, g: f64, b: f64) -> f64 {
    (LUMA_R * r + LUMA_G * g + LUMA_B * b) / LUMA_SCALE
}

#[inline]
fn to_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Apply the tone pipeline, then optional sharpening, to `surface` in place.
///
/// Per pixel, in order: grayscale (grayscale/binary modes), tone curve
/// (enhanced mode), brightness/contrast, binary cut (binary mode), clamp.
/// Alpha is never touched. The result depends only on the surface and the
/// settings; out-of-range settings are clamped first.
#[instrument(skip(surface), fields(width = surface.width(), height = surface.height()))]
pub fn apply_filters(surface: &mut PixelSurface, settings: &ProcessorSettings) {
    let settings = settings.clamped();

    let contrast = f64::from(settings.contrast) * SLIDER_GAIN;
    let contrast_factor = 259.0 * (contrast + 255.0) / (255.0 * (259.0 - contrast));
    let brightness = f64::from(settings.brightness) * SLIDER_GAIN;
    let threshold = f64::from(settings.threshold);
    let mode = settings.mode;

    debug!(contrast_factor, brightness, ?mode, "Applying tone pipeline");

    for px in surface.data_mut().chunks_exact_mut(CHANNELS) {
        let mut r = f64::from(px[0]);
        let mut g = f64::from(px[1]);
        let mut b = f64::from(px[2]);

        match mode {
            FilterMode::Grayscale | FilterMode::Binary => {
                let lum = luminance(r, g, b);
                r = lum;
                g = lum;
                b = lum;
            }
            FilterMode::Enhanced => {
                let lum = luminance(r, g, b);
                let new_lum = tone_curve(lum);
                if lum > 0.0 {
                    let ratio = new_lum / lum;
                    r *= ratio;
                    g *= ratio;
                    b *= ratio;
                }
            }
            FilterMode::Original => {}
        }

        r = contrast_factor * (r - 128.0) + 128.0 + brightness;
        g = contrast_factor * (g - 128.0) + 128.0 + brightness;
        b = contrast_factor * (b - 128.0) + 128.0 + brightness;

        if mode == FilterMode::Binary {
            let level = if (r + g + b) / 3.0 >= threshold { 255.0 } else { 0.0 };
            r = level;
            g = level;
            b = level;
        }

        px[0] = to_channel(r);
        px[1] = to_channel(g);
        px[2] = to_channel(b);
    }

    if settings.sharpness > 0 {
        sharpen(surface, settings.sharpness);
    }
}

/// Piecewise tone curve: lift highlights above 180, crush shadows below 100.
fn tone_curve(lum: f64) -> f64 {
    if lum > HIGHLIGHT_KNEE {
        (lum + (lum - HIGHLIGHT_KNEE) * HIGHLIGHT_GAIN).min(255.0)
    } else if lum < SHADOW_KNEE {
        (lum - (SHADOW_KNEE - lum) * SHADOW_GAIN).max(0.0)
    } else {
        lum
    }
}

/// Blend a 5-tap sharpening convolution into the interior of the surface.
///
/// Kernel: centre 5, the four axis neighbours -1. `strength` is a percentage;
/// the 1-px border is left untouched.
fn sharpen(surface: &mut PixelSurface, strength: u8) {
    let (width, height) = (surface.width() as usize, surface.height() as usize);
    if width < 3 || height < 3 {
        return;
    }

    let amount = f64::from(strength) / 100.0;
    let original = surface.data().to_vec();
    let data = surface.data_mut();
    let stride = width * CHANNELS;

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let offset = y * stride + x * CHANNELS;
            for c in 0..3 {
                let centre = f64::from(original[offset + c]);
                let convolved = 5.0 * centre
                    - f64::from(original[offset - stride + c])
                    - f64::from(original[offset + stride + c])
                    - f64::from(original[offset - CHANNELS + c])
                    - f64::from(original[offset + CHANNELS + c]);
                data[offset + c] = to_channel(centre + (convolved - centre) * amount);
            }
        }
    }

    debug!(strength, "Sharpening applied");
}
