// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document boundary detection — downsample, grayscale, box blur, Sobel
// gradient, adaptive threshold, and extremal-corner extraction.

use std::borrow::Cow;

use flatpage_core::config::DetectionConfig;
use flatpage_core::error::{FlatpageError, Result};
use flatpage_core::{Point, Quadrilateral};
use image::RgbaImage;
use image::imageops::{self, FilterType};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::raster::filter::luminance;
use crate::raster::surface::{CHANNELS, PixelSurface};

/// Everything the detector learned about one image.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    /// Corners in source-image coordinates.
    pub quadrilateral: Quadrilateral,
    /// Working-copy scale factor (`<= 1`).
    pub scale: f64,
    pub average_gradient: f64,
    pub threshold: f64,
    /// Pixels above the threshold inside the scan window.
    pub edge_pixels: usize,
    pub scanned_pixels: usize,
}

/// Finds the four extremal corners of the dominant edge structure in a photo.
#[derive(Debug, Clone, Default)]
pub struct EdgeDetector {
    config: DetectionConfig,
}

impl EdgeDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Detect the document quadrilateral, or [`FlatpageError::NotFound`].
    pub fn detect(&self, image: &PixelSurface) -> Result<Quadrilateral> {
        self.detect_with_report(image)
            .map(|report| report.quadrilateral)
    }

    /// Like [`detect`](Self::detect) but returns the intermediate statistics.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn detect_with_report(&self, image: &PixelSurface) -> Result<DetectionReport> {
        let (orig_w, orig_h) = image.dimensions();
        if orig_w == 0 || orig_h == 0 {
            warn!("Empty image; nothing to detect");
            return Err(FlatpageError::NotFound);
        }

        // Step 1: working copy with the larger side capped.
        let scale = (f64::from(self.config.max_dimension) / f64::from(orig_w.max(orig_h))).min(1.0);
        let working: Cow<'_, RgbaImage> = if scale < 1.0 {
            let w = ((f64::from(orig_w) * scale).round() as u32).max(1);
            let h = ((f64::from(orig_h) * scale).round() as u32).max(1);
            Cow::Owned(imageops::resize(image.as_rgba(), w, h, FilterType::Triangle))
        } else {
            Cow::Borrowed(image.as_rgba())
        };
        let (width, height) = (working.width() as usize, working.height() as usize);
        debug!(width, height, scale, "Working copy prepared");

        if width < 3 || height < 3 {
            warn!(width, height, "Image too small for edge detection");
            return Err(FlatpageError::NotFound);
        }

        // Steps 2-4: grayscale, blur, gradient magnitude.
        let gray = grayscale(working.as_raw());
        let blurred = box_blur(&gray, width, height);
        let (magnitude, average_gradient) = sobel_magnitude(&blurred, width, height);

        // Step 5: adaptive threshold.
        let threshold = self
            .config
            .min_threshold
            .max(average_gradient * self.config.gradient_multiplier);

        // Step 6: extremal edge pixels inside the scan window.
        let margin = (width.min(height) as f64 * self.config.border_fraction) as usize;
        let extremes = find_extremes(&magnitude, width, height, margin, threshold);

        // Step 7: too few edge pixels means no document.
        let min_edges = extremes.scanned as f64 * self.config.min_edge_fraction;
        debug!(
            average_gradient,
            threshold,
            margin,
            edge_pixels = extremes.count,
            scanned = extremes.scanned,
            "Edge scan complete"
        );
        let corners = match extremes.corners() {
            Some(corners) if extremes.count as f64 >= min_edges => corners,
            _ => {
                info!(
                    edge_pixels = extremes.count,
                    min_edges, "Too few edge pixels; no document found"
                );
                return Err(FlatpageError::NotFound);
            }
        };

        // Step 8: back to source coordinates.
        let quadrilateral = Quadrilateral::from_corners(corners).scale(1.0 / scale);
        info!(
            top_left = ?quadrilateral.top_left(),
            top_right = ?quadrilateral.top_right(),
            bottom_right = ?quadrilateral.bottom_right(),
            bottom_left = ?quadrilateral.bottom_left(),
            "Document boundary detected"
        );

        Ok(DetectionReport {
            quadrilateral,
            scale,
            average_gradient,
            threshold,
            edge_pixels: extremes.count,
            scanned_pixels: extremes.scanned,
        })
    }

    /// Area-ratio plausibility gate for a detection on a `width x height` frame.
    ///
    /// Rejects quads covering at most `min_area_ratio` of the frame (noise) or
    /// at least `max_area_ratio` (the frame itself).
    pub fn validate(&self, quad: &Quadrilateral, width: u32, height: u32) -> bool {
        let frame = f64::from(width) * f64::from(height);
        if frame <= 0.0 {
            return false;
        }
        let ratio = quad.area() / frame;
        let plausible = ratio > self.config.min_area_ratio && ratio < self.config.max_area_ratio;
        debug!(ratio, plausible, "Detection area ratio");
        plausible
    }
}

/// BT.601 luminance of each RGBA pixel.
fn grayscale(rgba: &[u8]) -> Vec<f64> {
    rgba.chunks_exact(CHANNELS)
        .map(|px| luminance(f64::from(px[0]), f64::from(px[1]), f64::from(px[2])))
        .collect()
}

/// 3x3 mean over the interior; the 1-px border keeps its input value.
fn box_blur(gray: &[f64], width: usize, height: usize) -> Vec<f64> {
    let mut out = gray.to_vec();
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut sum = 0.0;
            for row in (y - 1)..=(y + 1) {
                let base = row * width;
                sum += gray[base + x - 1] + gray[base + x] + gray[base + x + 1];
            }
            out[y * width + x] = sum / 9.0;
        }
    }
    out
}

/// Sobel gradient magnitude over the interior, plus its interior mean.
fn sobel_magnitude(img: &[f64], width: usize, height: usize) -> (Vec<f64>, f64) {
    let mut magnitude = vec![0.0; width * height];
    let mut total = 0.0;

    for y in 1..height - 1 {
        let above = (y - 1) * width;
        let here = y * width;
        let below = (y + 1) * width;
        for x in 1..width - 1 {
            let gx = (img[above + x + 1] + 2.0 * img[here + x + 1] + img[below + x + 1])
                - (img[above + x - 1] + 2.0 * img[here + x - 1] + img[below + x - 1]);
            let gy = (img[below + x - 1] + 2.0 * img[below + x] + img[below + x + 1])
                - (img[above + x - 1] + 2.0 * img[above + x] + img[above + x + 1]);
            let m = (gx * gx + gy * gy).sqrt();
            magnitude[here + x] = m;
            total += m;
        }
    }

    let interior = ((width - 2) * (height - 2)) as f64;
    (magnitude, total / interior)
}

/// Running extremes of `x + y` and `x - y` over edge pixels.
#[derive(Debug, Default)]
struct Extremes {
    top_left: Option<(i64, usize, usize)>,
    top_right: Option<(i64, usize, usize)>,
    bottom_right: Option<(i64, usize, usize)>,
    bottom_left: Option<(i64, usize, usize)>,
    count: usize,
    scanned: usize,
}

impl Extremes {
    fn corners(&self) -> Option<[Point; 4]> {
        let point = |e: Option<(i64, usize, usize)>| e.map(|(_, x, y)| Point::new(x as f64, y as f64));
        Some([
            point(self.top_left)?,
            point(self.top_right)?,
            point(self.bottom_right)?,
            point(self.bottom_left)?,
        ])
    }
}

/// Replace `slot` only when `key` strictly beats it, so the first pixel in
/// row-major order wins ties.
#[inline]
fn keep_if(slot: &mut Option<(i64, usize, usize)>, key: i64, x: usize, y: usize, better: fn(i64, i64) -> bool) {
    match slot {
        Some((best, _, _)) if !better(key, *best) => {}
        _ => *slot = Some((key, x, y)),
    }
}

/// Scan `[margin, dim - margin)` in row-major order for pixels above
/// `threshold` and track the four diagonal extremes.
fn find_extremes(
    magnitude: &[f64],
    width: usize,
    height: usize,
    margin: usize,
    threshold: f64,
) -> Extremes {
    let mut extremes = Extremes::default();
    if 2 * margin >= width || 2 * margin >= height {
        return extremes;
    }
    extremes.scanned = (width - 2 * margin) * (height - 2 * margin);

    let less = |a: i64, b: i64| a < b;
    let greater = |a: i64, b: i64| a > b;

    for y in margin..height - margin {
        let row = &magnitude[y * width..(y + 1) * width];
        for x in margin..width - margin {
            if row[x] <= threshold {
                continue;
            }
            extremes.count += 1;
            let sum = (x + y) as i64;
            let diff = x as i64 - y as i64;
            keep_if(&mut extremes.top_left, sum, x, y, less);
            keep_if(&mut extremes.bottom_right, sum, x, y, greater);
            keep_if(&mut extremes.bottom_left, diff, x, y, less);
            keep_if(&mut extremes.top_right, diff, x, y, greater);
        }
    }

    extremes
}
