// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline configuration, persisted as JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FlatpageError, Result};
use crate::types::{OutputFormat, PaperSize, ProcessorSettings};

/// Tuning for the document boundary detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Larger side of the working copy, in pixels.
    pub max_dimension: u32,
    /// Scan exclusion band, as a fraction of the smaller working dimension.
    pub border_fraction: f64,
    /// Lower bound on the adaptive gradient threshold.
    pub min_threshold: f64,
    /// Adaptive threshold = mean gradient x this.
    pub gradient_multiplier: f64,
    /// Minimum share of scanned pixels that must be edges.
    pub min_edge_fraction: f64,
    /// Detections covering at most this share of the frame are noise.
    pub min_area_ratio: f64,
    /// Detections covering at least this share of the frame are the frame.
    pub max_area_ratio: f64,
    /// Inset of the fallback crop when detection fails.
    pub fallback_inset: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            max_dimension: 512,
            border_fraction: 0.05,
            min_threshold: 30.0,
            gradient_multiplier: 2.5,
            min_edge_fraction: 0.001,
            min_area_ratio: 0.05,
            max_area_ratio: 0.98,
            fallback_inset: 0.1,
        }
    }
}

/// Output page geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarpConfig {
    pub paper_size: PaperSize,
    /// Rectified page width in pixels; height follows the paper aspect ratio.
    pub target_width: u32,
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            target_width: 1240,
        }
    }
}

/// Encoding of the finished page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// JPEG quality, 1..=100. Ignored for PNG.
    pub jpeg_quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            jpeg_quality: 92,
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub detection: DetectionConfig,
    pub warp: WarpConfig,
    pub output: OutputConfig,
    /// Settings used when the caller supplies none.
    pub settings: ProcessorSettings,
}

impl ScanConfig {
    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.validate()?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let d = &self.detection;
        if d.max_dimension < 16 {
            return Err(FlatpageError::Config(format!(
                "detection.max_dimension must be at least 16, got {}",
                d.max_dimension
            )));
        }
        if !(0.0..0.5).contains(&d.border_fraction) {
            return Err(FlatpageError::Config(format!(
                "detection.border_fraction must be within [0, 0.5), got {}",
                d.border_fraction
            )));
        }
        if d.gradient_multiplier <= 0.0 || d.min_threshold < 0.0 {
            return Err(FlatpageError::Config(
                "detection thresholds must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&d.min_edge_fraction) {
            return Err(FlatpageError::Config(format!(
                "detection.min_edge_fraction must be within [0, 1], got {}",
                d.min_edge_fraction
            )));
        }
        if !(0.0 <= d.min_area_ratio && d.min_area_ratio < d.max_area_ratio && d.max_area_ratio <= 1.0)
        {
            return Err(FlatpageError::Config(format!(
                "detection area ratios must satisfy 0 <= min < max <= 1, got {} and {}",
                d.min_area_ratio, d.max_area_ratio
            )));
        }
        if !(0.0..0.5).contains(&d.fallback_inset) {
            return Err(FlatpageError::Config(format!(
                "detection.fallback_inset must be within [0, 0.5), got {}",
                d.fallback_inset
            )));
        }
        if self.warp.target_width == 0 {
            return Err(FlatpageError::Config("warp.target_width must be non-zero".into()));
        }
        let (w_mm, h_mm) = self.warp.paper_size.dimensions_mm();
        if w_mm == 0 || h_mm == 0 {
            return Err(FlatpageError::Config("paper size must be non-zero".into()));
        }
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(FlatpageError::Config(format!(
                "output.jpeg_quality must be within 1..=100, got {}",
                self.output.jpeg_quality
            )));
        }
        self.settings.validate()
    }
}
