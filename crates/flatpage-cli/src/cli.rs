// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line surface — argument definitions and their mapping onto the
// pipeline configuration.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use flatpage_core::{FilterMode, PaperSize, Point, ProcessorSettings, Quadrilateral, Rotation, ScanConfig};

/// Turn a photo of a paper document into a flat, print-ready page.
#[derive(Debug, Parser)]
#[command(name = "flatpage", version)]
pub struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file (see `flatpage config --write`).
    #[arg(long, global = true)]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Detect, rectify, and filter a photo; writes PNG, JPEG, or PDF by extension.
    Scan(ScanArgs),
    /// Print the detected corners as JSON.
    Detect(DetectArgs),
    /// Print the effective configuration, or write it to a file.
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Photo to scan (PNG, JPEG, ...).
    pub input: PathBuf,

    /// Output file; `.png`, `.jpg`/`.jpeg`, or `.pdf`.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Use these corners instead of detecting: `x1,y1,x2,y2,x3,y3,x4,y4`
    /// clockwise from top-left.
    #[arg(long, value_parser = parse_corners, allow_hyphen_values = true)]
    pub corners: Option<Quadrilateral>,

    #[command(flatten)]
    pub page: PageArgs,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    /// Photo to inspect.
    pub input: PathBuf,

    /// Include detector statistics.
    #[arg(long)]
    pub report: bool,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Write the configuration here instead of printing it.
    #[arg(long)]
    pub write: Option<PathBuf>,
}

/// Output page geometry.
#[derive(Debug, Args)]
pub struct PageArgs {
    /// Paper size of the rectified page.
    #[arg(long, value_enum)]
    pub paper: Option<Paper>,

    /// Rectified page width in pixels.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=20_000))]
    pub width: Option<u32>,

    /// JPEG quality (1-100).
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,
}

/// Tone and layout settings; unset flags keep the configured values.
#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Tone mode.
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Binary-mode luminance cutoff.
    #[arg(long)]
    pub threshold: Option<u8>,

    /// Unsharp strength (0-100).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub sharpness: Option<u8>,

    /// Brightness (-100 to 100).
    #[arg(long, allow_hyphen_values = true, value_parser = clap::value_parser!(i8).range(-100..=100))]
    pub brightness: Option<i8>,

    /// Contrast (-100 to 100).
    #[arg(long, allow_hyphen_values = true, value_parser = clap::value_parser!(i8).range(-100..=100))]
    pub contrast: Option<i8>,

    /// Clockwise rotation in degrees (0, 90, 180, 270).
    #[arg(long, value_parser = parse_rotation)]
    pub rotation: Option<Rotation>,

    /// White margin, percent of the page (0-50).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=50))]
    pub margin: Option<u8>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Mode {
    Original,
    Grayscale,
    Binary,
    Enhanced,
}

impl From<Mode> for FilterMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Original => FilterMode::Original,
            Mode::Grayscale => FilterMode::Grayscale,
            Mode::Binary => FilterMode::Binary,
            Mode::Enhanced => FilterMode::Enhanced,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Paper {
    A3,
    A4,
    A5,
    Letter,
    Legal,
}

impl From<Paper> for PaperSize {
    fn from(paper: Paper) -> Self {
        match paper {
            Paper::A3 => PaperSize::A3,
            Paper::A4 => PaperSize::A4,
            Paper::A5 => PaperSize::A5,
            Paper::Letter => PaperSize::Letter,
            Paper::Legal => PaperSize::Legal,
        }
    }
}

impl PageArgs {
    /// Overlay the given flags onto `config`.
    pub fn apply(&self, config: &mut ScanConfig) {
        if let Some(paper) = self.paper {
            config.warp.paper_size = paper.into();
        }
        if let Some(width) = self.width {
            config.warp.target_width = width;
        }
        if let Some(quality) = self.quality {
            config.output.jpeg_quality = quality;
        }
    }
}

impl SettingsArgs {
    /// The configured settings with the given flags overlaid.
    pub fn resolve(&self, base: &ProcessorSettings) -> ProcessorSettings {
        ProcessorSettings {
            threshold: self.threshold.unwrap_or(base.threshold),
            sharpness: self.sharpness.unwrap_or(base.sharpness),
            brightness: self.brightness.unwrap_or(base.brightness),
            contrast: self.contrast.unwrap_or(base.contrast),
            rotation: self.rotation.unwrap_or(base.rotation),
            margin: self.margin.unwrap_or(base.margin),
            mode: self.mode.map(FilterMode::from).unwrap_or(base.mode),
        }
    }
}

/// Parse `x1,y1,x2,y2,x3,y3,x4,y4` into a quadrilateral.
pub fn parse_corners(value: &str) -> Result<Quadrilateral, String> {
    let numbers = value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|err| format!("invalid coordinate '{}': {}", part.trim(), err))
        })
        .collect::<Result<Vec<f64>, String>>()?;

    let coords: [f64; 8] = numbers
        .try_into()
        .map_err(|v: Vec<f64>| format!("expected 8 comma-separated numbers, got {}", v.len()))?;
    if coords.iter().any(|c| !c.is_finite()) {
        return Err("coordinates must be finite".into());
    }

    Ok(Quadrilateral::new(
        Point::new(coords[0], coords[1]),
        Point::new(coords[2], coords[3]),
        Point::new(coords[4], coords[5]),
        Point::new(coords[6], coords[7]),
    ))
}

fn parse_rotation(value: &str) -> Result<Rotation, String> {
    let degrees: u16 = value
        .parse()
        .map_err(|err| format!("invalid rotation '{}': {}", value, err))?;
    Rotation::try_from(degrees).map_err(|err| err.to_string())
}
