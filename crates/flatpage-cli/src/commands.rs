// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand implementations.

use std::path::Path;

use flatpage_core::error::{FlatpageError, Result};
use flatpage_core::{OutputFormat, Quadrilateral, ScanConfig};
use flatpage_document::{CornerSource, DetectionReport, DocumentScanner};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::cli::{Cli, Command, ConfigArgs, DetectArgs, ScanArgs};

/// What the output file extension asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Destination {
    Image(OutputFormat),
    Pdf,
}

impl Destination {
    fn for_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        if ext.eq_ignore_ascii_case("pdf") {
            return Ok(Self::Pdf);
        }
        OutputFormat::from_extension(ext)
            .map(Self::Image)
            .ok_or_else(|| {
                FlatpageError::InvalidSettings(format!(
                    "unsupported output extension '{}' (use .png, .jpg, or .pdf)",
                    ext
                ))
            })
    }
}

#[derive(Debug, Serialize)]
struct DetectOutput {
    width: u32,
    height: u32,
    source: CornerSource,
    corners: Quadrilateral,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<DetectionReport>,
}

/// Run the parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config_file.as_deref())?;
    match cli.command {
        Command::Scan(args) => scan(args, config),
        Command::Detect(args) => detect(args, config),
        Command::Config(args) => write_config(args, &config),
    }
}

fn load_config(path: Option<&Path>) -> Result<ScanConfig> {
    match path {
        Some(path) => {
            let config = ScanConfig::load(path)?;
            info!(path = %path.display(), "Configuration loaded");
            Ok(config)
        }
        None => Ok(ScanConfig::default()),
    }
}

#[instrument(skip_all, fields(input = %args.input.display(), output = %args.output.display()))]
fn scan(args: ScanArgs, mut config: ScanConfig) -> Result<()> {
    // Fail on a bad extension before doing any work.
    let destination = Destination::for_path(&args.output)?;
    args.page.apply(&mut config);
    config.validate()?;
    let settings = args.settings.resolve(&config.settings);
    settings.validate()?;

    let mut scanner = DocumentScanner::open(&args.input, config)?;
    if let Some(corners) = args.corners {
        scanner.set_corners(corners);
    } else if scanner.corner_source() == CornerSource::Fallback {
        warn!("No document edges found; cropping the default inset region");
    }

    let bytes = match destination {
        Destination::Image(format) => scanner.export(&settings, format)?,
        Destination::Pdf => scanner.export_pdf(&settings)?,
    };
    std::fs::write(&args.output, &bytes)?;

    info!(
        corners = ?scanner.corners(),
        source = ?scanner.corner_source(),
        bytes = bytes.len(),
        "Page written"
    );
    Ok(())
}

fn detect(args: DetectArgs, config: ScanConfig) -> Result<()> {
    let scanner = DocumentScanner::open(&args.input, config)?;
    let report = if args.report {
        scanner.detector().detect_with_report(scanner.source()).ok()
    } else {
        None
    };
    let (width, height) = scanner.source().dimensions();

    let output = DetectOutput {
        width,
        height,
        source: scanner.corner_source(),
        corners: scanner.corners(),
        report,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn write_config(args: ConfigArgs, config: &ScanConfig) -> Result<()> {
    match args.write {
        Some(path) => {
            config.save(&path)?;
            info!(path = %path.display(), "Configuration written");
        }
        None => println!("{}", serde_json::to_string_pretty(config)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use image::{Rgba, RgbaImage};

    fn write_photo(dir: &Path) -> std::path::PathBuf {
        let mut img = RgbaImage::from_pixel(300, 400, Rgba([15, 15, 15, 255]));
        for y in 60..340 {
            for x in 40..260 {
                img.put_pixel(x, y, Rgba([250, 250, 250, 255]));
            }
        }
        let path = dir.join("photo.png");
        img.save(&path).expect("save photo");
        path
    }

    fn run_args(args: &[&str]) -> Result<()> {
        let mut argv = vec!["flatpage"];
        argv.extend_from_slice(args);
        run(Cli::try_parse_from(argv).expect("valid arguments"))
    }

    #[test]
    fn destination_follows_extension() {
        assert_eq!(
            Destination::for_path(Path::new("out.PDF")).expect("pdf"),
            Destination::Pdf
        );
        assert_eq!(
            Destination::for_path(Path::new("out.jpeg")).expect("jpeg"),
            Destination::Image(OutputFormat::Jpeg)
        );
        assert!(matches!(
            Destination::for_path(Path::new("out.tiff")),
            Err(FlatpageError::InvalidSettings(_))
        ));
        assert!(Destination::for_path(Path::new("out")).is_err());
    }

    #[test]
    fn scan_writes_png_and_pdf() {
        let dir = tempfile::tempdir().expect("tempdir");
        let photo = write_photo(dir.path());
        let png = dir.path().join("page.png");
        let pdf = dir.path().join("page.pdf");

        run_args(&[
            "scan",
            photo.to_str().expect("utf-8"),
            "-o",
            png.to_str().expect("utf-8"),
            "--width",
            "200",
            "--mode",
            "grayscale",
        ])
        .expect("png scan");
        let page = image::open(&png).expect("decode page");
        assert_eq!(page.width(), 200);

        run_args(&[
            "scan",
            photo.to_str().expect("utf-8"),
            "-o",
            pdf.to_str().expect("utf-8"),
            "--width",
            "200",
            "--corners",
            "40,60,260,60,260,340,40,340",
        ])
        .expect("pdf scan");
        let bytes = std::fs::read(&pdf).expect("read pdf");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn missing_input_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.png");
        let out = dir.path().join("out.png");
        let result = run_args(&[
            "scan",
            missing.to_str().expect("utf-8"),
            "-o",
            out.to_str().expect("utf-8"),
        ]);
        assert!(matches!(result, Err(FlatpageError::Io(_))));
    }

    #[test]
    fn config_round_trips_through_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("flatpage.json");
        run_args(&["config", "--write", path.to_str().expect("utf-8")]).expect("write config");

        let loaded = ScanConfig::load(&path).expect("load");
        assert_eq!(loaded.warp, ScanConfig::default().warp);
        assert_eq!(loaded.settings, ScanConfig::default().settings);

        // The written file feeds back in through the global flag.
        run_args(&["--config-file", path.to_str().expect("utf-8"), "config"]).expect("print config");
    }
}
