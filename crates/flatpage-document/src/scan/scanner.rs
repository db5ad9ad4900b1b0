// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — locate the page in a photo, rectify it, and render the
// finished page with the user's tone and layout settings.

use flatpage_core::error::{FlatpageError, Result};
use flatpage_core::{OutputFormat, PaperSize, ProcessorSettings, Quadrilateral, ScanConfig};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::detect::EdgeDetector;
use crate::pdf::writer::PdfWriter;
use crate::raster::codec::{ImageCodec, StandardCodec};
use crate::raster::layout;
use crate::raster::surface::PixelSurface;
use crate::transform::homography;
use crate::transform::warp;

pub use crate::raster::filter::apply_filters;

// -- Stand-alone operations ---------------------------------------------------

/// Detect the document with default tuning; `None` means use a fallback crop.
pub fn detect_document_edges(image: &PixelSurface) -> Option<Quadrilateral> {
    EdgeDetector::default().detect(image).ok()
}

/// Default area-ratio plausibility gate.
pub fn validate_detection(quad: &Quadrilateral, width: u32, height: u32) -> bool {
    EdgeDetector::default().validate(quad, width, height)
}

/// Rectify `quad` out of `image` onto an A4-proportioned page and encode it
/// as PNG.
pub fn perform_warp(image: &PixelSurface, quad: &Quadrilateral, target_width: u32) -> Result<Vec<u8>> {
    let page = rectify(image, quad, target_width, PaperSize::A4)?;
    StandardCodec.encode(&page, OutputFormat::Png, 100)
}

/// Map `quad` onto a `target_width`-wide page of `paper_size` proportions.
///
/// Self-intersecting or collapsed corner placements are rejected with
/// [`FlatpageError::InvalidQuadrilateral`]; a singular system with
/// [`FlatpageError::DegenerateTransform`].
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn rectify(
    image: &PixelSurface,
    quad: &Quadrilateral,
    target_width: u32,
    paper_size: PaperSize,
) -> Result<PixelSurface> {
    if !quad.is_convex() {
        warn!(?quad, "Rejecting non-convex corner placement");
        return Err(FlatpageError::InvalidQuadrilateral(
            "corners must form a convex shape in clockwise order".into(),
        ));
    }

    let (out_w, out_h) = warp::target_dimensions(target_width, paper_size);
    let page = Quadrilateral::rectangle(f64::from(out_w), f64::from(out_h));

    // Inverse mapping: page pixel -> photo pixel.
    let matrix = homography::solve(&page, quad)?;
    let rectified = warp::warp(image, &matrix, out_w, out_h);
    info!(out_w, out_h, "Page rectified");
    Ok(rectified)
}

// -- Scanner facade -----------------------------------------------------------

/// Where the working corners came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CornerSource {
    /// Detected and passed the plausibility gate.
    Detected,
    /// Detection failed or was implausible; default inset crop.
    Fallback,
    /// Placed by the caller.
    Manual,
}

/// One photo moving through the pipeline.
///
/// Holds the decoded photo, the working corners, and the rectified page.
/// [`render`](Self::render) re-runs layout and filters from the rectified
/// page on every call, so settings can be changed freely.
pub struct DocumentScanner<C: ImageCodec = StandardCodec> {
    config: ScanConfig,
    codec: C,
    detector: EdgeDetector,
    source: PixelSurface,
    corners: Quadrilateral,
    corner_source: CornerSource,
    rectified: Option<PixelSurface>,
}

impl DocumentScanner<StandardCodec> {
    // -- Construction ---------------------------------------------------------

    /// Decode a photo and locate the page in it.
    #[instrument(skip(data, config), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8], config: ScanConfig) -> Result<Self> {
        Self::with_codec(data, config, StandardCodec)
    }

    /// Open a photo from disk and locate the page in it.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>, config: ScanConfig) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::with_codec(&data, config, StandardCodec)
    }

    /// Wrap an already-decoded photo.
    pub fn from_surface(source: PixelSurface, config: ScanConfig) -> Self {
        Self::build(source, config, StandardCodec)
    }
}

impl<C: ImageCodec> DocumentScanner<C> {
    /// Decode with a caller-supplied codec.
    pub fn with_codec(data: &[u8], config: ScanConfig, codec: C) -> Result<Self> {
        let source = codec.decode(data)?;
        Ok(Self::build(source, config, codec))
    }

    fn build(source: PixelSurface, config: ScanConfig, codec: C) -> Self {
        let detector = EdgeDetector::new(config.detection.clone());
        let (width, height) = source.dimensions();

        let (corners, corner_source) = match detector.detect(&source) {
            Ok(quad) if detector.validate(&quad, width, height) => (quad, CornerSource::Detected),
            Ok(quad) => {
                info!(?quad, "Detection implausible; using fallback crop");
                (
                    Quadrilateral::inset(width, height, config.detection.fallback_inset),
                    CornerSource::Fallback,
                )
            }
            Err(err) => {
                info!(%err, "No document detected; using fallback crop");
                (
                    Quadrilateral::inset(width, height, config.detection.fallback_inset),
                    CornerSource::Fallback,
                )
            }
        };

        Self {
            config,
            codec,
            detector,
            source,
            corners,
            corner_source,
            rectified: None,
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn source(&self) -> &PixelSurface {
        &self.source
    }

    pub fn corners(&self) -> Quadrilateral {
        self.corners
    }

    pub fn corner_source(&self) -> CornerSource {
        self.corner_source
    }

    pub fn detector(&self) -> &EdgeDetector {
        &self.detector
    }

    // -- Corners --------------------------------------------------------------

    /// Replace the working corners, clamped into the photo.
    ///
    /// Drops any previously rectified page.
    pub fn set_corners(&mut self, corners: Quadrilateral) {
        let (width, height) = self.source.dimensions();
        self.corners = corners.clamp_to(width, height);
        self.corner_source = CornerSource::Manual;
        self.rectified = None;
        debug!(corners = ?self.corners, "Corners placed manually");
    }

    // -- Rectification and rendering ------------------------------------------

    /// Warp the working corners onto the configured page, reusing a previous
    /// result when the corners have not changed.
    pub fn rectify(&mut self) -> Result<&PixelSurface> {
        let page = match self.rectified.take() {
            Some(page) => page,
            None => rectify(
                &self.source,
                &self.corners,
                self.config.warp.target_width,
                self.config.warp.paper_size,
            )?,
        };
        Ok(&*self.rectified.insert(page))
    }

    /// Rotate, add margin, and run the tone pipeline on a copy of the
    /// rectified page.
    #[instrument(skip(self, settings))]
    pub fn render(&mut self, settings: &ProcessorSettings) -> Result<PixelSurface> {
        settings.validate()?;
        let page = self.rectify()?;
        let mut rendered = layout::compose(page, settings.rotation, settings.margin);
        apply_filters(&mut rendered, settings);
        debug!(
            width = rendered.width(),
            height = rendered.height(),
            mode = ?settings.mode,
            "Page rendered"
        );
        Ok(rendered)
    }

    /// Render and encode with the configured codec.
    pub fn export(&mut self, settings: &ProcessorSettings, format: OutputFormat) -> Result<Vec<u8>> {
        let rendered = self.render(settings)?;
        self.codec
            .encode(&rendered, format, self.config.output.jpeg_quality)
    }

    /// Render and place on a single PDF page of the configured paper size.
    pub fn export_pdf(&mut self, settings: &ProcessorSettings) -> Result<Vec<u8>> {
        let rendered = self.render(settings)?;
        PdfWriter::new(self.config.warp.paper_size).create_from_surface(&rendered)
    }
}
