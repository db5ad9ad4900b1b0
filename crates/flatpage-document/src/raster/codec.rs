// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Codec boundary — decoding photos into surfaces and encoding finished pages.

use std::io::Cursor;

use flatpage_core::OutputFormat;
use flatpage_core::error::{FlatpageError, Result};
use image::ImageFormat;
use image::codecs::jpeg::JpegEncoder;
use tracing::{debug, instrument};

use super::surface::PixelSurface;

/// Decode/encode services consumed by the pipeline.
///
/// The pipeline treats codecs as opaque: a failure is reported once and never
/// retried.
pub trait ImageCodec {
    /// Decode an encoded image (PNG, JPEG, ...) into an RGBA surface.
    fn decode(&self, bytes: &[u8]) -> Result<PixelSurface>;

    /// Encode a surface. `quality` (1-100) only matters for lossy formats.
    fn encode(&self, surface: &PixelSurface, format: OutputFormat, quality: u8) -> Result<Vec<u8>>;
}

/// Codec backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCodec;

impl ImageCodec for StandardCodec {
    #[instrument(skip(self, bytes), fields(data_len = bytes.len()))]
    fn decode(&self, bytes: &[u8]) -> Result<PixelSurface> {
        if bytes.is_empty() {
            return Err(FlatpageError::Decode("empty input".into()));
        }
        let image = image::load_from_memory(bytes)
            .map_err(|err| FlatpageError::Decode(format!("failed to decode image: {}", err)))?;
        debug!(
            width = image.width(),
            height = image.height(),
            "Image decoded from bytes"
        );
        Ok(PixelSurface::from_dynamic(&image))
    }

    #[instrument(skip(self, surface), fields(width = surface.width(), height = surface.height()))]
    fn encode(&self, surface: &PixelSurface, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        match format {
            OutputFormat::Png => {
                let mut cursor = Cursor::new(&mut buffer);
                surface
                    .as_rgba()
                    .write_to(&mut cursor, ImageFormat::Png)
                    .map_err(|err| FlatpageError::Encode(format!("PNG encoding failed: {}", err)))?;
            }
            OutputFormat::Jpeg => {
                // JPEG has no alpha channel.
                let rgb = image::DynamicImage::ImageRgba8(surface.as_rgba().clone()).to_rgb8();
                let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
                rgb.write_with_encoder(encoder)
                    .map_err(|err| FlatpageError::Encode(format!("JPEG encoding failed: {}", err)))?;
            }
        }
        debug!(bytes = buffer.len(), ?format, "Surface encoded");
        Ok(buffer)
    }
}
