// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixel surface — an owned RGBA8 raster addressed as a flat buffer.

use flatpage_core::error::{FlatpageError, Result};
use image::{DynamicImage, Rgba, RgbaImage};

/// Bytes per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// An owned `width x height` buffer of RGBA8 samples.
///
/// Pixel `(x, y)` lives at pixel index `y * width + x`, i.e. at byte offset
/// `(y * width + x) * 4`. Backed by an `image::RgbaImage` so it can be handed
/// to `image`/`imageproc` without copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelSurface {
    image: RgbaImage,
}

impl PixelSurface {
    // -- Construction ---------------------------------------------------------

    /// Allocate a transparent black surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Allocate a surface with every pixel set to `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(rgba)),
        }
    }

    /// Wrap a raw RGBA8 buffer. Fails if the length is not `width*height*4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        let actual = data.len();
        RgbaImage::from_raw(width, height, data)
            .map(|image| Self { image })
            .ok_or_else(|| {
                FlatpageError::Decode(format!(
                    "pixel buffer holds {actual} bytes, expected {expected} for {width}x{height}"
                ))
            })
    }

    pub fn from_rgba(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Convert any decoded image to RGBA8.
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        Self {
            image: image.to_rgba8(),
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Pixel index of `(x, y)`; multiply by [`CHANNELS`] for the byte offset.
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.image.width() as usize + x as usize
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let offset = self.index(x, y) * CHANNELS;
        let data = self.image.as_raw();
        [data[offset], data[offset + 1], data[offset + 2], data[offset + 3]]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let offset = self.index(x, y) * CHANNELS;
        let data: &mut [u8] = &mut self.image;
        data[offset..offset + CHANNELS].copy_from_slice(&rgba);
    }

    /// The flat sample buffer, row-major RGBA.
    pub fn data(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }
}
