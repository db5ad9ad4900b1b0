// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — place a finished page surface on a single PDF page using
// `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use std::path::Path;

use flatpage_core::PaperSize;
use flatpage_core::error::{FlatpageError, Result};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument, warn};

use crate::raster::surface::PixelSurface;

/// Nominal resolution used to size the embedded image before fitting.
const IMAGE_DPI: f32 = 150.0;

/// Exports processed pages as single-page PDF documents.
pub struct PdfWriter {
    paper_size: PaperSize,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
    /// White border around the image, in millimetres.
    margin_mm: f32,
}

impl PdfWriter {
    pub fn new(paper_size: PaperSize) -> Self {
        Self {
            paper_size,
            title: None,
            margin_mm: 0.0,
        }
    }

    pub fn a4() -> Self {
        Self::new(PaperSize::A4)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Set the page margin; negative values are treated as zero.
    pub fn set_margin_mm(&mut self, margin_mm: f32) {
        self.margin_mm = margin_mm.max(0.0);
    }

    /// Paper dimensions in printpdf's Mm units.
    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.paper_size.dimensions_mm();
        (Mm(w_mm as f32), Mm(h_mm as f32))
    }

    // -- Surface to PDF -------------------------------------------------------

    /// Create a single-page PDF showing `surface`.
    ///
    /// The image is scaled to fit inside the page margins, preserving its
    /// aspect ratio, and centred. A rectified page already has the paper's
    /// aspect ratio, so it fills the page.
    #[instrument(skip(self, surface), fields(width = surface.width(), height = surface.height()))]
    pub fn create_from_surface(&self, surface: &PixelSurface) -> Result<Vec<u8>> {
        let (img_width, img_height) = surface.dimensions();
        if img_width == 0 || img_height == 0 {
            return Err(FlatpageError::PdfError(
                "cannot place an empty image on a page".into(),
            ));
        }

        let (page_w, page_h) = self.page_dimensions();
        let title = self.title.as_deref().unwrap_or("Flatpage Scan");
        info!(paper = ?self.paper_size, title, "Creating page PDF");

        // printpdf wants packed RGB.
        let rgb: Vec<u8> = surface
            .data()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        let raw = RawImage {
            pixels: RawImageData::U8(rgb),
            width: img_width as usize,
            height: img_height as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };

        let mut doc = PdfDocument::new(title);
        let xobject_id = doc.add_image(&raw);

        let margin_mm = self.margin_mm.min(page_w.0.min(page_h.0) / 2.0 - 1.0).max(0.0);
        let usable_w_pt = Mm(page_w.0 - 2.0 * margin_mm).into_pt().0;
        let usable_h_pt = Mm(page_h.0 - 2.0 * margin_mm).into_pt().0;

        let img_w_pt = img_width as f32 / IMAGE_DPI * 72.0;
        let img_h_pt = img_height as f32 / IMAGE_DPI * 72.0;
        let scale = (usable_w_pt / img_w_pt).min(usable_h_pt / img_h_pt);

        let rendered_w_pt = img_w_pt * scale;
        let rendered_h_pt = img_h_pt * scale;

        let margin_pt = Mm(margin_mm).into_pt().0;
        let x_offset = margin_pt + (usable_w_pt - rendered_w_pt) / 2.0;
        let y_offset = margin_pt + (usable_h_pt - rendered_h_pt) / 2.0;

        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(x_offset)),
                translate_y: Some(Pt(y_offset)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(IMAGE_DPI),
                rotate: None,
            },
        }];

        doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);
        debug!(rendered_w_pt, rendered_h_pt, scale, "Image placed on page");

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "PDF serialisation produced warnings");
        }

        Ok(output)
    }

    // -- File output convenience ----------------------------------------------

    /// Create a page PDF and write it directly to a file.
    pub fn write_to_file(&self, surface: &PixelSurface, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.create_from_surface(surface)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote page PDF to {}", path.as_ref().display());
        Ok(())
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::a4()
    }
}
