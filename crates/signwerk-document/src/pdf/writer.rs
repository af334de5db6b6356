// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — build new PDF documents from raster images using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use signwerk_core::DocumentType;
use signwerk_core::error::{Result, SignwerkError};
use tracing::{debug, info, instrument, warn};

/// At 72 DPI one image pixel is exactly one PDF point.
const POINTS_PER_INCH: f32 = 72.0;
const MM_PER_INCH: f32 = 25.4;

/// Creates new PDF documents from raster images.
pub struct PdfWriter {
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self { title: None }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    // -- Images to PDF --------------------------------------------------------

    /// Create a PDF with one page per image, in input order.
    ///
    /// Each page is exactly the size of its image (one pixel per point) and
    /// the image covers it from the origin. Only PNG and JPEG are accepted;
    /// other inputs, and images that fail to decode, are skipped. If nothing
    /// is left the call fails: `ImageError` when some PNG/JPEG input was
    /// damaged, `UnsupportedDocument` otherwise.
    #[instrument(skip_all, fields(inputs = images.len()))]
    pub fn images_to_pdf(&self, images: &[&[u8]]) -> Result<Vec<u8>> {
        let title = self.title.as_deref().unwrap_or("Signwerk Images");
        info!(title, "Creating image PDF");

        let mut doc = PdfDocument::new(title);
        let mut pages: Vec<PdfPage> = Vec::with_capacity(images.len());
        let mut damaged = 0usize;

        for (index, image_bytes) in images.iter().enumerate() {
            let format = match DocumentType::sniff(image_bytes).map(|kind| kind.image_format()) {
                Ok(Some(format)) => format,
                Ok(None) => {
                    warn!(index, "Input is a PDF, not an image, skipping");
                    continue;
                }
                Err(err) => {
                    warn!(index, %err, "Input is not a PNG or JPEG image, skipping");
                    continue;
                }
            };
            let dynamic_image = match ::image::load_from_memory_with_format(image_bytes, format) {
                Ok(decoded) => decoded,
                Err(err) => {
                    warn!(index, %err, "Image failed to decode, skipping");
                    damaged += 1;
                    continue;
                }
            };

            let width_px = dynamic_image.width();
            let height_px = dynamic_image.height();
            let raw = RawImage {
                pixels: RawImageData::U8(dynamic_image.to_rgb8().into_raw()),
                width: width_px as usize,
                height: height_px as usize,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = doc.add_image(&raw);

            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(0.0)),
                    translate_y: Some(Pt(0.0)),
                    scale_x: None,
                    scale_y: None,
                    dpi: Some(POINTS_PER_INCH),
                    rotate: None,
                },
            }];

            debug!(index, width_px, height_px, "Image page added");
            pages.push(PdfPage::new(
                points_to_mm(width_px as f32),
                points_to_mm(height_px as f32),
                ops,
            ));
        }

        if pages.is_empty() {
            return Err(if damaged > 0 {
                SignwerkError::ImageError(format!("{} PNG/JPEG inputs failed to decode", damaged))
            } else {
                SignwerkError::UnsupportedDocument("no PNG or JPEG image among the inputs".into())
            });
        }

        let page_count = pages.len();
        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        debug!(page_count, warnings = warnings.len(), output_bytes = output.len(), "Image PDF saved");

        Ok(output)
    }
}

fn points_to_mm(points: f32) -> Mm {
    Mm(points / POINTS_PER_INCH * MM_PER_INCH)
}
