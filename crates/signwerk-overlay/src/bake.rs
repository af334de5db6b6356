// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bake exporter — draws overlay annotations into the structured document.
//
// The source bytes are opened fresh on every export; the rendered rasters are
// never written back. Annotations are grouped per page and each page receives
// one draw batch, so a codec failure abandons that page whole and aborts the
// export.

use std::collections::BTreeMap;

use signwerk_core::error::Result;
use signwerk_core::{DocumentCodec, DrawOp, Rgb, StandardFont};
use tracing::{debug, info, instrument, warn};

use crate::annotation::{Annotation, AnnotationKind, CHECKBOX_SIZE};
use crate::mapper::{OverlayScale, document_bottom, to_document_space};

/// Offset of the check mark glyph from the checkbox's lower-left corner.
const CHECK_MARK_INSET: f32 = 2.0;
/// Size of the check mark glyph.
const CHECK_MARK_SIZE: f32 = 12.0;
/// ZapfDingbats code for a heavy check mark.
const CHECK_MARK_GLYPH: &str = "4";
const CHECKBOX_LINE_WIDTH: f32 = 1.0;

/// Turns an annotation list into a new document through a [`DocumentCodec`].
pub struct BakeExporter<'a, C: DocumentCodec> {
    codec: &'a C,
    scale: OverlayScale,
}

impl<'a, C: DocumentCodec> BakeExporter<'a, C> {
    /// An exporter with a 1:1 overlay-to-document mapping.
    pub fn new(codec: &'a C) -> Self {
        Self {
            codec,
            scale: OverlayScale::IDENTITY,
        }
    }

    /// Divide overlay positions and sizes by `scale` before mapping.
    pub fn with_scale(mut self, scale: OverlayScale) -> Self {
        self.scale = scale;
        self
    }

    /// Bake `annotations` into `document` and return the new document bytes.
    ///
    /// `page_count` is the number of pages the overlay was editing. Annotations
    /// on pages outside both it and the reopened document are skipped.
    #[instrument(skip_all, fields(bytes_len = document.len(), annotations = annotations.len()))]
    pub fn export(
        &self,
        document: &[u8],
        page_count: usize,
        annotations: &[Annotation],
    ) -> Result<Vec<u8>> {
        let mut handle = self.codec.open(document)?;
        let usable_pages = page_count.min(self.codec.page_count(&handle));

        let mut by_page: BTreeMap<usize, Vec<&Annotation>> = BTreeMap::new();
        for annotation in annotations {
            if annotation.page >= usable_pages {
                warn!(
                    id = %annotation.id,
                    page = annotation.page,
                    usable_pages,
                    "Annotation page outside document, skipping"
                );
                continue;
            }
            by_page.entry(annotation.page).or_default().push(annotation);
        }

        for (page, on_page) in by_page {
            let page_height = self.codec.page_size(&handle, page)?.height;
            let ops: Vec<DrawOp> = on_page
                .iter()
                .flat_map(|annotation| self.draw_ops_for(annotation, page_height))
                .collect();
            if ops.is_empty() {
                continue;
            }
            debug!(page, ops = ops.len(), page_height, "Drawing page batch");
            self.codec.draw_page(&mut handle, page, &ops)?;
        }

        let output = self.codec.save(handle)?;
        info!(output_bytes = output.len(), "Export complete");
        Ok(output)
    }

    /// Draw instructions for one annotation on a page of height `page_height`.
    ///
    /// Returns nothing for a signature whose image cannot be decoded.
    pub fn draw_ops_for(&self, annotation: &Annotation, page_height: f32) -> Vec<DrawOp> {
        let origin = to_document_space(self.scale.point_to_units(annotation.position), page_height);

        match &annotation.kind {
            AnnotationKind::Text(text) => vec![DrawOp::Text {
                x: origin.x,
                y: origin.y,
                text: text.text().to_string(),
                font: StandardFont::Helvetica,
                size: self.scale.to_units(text.font_size() as f32),
                color: text.color(),
            }],
            AnnotationKind::Checkbox(checkbox) => {
                let bottom = origin.y - CHECKBOX_SIZE;
                let mut ops = vec![DrawOp::Rect {
                    x: origin.x,
                    y: bottom,
                    width: CHECKBOX_SIZE,
                    height: CHECKBOX_SIZE,
                    stroke: Rgb::BLACK,
                    line_width: CHECKBOX_LINE_WIDTH,
                }];
                if checkbox.checked {
                    ops.push(DrawOp::Text {
                        x: origin.x + CHECK_MARK_INSET,
                        y: bottom + CHECK_MARK_INSET,
                        text: CHECK_MARK_GLYPH.to_string(),
                        font: StandardFont::ZapfDingbats,
                        size: CHECK_MARK_SIZE,
                        color: Rgb::BLACK,
                    });
                }
                ops
            }
            AnnotationKind::Signature(signature) => {
                let pixels = match image::load_from_memory(signature.image()) {
                    Ok(decoded) => decoded.to_rgba8(),
                    Err(err) => {
                        warn!(id = %annotation.id, %err, "Signature image failed to decode, skipping");
                        return Vec::new();
                    }
                };
                let size = signature.size();
                let width = self.scale.to_units(size.width);
                let height = self.scale.to_units(size.height);
                let top = self.scale.to_units(annotation.position.y);
                vec![DrawOp::Image {
                    x: origin.x,
                    y: document_bottom(top, height, page_height),
                    width,
                    height,
                    pixels,
                }]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, RgbaImage};
    use signwerk_core::{PageSize, Point, Size, SignwerkError};

    use super::*;
    use crate::annotation::{CheckboxAnnotation, SignatureAnnotation, TextAnnotation};

    /// Codec double that records every batch it is asked to draw.
    struct RecordingCodec {
        heights: Vec<f32>,
        fail_on_page: Option<usize>,
        batches: RefCell<Vec<(usize, Vec<DrawOp>)>>,
    }

    impl RecordingCodec {
        fn new(heights: &[f32]) -> Self {
            Self {
                heights: heights.to_vec(),
                fail_on_page: None,
                batches: RefCell::new(Vec::new()),
            }
        }

        fn ops_on(&self, page: usize) -> Vec<DrawOp> {
            self.batches
                .borrow()
                .iter()
                .filter(|(p, _)| *p == page)
                .flat_map(|(_, ops)| ops.clone())
                .collect()
        }
    }

    impl DocumentCodec for RecordingCodec {
        type Handle = ();

        fn open(&self, bytes: &[u8]) -> Result<()> {
            if bytes.is_empty() {
                return Err(SignwerkError::Codec("empty document".into()));
            }
            Ok(())
        }

        fn page_count(&self, _handle: &()) -> usize {
            self.heights.len()
        }

        fn page_size(&self, _handle: &(), page_index: usize) -> Result<PageSize> {
            Ok(PageSize {
                width: 612.0,
                height: self.heights[page_index],
            })
        }

        fn draw_page(&self, _handle: &mut (), page_index: usize, ops: &[DrawOp]) -> Result<()> {
            if self.fail_on_page == Some(page_index) {
                return Err(SignwerkError::Codec("draw failed".into()));
            }
            self.batches.borrow_mut().push((page_index, ops.to_vec()));
            Ok(())
        }

        fn save(&self, _handle: ()) -> Result<Vec<u8>> {
            Ok(b"%PDF-baked".to_vec())
        }
    }

    fn png_bytes() -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::new(4, 2))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn text(page: usize, x: f32, y: f32, value: &str) -> Annotation {
        Annotation::new(
            page,
            Point::new(x, y),
            AnnotationKind::Text(TextAnnotation::new(value, 12, Rgb::new(0, 0, 255)).unwrap()),
        )
    }

    fn checkbox(x: f32, y: f32, checked: bool) -> Annotation {
        Annotation::new(
            0,
            Point::new(x, y),
            AnnotationKind::Checkbox(CheckboxAnnotation { checked }),
        )
    }

    fn signature(image: Vec<u8>) -> Annotation {
        Annotation::new(
            0,
            Point::new(50.0, 100.0),
            AnnotationKind::Signature(SignatureAnnotation::new(image, Size::new(150.0, 60.0))),
        )
    }

    #[test]
    fn text_lands_on_flipped_baseline_and_other_pages_stay_untouched() {
        let codec = RecordingCodec::new(&[792.0, 600.0]);
        let output = BakeExporter::new(&codec)
            .export(b"%PDF", 2, &[text(0, 10.0, 10.0, "Hi")])
            .unwrap();

        assert_eq!(output, b"%PDF-baked");
        assert_eq!(
            codec.ops_on(0),
            vec![DrawOp::Text {
                x: 10.0,
                y: 782.0,
                text: "Hi".into(),
                font: StandardFont::Helvetica,
                size: 12.0,
                color: Rgb::new(0, 0, 255),
            }]
        );
        assert!(codec.ops_on(1).is_empty());
    }

    #[test]
    fn checked_box_draws_outline_and_check_mark() {
        let codec = RecordingCodec::new(&[792.0]);
        BakeExporter::new(&codec)
            .export(b"%PDF", 1, &[checkbox(20.0, 20.0, true)])
            .unwrap();

        let ops = codec.ops_on(0);
        assert_eq!(ops.len(), 2);
        assert_eq!(
            ops[0],
            DrawOp::Rect {
                x: 20.0,
                y: 757.0,
                width: 15.0,
                height: 15.0,
                stroke: Rgb::BLACK,
                line_width: 1.0,
            }
        );
        assert_eq!(
            ops[1],
            DrawOp::Text {
                x: 22.0,
                y: 759.0,
                text: "4".into(),
                font: StandardFont::ZapfDingbats,
                size: 12.0,
                color: Rgb::BLACK,
            }
        );
    }

    #[test]
    fn unchecked_box_draws_outline_only() {
        let codec = RecordingCodec::new(&[792.0]);
        BakeExporter::new(&codec)
            .export(b"%PDF", 1, &[checkbox(20.0, 20.0, false)])
            .unwrap();
        assert_eq!(codec.ops_on(0).len(), 1);
    }

    #[test]
    fn signature_anchors_on_its_bottom_edge() {
        let codec = RecordingCodec::new(&[792.0]);
        BakeExporter::new(&codec)
            .export(b"%PDF", 1, &[signature(png_bytes())])
            .unwrap();

        match &codec.ops_on(0)[..] {
            [DrawOp::Image { x, y, width, height, pixels }] => {
                assert_eq!((*x, *y), (50.0, 632.0));
                assert_eq!((*width, *height), (150.0, 60.0));
                assert_eq!(pixels.dimensions(), (4, 2));
            }
            other => panic!("unexpected ops {other:?}"),
        }
    }

    #[test]
    fn corrupt_signature_is_skipped_and_export_continues() {
        let codec = RecordingCodec::new(&[792.0]);
        let annotations = [signature(vec![0xde, 0xad]), text(0, 1.0, 1.0, "after")];
        BakeExporter::new(&codec)
            .export(b"%PDF", 1, &annotations)
            .unwrap();

        let ops = codec.ops_on(0);
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], DrawOp::Text { text, .. } if text == "after"));
    }

    #[test]
    fn batches_keep_store_order() {
        let codec = RecordingCodec::new(&[792.0]);
        let annotations = [
            text(0, 0.0, 0.0, "first"),
            checkbox(5.0, 5.0, false),
            text(0, 0.0, 0.0, "last"),
        ];
        BakeExporter::new(&codec)
            .export(b"%PDF", 1, &annotations)
            .unwrap();

        let ops = codec.ops_on(0);
        assert!(matches!(&ops[0], DrawOp::Text { text, .. } if text == "first"));
        assert!(matches!(&ops[1], DrawOp::Rect { .. }));
        assert!(matches!(&ops[2], DrawOp::Text { text, .. } if text == "last"));
        assert_eq!(codec.batches.borrow().len(), 1);
    }

    #[test]
    fn codec_failure_aborts_the_export() {
        let mut codec = RecordingCodec::new(&[792.0, 792.0]);
        codec.fail_on_page = Some(1);
        let result = BakeExporter::new(&codec).export(
            b"%PDF",
            2,
            &[text(0, 0.0, 0.0, "a"), text(1, 0.0, 0.0, "b")],
        );
        assert!(matches!(result, Err(SignwerkError::Codec(_))));

        let empty = BakeExporter::new(&codec).export(b"", 2, &[]);
        assert!(matches!(empty, Err(SignwerkError::Codec(_))));
    }

    #[test]
    fn annotations_beyond_the_page_list_are_skipped() {
        let codec = RecordingCodec::new(&[792.0]);
        BakeExporter::new(&codec)
            .export(b"%PDF", 1, &[text(3, 0.0, 0.0, "lost")])
            .unwrap();
        assert!(codec.batches.borrow().is_empty());
    }

    #[test]
    fn overlay_scale_divides_before_flipping() {
        let codec = RecordingCodec::new(&[792.0]);
        let exporter = BakeExporter::new(&codec).with_scale(OverlayScale::new(2.0));
        let ops = exporter.draw_ops_for(&text(0, 20.0, 40.0, "x"), 792.0);
        assert!(matches!(
            &ops[0],
            DrawOp::Text { x, y, size, .. } if (*x, *y, *size) == (10.0, 772.0, 6.0)
        ));
    }
}
