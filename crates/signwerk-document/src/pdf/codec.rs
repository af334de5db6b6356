// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lopdf document codec — the `DocumentCodec` the bake exporter draws through.
//
// A draw batch becomes one appended content stream. The page's existing
// content is wrapped in `q`/`Q` first so a graphics state it leaves behind
// cannot skew the baked drawing. Everything the batch needs (content bytes,
// image objects, resource entries) is built before the page is touched.

use image::RgbaImage;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use signwerk_core::error::{Result, SignwerkError};
use signwerk_core::{DocumentCodec, DrawOp, PageSize, Rgb, StandardFont};
use tracing::{debug, instrument};

use super::page::{self, MediaBox};

/// Prefix for image XObjects added by a bake.
const IMAGE_RESOURCE_PREFIX: &str = "SwImg";

/// A parsed document plus its page ids in page order.
pub struct LopdfHandle {
    document: Document,
    pages: Vec<ObjectId>,
}

impl LopdfHandle {
    fn page_id(&self, page_index: usize) -> Result<ObjectId> {
        self.pages
            .get(page_index)
            .copied()
            .ok_or(SignwerkError::PageOutOfRange {
                page: page_index,
                page_count: self.pages.len(),
            })
    }
}

/// `DocumentCodec` over `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfCodec;

impl LopdfCodec {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentCodec for LopdfCodec {
    type Handle = LopdfHandle;

    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    fn open(&self, bytes: &[u8]) -> Result<LopdfHandle> {
        let document = page::load_pdf(bytes, "PDF for baking")?;
        let pages: Vec<ObjectId> = document.get_pages().into_values().collect();
        debug!(pages = pages.len(), "PDF opened for baking");
        Ok(LopdfHandle { document, pages })
    }

    fn page_count(&self, handle: &LopdfHandle) -> usize {
        handle.pages.len()
    }

    fn page_size(&self, handle: &LopdfHandle, page_index: usize) -> Result<PageSize> {
        let page_id = handle.page_id(page_index)?;
        Ok(page::media_box(&handle.document, page_id)?.size())
    }

    #[instrument(skip(self, handle, ops), fields(ops = ops.len()))]
    fn draw_page(&self, handle: &mut LopdfHandle, page_index: usize, ops: &[DrawOp]) -> Result<()> {
        if ops.is_empty() {
            return Ok(());
        }
        let page_id = handle.page_id(page_index)?;
        let batch = PageBatch::build(&handle.document, page_id, ops)?;
        batch.commit(&mut handle.document, page_id)?;
        debug!(page_index, "Batch drawn");
        Ok(())
    }

    #[instrument(skip_all)]
    fn save(&self, handle: LopdfHandle) -> Result<Vec<u8>> {
        let mut document = handle.document;
        page::save_to_vec(&mut document, "baked PDF")
    }
}

// -- Batch construction -------------------------------------------------------

/// An image waiting to be added to the document under `name`.
struct PendingImage {
    name: String,
    pixels: Stream,
    alpha: Stream,
}

/// The fully prepared result of one draw batch.
struct PageBatch {
    resources: Dictionary,
    fonts: Dictionary,
    xobjects: Dictionary,
    images: Vec<PendingImage>,
    content: Vec<u8>,
}

impl PageBatch {
    fn build(doc: &Document, page_id: ObjectId, ops: &[DrawOp]) -> Result<Self> {
        let media = page::media_box(doc, page_id)?;
        let resources = match page::inherited(doc, page_id, b"Resources") {
            Some(Object::Dictionary(dict)) => dict.clone(),
            Some(_) => {
                return Err(SignwerkError::PdfError(
                    "page /Resources is not a dictionary".into(),
                ));
            }
            None => Dictionary::new(),
        };
        let mut batch = Self {
            fonts: sub_dictionary(doc, &resources, b"Font")?,
            xobjects: sub_dictionary(doc, &resources, b"XObject")?,
            resources,
            images: Vec::new(),
            content: Vec::new(),
        };

        let mut operations = Vec::new();
        for op in ops {
            batch.encode(op, media, &mut operations);
        }
        batch.content = Content { operations }
            .encode()
            .map_err(|err| SignwerkError::Codec(format!("failed to encode content: {}", err)))?;
        Ok(batch)
    }

    fn encode(&mut self, op: &DrawOp, media: MediaBox, out: &mut Vec<Operation>) {
        match op {
            DrawOp::Text {
                x,
                y,
                text,
                font,
                size,
                color,
            } => {
                let name = font_resource_name(*font);
                self.fonts.set(name, font_dictionary(*font));
                out.extend([
                    Operation::new("BT", vec![]),
                    color_operation("rg", *color),
                    Operation::new("Tf", vec![name.into(), (*size).into()]),
                    Operation::new("Td", vec![(x + media.llx).into(), (y + media.lly).into()]),
                    Operation::new("Tj", vec![Object::string_literal(encode_text(text, *font))]),
                    Operation::new("ET", vec![]),
                ]);
            }
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                stroke,
                line_width,
            } => out.extend([
                Operation::new("q", vec![]),
                color_operation("RG", *stroke),
                Operation::new("w", vec![(*line_width).into()]),
                Operation::new(
                    "re",
                    vec![
                        (x + media.llx).into(),
                        (y + media.lly).into(),
                        (*width).into(),
                        (*height).into(),
                    ],
                ),
                Operation::new("S", vec![]),
                Operation::new("Q", vec![]),
            ]),
            DrawOp::Image {
                x,
                y,
                width,
                height,
                pixels,
            } => {
                let name = self.reserve_image_name();
                let (rgb, alpha) = image_streams(pixels);
                out.extend([
                    Operation::new("q", vec![]),
                    Operation::new(
                        "cm",
                        vec![
                            (*width).into(),
                            0.into(),
                            0.into(),
                            (*height).into(),
                            (x + media.llx).into(),
                            (y + media.lly).into(),
                        ],
                    ),
                    Operation::new("Do", vec![Object::Name(name.clone().into_bytes())]),
                    Operation::new("Q", vec![]),
                ]);
                self.images.push(PendingImage {
                    name,
                    pixels: rgb,
                    alpha,
                });
            }
        }
    }

    /// First free `SwImg<n>` name in the page's XObject dictionary.
    fn reserve_image_name(&mut self) -> String {
        let mut index = self.xobjects.len() + self.images.len();
        loop {
            let name = format!("{}{}", IMAGE_RESOURCE_PREFIX, index);
            let taken = self.xobjects.has(name.as_bytes())
                || self.images.iter().any(|image| image.name == name);
            if !taken {
                return name;
            }
            index += 1;
        }
    }

    fn commit(self, doc: &mut Document, page_id: ObjectId) -> Result<()> {
        let existing = existing_contents(doc, page_id);
        // Fail before anything is added to the document.
        page::page_dict(doc, page_id)?;

        let Self {
            mut resources,
            fonts,
            mut xobjects,
            images,
            content,
        } = self;

        for image in images {
            let alpha_id = doc.add_object(image.alpha);
            let mut pixels = image.pixels;
            pixels.dict.set("SMask", alpha_id);
            let image_id = doc.add_object(pixels);
            xobjects.set(image.name, image_id);
        }
        if !fonts.is_empty() {
            resources.set("Font", fonts);
        }
        if !xobjects.is_empty() {
            resources.set("XObject", xobjects);
        }

        let open_id = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
        let mut body = b"Q\n".to_vec();
        body.extend_from_slice(&content);
        let draw_id = doc.add_object(Stream::new(dictionary! {}, body));

        let mut contents = Vec::with_capacity(existing.len() + 2);
        contents.push(Object::Reference(open_id));
        contents.extend(existing);
        contents.push(Object::Reference(draw_id));

        let page = doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|err| SignwerkError::PdfError(format!("page unreadable: {}", err)))?;
        page.set("Resources", resources);
        page.set("Contents", contents);
        Ok(())
    }
}

/// A resource sub-dictionary (`/Font`, `/XObject`), resolved and copied so it
/// can be extended without touching objects other pages may share.
fn sub_dictionary(doc: &Document, resources: &Dictionary, key: &[u8]) -> Result<Dictionary> {
    match resources.get(key) {
        Ok(value) => match page::resolve(doc, value)? {
            Object::Dictionary(dict) => Ok(dict.clone()),
            _ => Err(SignwerkError::PdfError(format!(
                "resource /{} is not a dictionary",
                String::from_utf8_lossy(key)
            ))),
        },
        Err(_) => Ok(Dictionary::new()),
    }
}

/// The page's content stream references, in drawing order.
fn existing_contents(doc: &Document, page_id: ObjectId) -> Vec<Object> {
    let Ok(page) = page::page_dict(doc, page_id) else {
        return Vec::new();
    };
    match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

fn font_resource_name(font: StandardFont) -> &'static str {
    match font {
        StandardFont::Helvetica => "SwHelv",
        StandardFont::ZapfDingbats => "SwZapf",
    }
}

fn font_dictionary(font: StandardFont) -> Dictionary {
    match font {
        StandardFont::Helvetica => dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        },
        StandardFont::ZapfDingbats => dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "ZapfDingbats",
        },
    }
}

fn color_operation(operator: &str, color: Rgb) -> Operation {
    let (r, g, b) = color.to_unit();
    Operation::new(operator, vec![r.into(), g.into(), b.into()])
}

/// Single-byte encoding for a standard font. Helvetica uses WinAnsi, which
/// agrees with Latin-1 outside 0x80..0xA0; anything else becomes `?`.
fn encode_text(text: &str, font: StandardFont) -> Vec<u8> {
    text.chars()
        .map(|c| match (font, u32::from(c)) {
            (StandardFont::ZapfDingbats, code) if code < 0x80 => code as u8,
            (StandardFont::Helvetica, code) if code < 0x80 || (0xA0..=0xFF).contains(&code) => {
                code as u8
            }
            _ => b'?',
        })
        .collect()
}

/// Split RGBA pixels into a DeviceRGB image stream and its DeviceGray soft
/// mask.
fn image_streams(pixels: &RgbaImage) -> (Stream, Stream) {
    let (width, height) = pixels.dimensions();
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    for pixel in pixels.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }

    let mask = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        alpha,
    );
    let image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        rgb,
    );
    (image, mask)
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;
    use crate::pdf::fixtures::sample_pdf;

    fn reopen(bytes: &[u8]) -> (Document, Vec<ObjectId>) {
        let doc = Document::load_mem(bytes).unwrap();
        let pages = doc.get_pages().into_values().collect();
        (doc, pages)
    }

    fn operations(doc: &Document, page_id: ObjectId) -> Vec<Operation> {
        let content = doc.get_page_content(page_id).unwrap();
        Content::decode(&content).unwrap().operations
    }

    fn floats(op: &Operation) -> Vec<f32> {
        op.operands.iter().map(|o| o.as_float().unwrap()).collect()
    }

    #[test]
    fn page_geometry_comes_from_the_media_box() {
        let codec = LopdfCodec::new();
        let handle = codec.open(&sample_pdf(&[(612, 792), (300, 500)])).unwrap();
        assert_eq!(codec.page_count(&handle), 2);
        assert_eq!(
            codec.page_size(&handle, 1).unwrap(),
            PageSize { width: 300.0, height: 500.0 }
        );
        assert!(matches!(
            codec.page_size(&handle, 2),
            Err(SignwerkError::PageOutOfRange { page: 2, page_count: 2 })
        ));
    }

    #[test]
    fn non_pdf_content_is_unsupported() {
        assert!(matches!(
            LopdfCodec::new().open(b"not a pdf"),
            Err(SignwerkError::UnsupportedDocument(_))
        ));
    }

    #[test]
    fn text_batch_is_appended_after_existing_content() {
        let codec = LopdfCodec::new();
        let mut handle = codec.open(&sample_pdf(&[(612, 792)])).unwrap();
        codec
            .draw_page(
                &mut handle,
                0,
                &[DrawOp::Text {
                    x: 10.0,
                    y: 782.0,
                    text: "Hi".into(),
                    font: StandardFont::Helvetica,
                    size: 12.0,
                    color: Rgb::new(255, 0, 0),
                }],
            )
            .unwrap();
        let (doc, pages) = reopen(&codec.save(handle).unwrap());
        let ops = operations(&doc, pages[0]);

        let operators: Vec<&str> = ops.iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(operators.first(), Some(&"q"));
        let restore = operators.iter().position(|op| *op == "Q").unwrap();
        let original = operators.iter().position(|op| *op == "Tj").unwrap();
        assert!(original < restore, "original content stays inside q/Q");

        let td = ops.iter().rfind(|op| op.operator == "Td").unwrap();
        assert_eq!(floats(td), vec![10.0, 782.0]);
        let rg = ops.iter().find(|op| op.operator == "rg").unwrap();
        assert_eq!(floats(rg), vec![1.0, 0.0, 0.0]);
        let tj = ops.iter().rfind(|op| op.operator == "Tj").unwrap();
        assert_eq!(tj.operands[0].as_str().unwrap(), b"Hi");

        // Inherited fonts survive alongside the added one.
        let resources = page::inherited(&doc, pages[0], b"Resources").unwrap();
        let fonts = page::resolve(&doc, resources.as_dict().unwrap().get(b"Font").unwrap())
            .unwrap()
            .as_dict()
            .unwrap();
        assert!(fonts.has(b"F1"));
        assert!(fonts.has(b"SwHelv"));
    }

    #[test]
    fn rect_and_image_are_positioned_in_page_space() {
        let codec = LopdfCodec::new();
        let mut handle = codec.open(&sample_pdf(&[(612, 792)])).unwrap();
        let pixels = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 128]));
        codec
            .draw_page(
                &mut handle,
                0,
                &[
                    DrawOp::Rect {
                        x: 20.0,
                        y: 757.0,
                        width: 15.0,
                        height: 15.0,
                        stroke: Rgb::BLACK,
                        line_width: 1.0,
                    },
                    DrawOp::Image {
                        x: 50.0,
                        y: 632.0,
                        width: 150.0,
                        height: 60.0,
                        pixels,
                    },
                ],
            )
            .unwrap();
        let (doc, pages) = reopen(&codec.save(handle).unwrap());
        let ops = operations(&doc, pages[0]);

        let re = ops.iter().find(|op| op.operator == "re").unwrap();
        assert_eq!(floats(re), vec![20.0, 757.0, 15.0, 15.0]);
        let cm = ops.iter().find(|op| op.operator == "cm").unwrap();
        assert_eq!(floats(cm), vec![150.0, 0.0, 0.0, 60.0, 50.0, 632.0]);

        let page = page::page_dict(&doc, pages[0]).unwrap();
        let xobjects = page::resolve(&doc, page.get(b"Resources").unwrap())
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"XObject")
            .unwrap()
            .as_dict()
            .unwrap();
        let image_id = xobjects.get(b"SwImg0").unwrap().as_reference().unwrap();
        let image = doc.get_object(image_id).unwrap().as_stream().unwrap();
        assert_eq!(image.dict.get(b"Width").unwrap().as_i64().unwrap(), 3);
        assert!(image.dict.has(b"SMask"));
    }

    #[test]
    fn second_bake_picks_fresh_image_names() {
        let codec = LopdfCodec::new();
        let pixels = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let image = DrawOp::Image {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            pixels,
        };

        let mut handle = codec.open(&sample_pdf(&[(100, 100)])).unwrap();
        codec.draw_page(&mut handle, 0, &[image.clone(), image.clone()]).unwrap();
        let once = codec.save(handle).unwrap();

        let mut handle = codec.open(&once).unwrap();
        codec.draw_page(&mut handle, 0, &[image]).unwrap();
        let (doc, pages) = reopen(&codec.save(handle).unwrap());

        let page = page::page_dict(&doc, pages[0]).unwrap();
        let resources = page::resolve(&doc, page.get(b"Resources").unwrap()).unwrap();
        let xobjects = resources.as_dict().unwrap().get(b"XObject").unwrap().as_dict().unwrap();
        assert_eq!(xobjects.len(), 3);
        let done: Vec<_> = operations(&doc, pages[0])
            .into_iter()
            .filter(|op| op.operator == "Do")
            .collect();
        assert_eq!(done.len(), 3);
    }

    #[test]
    fn media_box_offset_is_applied() {
        let mut doc = Document::load_mem(&sample_pdf(&[(200, 200)])).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        doc.get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .unwrap()
            .set(
                "MediaBox",
                vec![
                    Object::Integer(50),
                    Object::Integer(100),
                    Object::Integer(250),
                    Object::Integer(300),
                ],
            );
        let bytes = page::save_to_vec(&mut doc, "offset").unwrap();

        let codec = LopdfCodec::new();
        let mut handle = codec.open(&bytes).unwrap();
        assert_eq!(codec.page_size(&handle, 0).unwrap().height, 200.0);
        codec
            .draw_page(
                &mut handle,
                0,
                &[DrawOp::Rect {
                    x: 0.0,
                    y: 0.0,
                    width: 5.0,
                    height: 5.0,
                    stroke: Rgb::BLACK,
                    line_width: 1.0,
                }],
            )
            .unwrap();
        let (doc, pages) = reopen(&codec.save(handle).unwrap());
        let re = operations(&doc, pages[0])
            .into_iter()
            .find(|op| op.operator == "re")
            .unwrap();
        assert_eq!(floats(&re)[..2], [50.0, 100.0]);
    }

    #[test]
    fn text_outside_latin1_is_replaced() {
        assert_eq!(encode_text("Grüße €", StandardFont::Helvetica), b"Gr\xfc\xdfe ?");
        assert_eq!(encode_text("4", StandardFont::ZapfDingbats), b"4");
    }
}
