// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Collaborator traits for the document codec and the page rasteriser.
//
// The annotation engine never touches a document format directly. Rendering a
// page for display and drawing baked annotations into the structured document
// both go through these traits; `signwerk-document` provides the lopdf-backed
// implementations.

use image::RgbaImage;

use crate::error::Result;
use crate::types::{PageSize, Rgb};

/// A page rasterised for the overlay. Immutable once produced.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// 1-based page number.
    pub number: usize,
    /// Width of the raster in pixels.
    pub width_px: u32,
    /// Height of the raster in pixels.
    pub height_px: u32,
    /// The rendered pixels.
    pub raster: RgbaImage,
}

/// Produces display rasters for document pages.
pub trait PageRasterProvider {
    /// Render the 0-based `page_index` of `document` at `scale` pixels per
    /// document unit.
    fn render_page(&self, document: &[u8], page_index: usize, scale: f32)
    -> Result<RenderedPage>;

    /// Render the first `page_count` pages in order. Implementations that
    /// parse the document should override this to parse it once.
    fn render_pages(
        &self,
        document: &[u8],
        page_count: usize,
        scale: f32,
    ) -> Result<Vec<RenderedPage>> {
        (0..page_count)
            .map(|page_index| self.render_page(document, page_index, scale))
            .collect()
    }
}

/// Built-in fonts every PDF consumer is required to provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    /// Symbol font; the glyph for `'4'` is a heavy check mark.
    ZapfDingbats,
}

/// A single drawing instruction in document space (origin bottom-left).
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Draw `text` with its baseline starting at `(x, y)`.
    Text {
        x: f32,
        y: f32,
        text: String,
        font: StandardFont,
        size: f32,
        color: Rgb,
    },
    /// Stroke a rectangle outline whose lower-left corner is `(x, y)`.
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        stroke: Rgb,
        line_width: f32,
    },
    /// Draw a decoded image with its lower-left corner at `(x, y)`.
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        pixels: RgbaImage,
    },
}

/// Opens, draws into, and serialises structured documents.
pub trait DocumentCodec {
    /// An opened, mutable document.
    type Handle;

    /// Parse document bytes.
    fn open(&self, bytes: &[u8]) -> Result<Self::Handle>;

    /// Number of pages in the document.
    fn page_count(&self, handle: &Self::Handle) -> usize;

    /// Size of the 0-based page in document units.
    fn page_size(&self, handle: &Self::Handle, page_index: usize) -> Result<PageSize>;

    /// Apply a batch of draw instructions to one page. Implementations must
    /// either apply the whole batch or leave the page unchanged.
    fn draw_page(&self, handle: &mut Self::Handle, page_index: usize, ops: &[DrawOp])
    -> Result<()>;

    /// Serialise the document.
    fn save(&self, handle: Self::Handle) -> Result<Vec<u8>>;
}
