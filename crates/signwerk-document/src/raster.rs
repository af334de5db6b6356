// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Headless page rasteriser.
//
// Produces a blank white canvas with each page's MediaBox proportions. It
// gives the overlay correct page geometry for placement and hit testing
// without a PDF rendering engine; hosts that show page content plug in their
// own `PageRasterProvider`.

use image::{Rgba, RgbaImage};
use signwerk_core::error::{Result, SignwerkError};
use signwerk_core::{DocumentCodec, PageRasterProvider, PageSize, RenderedPage};
use tracing::instrument;

use crate::pdf::LopdfCodec;

const PAPER_WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Renders every page as a blank canvas of `MediaBox × scale` pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlankRasterizer {
    codec: LopdfCodec,
}

impl BlankRasterizer {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_scale(scale: f32) -> Result<()> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(SignwerkError::Render(format!("invalid render scale {}", scale)))
    }
}

fn blank_page(page_index: usize, size: PageSize, scale: f32) -> RenderedPage {
    let width_px = ((size.width * scale).round() as u32).max(1);
    let height_px = ((size.height * scale).round() as u32).max(1);
    RenderedPage {
        number: page_index + 1,
        width_px,
        height_px,
        raster: RgbaImage::from_pixel(width_px, height_px, PAPER_WHITE),
    }
}

impl PageRasterProvider for BlankRasterizer {
    #[instrument(skip(self, document), fields(bytes_len = document.len()))]
    fn render_page(&self, document: &[u8], page_index: usize, scale: f32) -> Result<RenderedPage> {
        check_scale(scale)?;
        let handle = self.codec.open(document)?;
        let size = self.codec.page_size(&handle, page_index)?;
        Ok(blank_page(page_index, size, scale))
    }

    /// Parses the document once for all pages.
    #[instrument(skip(self, document), fields(bytes_len = document.len()))]
    fn render_pages(
        &self,
        document: &[u8],
        page_count: usize,
        scale: f32,
    ) -> Result<Vec<RenderedPage>> {
        check_scale(scale)?;
        let handle = self.codec.open(document)?;
        (0..page_count)
            .map(|page_index| {
                let size = self.codec.page_size(&handle, page_index)?;
                Ok(blank_page(page_index, size, scale))
            })
            .collect()
    }
}
