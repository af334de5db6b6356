// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Editor — the surface exposed to the surrounding application.
//
// Binds one document codec and one page rasteriser to an interaction
// controller. Loading renders every page up front, one at a time, and only
// replaces the current session once all pages rendered.

use signwerk_core::error::{Result, SignwerkError};
use signwerk_core::{
    AnnotationId, DocumentCodec, EditorConfig, PageRasterProvider, Point, RenderedPage, Rgb,
    ToolMode,
};
use tracing::{debug, info, instrument};

use crate::bake::BakeExporter;
use crate::controller::{Effect, InputEvent, InteractionController};
use crate::mapper::OverlayScale;

/// Result of a load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { page_count: usize },
    /// The user declined to discard existing annotations; nothing changed.
    Declined,
}

struct LoadedDocument {
    bytes: Vec<u8>,
    pages: Vec<RenderedPage>,
}

/// An annotation editing session over one document at a time.
pub struct Editor<C, R> {
    codec: C,
    rasterizer: R,
    config: EditorConfig,
    controller: InteractionController,
    document: Option<LoadedDocument>,
}

impl<C: DocumentCodec, R: PageRasterProvider> Editor<C, R> {
    pub fn new(codec: C, rasterizer: R, config: EditorConfig) -> Self {
        let controller = InteractionController::new(0, &config);
        Self {
            codec,
            rasterizer,
            config,
            controller,
            document: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    /// Rendered pages of the loaded document, in order.
    pub fn pages(&self) -> &[RenderedPage] {
        self.document
            .as_ref()
            .map(|doc| doc.pages.as_slice())
            .unwrap_or_default()
    }

    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    /// Load a document for editing.
    ///
    /// If annotations exist, `confirm` is called with their count and must
    /// return `true` before they are discarded. On any failure the previous
    /// session is left exactly as it was.
    #[instrument(skip_all, fields(bytes_len = bytes.len()))]
    pub fn load_for_editing(
        &mut self,
        bytes: Vec<u8>,
        confirm: impl FnOnce(usize) -> bool,
    ) -> Result<LoadOutcome> {
        let existing = self.controller.store().len();
        if existing > 0 && !confirm(existing) {
            debug!(existing, "Load declined, keeping annotations");
            return Ok(LoadOutcome::Declined);
        }

        let page_count = {
            let handle = self.codec.open(&bytes)?;
            self.codec.page_count(&handle)
        };
        if page_count == 0 {
            return Err(SignwerkError::PdfError("document has no pages".into()));
        }

        let pages = self
            .rasterizer
            .render_pages(&bytes, page_count, self.config.render_scale)?;
        for page in &pages {
            debug!(page = page.number, width = page.width_px, height = page.height_px, "Page rendered");
        }

        self.controller = InteractionController::new(page_count, &self.config);
        self.document = Some(LoadedDocument { bytes, pages });
        info!(page_count, "Document loaded for editing");
        Ok(LoadOutcome::Loaded { page_count })
    }

    fn require_document(&self) -> Result<()> {
        if self.document.is_none() {
            return Err(SignwerkError::NoDocumentLoaded);
        }
        Ok(())
    }

    // -- Placement ------------------------------------------------------------

    /// Place text on the current page. Blank text places nothing.
    pub fn add_text(&mut self, at: Point, text: &str) -> Result<Option<AnnotationId>> {
        self.require_document()?;
        Ok(self.controller.place_text(at, text))
    }

    /// Place a checkbox on the current page with the configured initial state.
    pub fn add_checkbox(&mut self, at: Point) -> Result<AnnotationId> {
        self.require_document()?;
        let checked = self.controller.session().checkbox_checked();
        self.controller
            .place_checkbox(at, checked)
            .ok_or(SignwerkError::NoDocumentLoaded)
    }

    /// Place a signature image on the current page at the configured default
    /// position and size.
    pub fn add_signature(&mut self, image: Vec<u8>) -> Result<AnnotationId> {
        self.require_document()?;
        self.controller
            .place_signature(image, self.config.signature_size, self.config.signature_position)
            .ok_or(SignwerkError::NoDocumentLoaded)
    }

    // -- Commands -------------------------------------------------------------

    pub fn select_annotation(&mut self, id: Option<AnnotationId>) -> Vec<Effect> {
        self.controller.select(id)
    }

    pub fn undo_last(&mut self) -> Vec<Effect> {
        self.controller.undo_last()
    }

    pub fn delete_selected(&mut self) -> Vec<Effect> {
        self.controller.delete_selected()
    }

    pub fn clear_all(&mut self) -> Vec<Effect> {
        self.controller.clear_all()
    }

    pub fn handle_event(&mut self, event: InputEvent) -> Vec<Effect> {
        self.controller.handle(event)
    }

    pub fn set_tool_mode(&mut self, mode: ToolMode) -> Vec<Effect> {
        self.controller.set_tool_mode(mode)
    }

    pub fn set_current_page(&mut self, page: usize) -> Result<Vec<Effect>> {
        self.controller.set_current_page(page)
    }

    pub fn set_text_defaults(&mut self, font_size: u32, color: Rgb) {
        self.controller.set_text_defaults(font_size, color);
    }

    // -- Export ---------------------------------------------------------------

    /// Bake every annotation into a copy of the loaded document.
    ///
    /// The loaded bytes and the annotation set are left unchanged, so saving
    /// twice yields two independent exports.
    #[instrument(skip_all)]
    pub fn save_edited(&mut self) -> Result<Vec<u8>> {
        let document = self
            .document
            .as_ref()
            .ok_or(SignwerkError::NoDocumentLoaded)?;
        BakeExporter::new(&self.codec)
            .with_scale(OverlayScale::new(self.config.render_scale))
            .export(
                &document.bytes,
                document.pages.len(),
                self.controller.store().as_slice(),
            )
    }
}
