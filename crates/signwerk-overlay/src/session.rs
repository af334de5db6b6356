// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Session state — the per-document editing settings owned by the controller.

use signwerk_core::{EditorConfig, Rgb, ToolMode};

use crate::annotation::clamp_font_size;

/// Editing settings for the loaded document.
///
/// Owned by `InteractionController`; hosts read it but change it only through
/// the controller so the page index always stays within the loaded page set.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    current_page: usize,
    page_count: usize,
    mode: ToolMode,
    font_size: u32,
    text_color: Rgb,
    checkbox_checked: bool,
}

impl SessionState {
    pub fn new(page_count: usize, config: &EditorConfig) -> Self {
        Self {
            current_page: 0,
            page_count,
            mode: ToolMode::Select,
            font_size: clamp_font_size(config.default_font_size),
            text_color: config.text_color(),
            checkbox_checked: config.checkbox_checked,
        }
    }

    /// 0-based index of the page being edited.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn has_pages(&self) -> bool {
        self.page_count > 0
    }

    pub fn contains_page(&self, page: usize) -> bool {
        page < self.page_count
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    /// Font size for the next text annotation.
    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    /// Colour for the next text annotation.
    pub fn text_color(&self) -> Rgb {
        self.text_color
    }

    pub fn checkbox_checked(&self) -> bool {
        self.checkbox_checked
    }

    pub(crate) fn set_current_page(&mut self, page: usize) {
        self.current_page = page;
    }

    pub(crate) fn set_mode(&mut self, mode: ToolMode) {
        self.mode = mode;
    }

    pub(crate) fn set_text_defaults(&mut self, font_size: u32, color: Rgb) {
        self.font_size = clamp_font_size(font_size);
        self.text_color = color;
    }
}
