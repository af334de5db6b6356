// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Annotation model — text, checkbox, and signature overlay objects.
//
// Every annotation carries an id, its owning page and an overlay-space origin
// (top-left). The per-type payload lives in `AnnotationKind`; the clamps on
// font size and signature dimensions are enforced by the payload constructors
// and setters so no caller can store an out-of-range value.

use signwerk_core::config::{MAX_FONT_SIZE, MIN_FONT_SIZE};
use signwerk_core::{AnnotationId, Point, Rgb, Size};

use crate::geometry::Rect;

/// Minimum signature width in overlay pixels.
pub const MIN_SIGNATURE_WIDTH: f32 = 50.0;
/// Minimum signature height in overlay pixels.
pub const MIN_SIGNATURE_HEIGHT: f32 = 20.0;
/// Checkboxes are a fixed square of this side, in overlay pixels and in
/// document units alike.
pub const CHECKBOX_SIZE: f32 = 15.0;
/// Side of the square resize handle drawn on the bottom-right corner.
pub const RESIZE_HANDLE_SIZE: f32 = 10.0;
/// Estimated Helvetica glyph advance as a fraction of the font size.
pub const TEXT_ADVANCE_FACTOR: f32 = 0.5;

/// Clamp an integer font size into `[MIN_FONT_SIZE, MAX_FONT_SIZE]`.
pub fn clamp_font_size(size: u32) -> u32 {
    size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

/// Round a scaled font size and clamp it into range.
pub fn clamp_scaled_font_size(size: f32) -> u32 {
    size.round()
        .clamp(MIN_FONT_SIZE as f32, MAX_FONT_SIZE as f32) as u32
}

/// Apply the signature size floors.
pub fn clamp_signature_size(width: f32, height: f32) -> Size {
    Size::new(
        width.max(MIN_SIGNATURE_WIDTH),
        height.max(MIN_SIGNATURE_HEIGHT),
    )
}

/// A free text label.
#[derive(Debug, Clone, PartialEq)]
pub struct TextAnnotation {
    text: String,
    font_size: u32,
    color: Rgb,
}

impl TextAnnotation {
    /// Build a text payload. Returns `None` when the text is blank; the stored
    /// text is trimmed and the font size clamped.
    pub fn new(text: &str, font_size: u32, color: Rgb) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            text: trimmed.to_string(),
            font_size: clamp_font_size(font_size),
            color,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    pub fn set_font_size(&mut self, size: u32) {
        self.font_size = clamp_font_size(size);
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Estimated overlay extent of the rendered text.
    pub fn estimated_size(&self) -> Size {
        let size = self.font_size as f32;
        Size::new(
            self.text.chars().count() as f32 * TEXT_ADVANCE_FACTOR * size,
            size,
        )
    }
}

/// A fixed-size tick box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckboxAnnotation {
    pub checked: bool,
}

/// A placed signature image.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureAnnotation {
    /// Encoded image bytes (PNG, JPEG, ...). Decoded only when baking.
    image: Vec<u8>,
    size: Size,
}

impl SignatureAnnotation {
    pub fn new(image: Vec<u8>, size: Size) -> Self {
        Self {
            image,
            size: clamp_signature_size(size.width, size.height),
        }
    }

    pub fn image(&self) -> &[u8] {
        &self.image
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.size = clamp_signature_size(width, height);
    }
}

/// The per-type payload of an annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationKind {
    Text(TextAnnotation),
    Checkbox(CheckboxAnnotation),
    Signature(SignatureAnnotation),
}

/// A positioned overlay object on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    /// 0-based index of the owning page.
    pub page: usize,
    /// Top-left origin in overlay space.
    pub position: Point,
    pub kind: AnnotationKind,
}

impl Annotation {
    pub fn new(page: usize, position: Point, kind: AnnotationKind) -> Self {
        Self {
            id: AnnotationId::new(),
            page,
            position,
            kind,
        }
    }

    /// Short lowercase name of the variant, for logs.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            AnnotationKind::Text(_) => "text",
            AnnotationKind::Checkbox(_) => "checkbox",
            AnnotationKind::Signature(_) => "signature",
        }
    }

    /// Overlay-space bounds used for hit testing.
    pub fn bounds(&self) -> Rect {
        let size = match &self.kind {
            AnnotationKind::Text(text) => text.estimated_size(),
            AnnotationKind::Checkbox(_) => Size::new(CHECKBOX_SIZE, CHECKBOX_SIZE),
            AnnotationKind::Signature(signature) => signature.size(),
        };
        Rect::new(self.position.x, self.position.y, size.width, size.height)
    }

    /// The resize handle, for the variants that can be resized.
    pub fn resize_handle(&self) -> Option<Rect> {
        match self.kind {
            AnnotationKind::Checkbox(_) => None,
            AnnotationKind::Text(_) | AnnotationKind::Signature(_) => Some(Rect::centered_square(
                self.bounds().bottom_right(),
                RESIZE_HANDLE_SIZE,
            )),
        }
    }
}
