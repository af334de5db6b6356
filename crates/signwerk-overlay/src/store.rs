// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Annotation store — the ordered source of truth for the overlay.
//
// Vector order is z-order (later entries draw on top) and undo order. Undo is
// a pop from the tail, so only creation is undoable: moves and resizes edit an
// entry in place and leave no history.

use signwerk_core::{AnnotationId, Point};
use tracing::debug;

use crate::annotation::{Annotation, AnnotationKind};

/// Ordered annotation collection plus the current selection.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    selected: Option<AnnotationId>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Mutation -------------------------------------------------------------

    /// Append an annotation on top of the others and return its id.
    pub fn add(&mut self, annotation: Annotation) -> AnnotationId {
        let id = annotation.id;
        debug!(%id, kind = annotation.kind_name(), page = annotation.page, "annotation added");
        self.annotations.push(annotation);
        id
    }

    /// Remove the most recently added annotation, if any.
    pub fn undo_last(&mut self) -> Option<Annotation> {
        let removed = self.annotations.pop()?;
        if self.selected == Some(removed.id) {
            self.selected = None;
        }
        debug!(id = %removed.id, "annotation undone");
        Some(removed)
    }

    /// Remove a specific annotation. Unknown ids are ignored.
    pub fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        let index = self.annotations.iter().position(|a| a.id == id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(self.annotations.remove(index))
    }

    /// Remove every annotation and clear the selection.
    pub fn clear(&mut self) {
        self.annotations.clear();
        self.selected = None;
    }

    /// Translate an annotation by `(dx, dy)`. Positions are not clamped to the
    /// page, so annotations may be dragged outside the visible raster.
    pub fn update_position(&mut self, id: AnnotationId, dx: f32, dy: f32) -> bool {
        match self.get_mut(id) {
            Some(annotation) => {
                annotation.position.x += dx;
                annotation.position.y += dy;
                true
            }
            None => false,
        }
    }

    /// Resize a signature, applying the size floors. Other variants are left
    /// untouched.
    pub fn update_size(&mut self, id: AnnotationId, width: f32, height: f32) -> bool {
        match self.get_mut(id).map(|a| &mut a.kind) {
            Some(AnnotationKind::Signature(signature)) => {
                signature.set_size(width, height);
                true
            }
            _ => false,
        }
    }

    /// Change a text annotation's font size, clamped into range.
    pub fn update_font_size(&mut self, id: AnnotationId, size: u32) -> bool {
        match self.get_mut(id).map(|a| &mut a.kind) {
            Some(AnnotationKind::Text(text)) => {
                text.set_font_size(size);
                true
            }
            _ => false,
        }
    }

    /// Select an annotation or clear the selection. Selecting an id that is
    /// not in the store clears the selection.
    pub fn select(&mut self, id: Option<AnnotationId>) {
        self.selected = id.filter(|id| self.get(*id).is_some());
    }

    // -- Queries --------------------------------------------------------------

    pub fn selected(&self) -> Option<AnnotationId> {
        self.selected
    }

    pub fn selected_annotation(&self) -> Option<&Annotation> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    fn get_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| a.id == id)
    }

    /// All annotations in store (creation) order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    pub fn as_slice(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Annotations on one page, in store order.
    pub fn on_page(&self, page: usize) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(move |a| a.page == page)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// The topmost annotation on `page` whose bounds contain `point`.
    pub fn hit_test(&self, page: usize, point: Point) -> Option<AnnotationId> {
        self.annotations
            .iter()
            .rev()
            .find(|a| a.page == page && a.bounds().contains(point))
            .map(|a| a.id)
    }
}
