// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Interaction controller — the pointer/keyboard state machine.
//
// A single `InteractionState` value describes what the user is doing, so a
// drag and a resize can never be active at the same time and both always
// name the annotation they act on. Every event returns a list of `Effect`s
// telling the host what to show: the text input surface, pointer capture for
// the duration of a drag or resize, and when to redraw.

use signwerk_core::error::{Result, SignwerkError};
use signwerk_core::{AnnotationId, EditorConfig, Point, Rgb, Size, ToolMode};
use tracing::{debug, trace};

use crate::annotation::{
    Annotation, AnnotationKind, CheckboxAnnotation, SignatureAnnotation, TextAnnotation,
    clamp_scaled_font_size,
};
use crate::session::SessionState;
use crate::store::AnnotationStore;

/// Horizontal pointer travel, in pixels, that doubles a text annotation's
/// font size.
pub const TEXT_RESIZE_PIXELS: f32 = 100.0;
/// Text scale factors at or below this are ignored.
pub const MIN_TEXT_SCALE: f32 = 0.3;
/// Text scale factors at or above this are ignored.
pub const MAX_TEXT_SCALE: f32 = 5.0;

/// Size of the annotation when a resize began.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeStart {
    Signature(Size),
    Text { font_size: u32 },
}

/// What the user is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    /// Waiting for input. Placement behaviour follows the tool mode.
    #[default]
    Idle,
    /// A text input surface is open at `at`; the next commit creates text.
    TextEntryPending { page: usize, at: Point },
    /// Moving the selected annotation. `grab_offset` is the pointer position
    /// relative to the annotation origin at the moment of the grab.
    Dragging {
        id: AnnotationId,
        grab_offset: Point,
    },
    /// Resizing the selected annotation from its handle.
    Resizing {
        id: AnnotationId,
        start_pointer: Point,
        start: ResizeStart,
    },
}

impl InteractionState {
    /// The annotation a drag or resize is acting on.
    pub fn target(&self) -> Option<AnnotationId> {
        match self {
            Self::Dragging { id, .. } | Self::Resizing { id, .. } => Some(*id),
            Self::Idle | Self::TextEntryPending { .. } => None,
        }
    }

    /// Whether pointer motion and release must be delivered.
    pub fn captures_pointer(&self) -> bool {
        self.target().is_some()
    }
}

/// Keys the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Delete,
}

/// Input delivered by the host, in overlay coordinates of the current page.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    /// The text input surface's contents changed.
    TextChanged(String),
    /// The text input surface was confirmed (Enter) or lost focus.
    CommitText(String),
    Key(Key),
}

/// Instructions for the host after an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Open a text input surface at `at` on `page`.
    ShowTextInput { page: usize, at: Point },
    /// Close the text input surface.
    HideTextInput,
    /// Start delivering pointer move/up events (register listeners).
    CapturePointer,
    /// Stop delivering pointer move/up events (deregister listeners).
    ReleasePointer,
    /// The annotation set or selection changed.
    Redraw,
}

/// Owns the annotation store and session state and routes every mutation.
#[derive(Debug, Clone)]
pub struct InteractionController {
    store: AnnotationStore,
    session: SessionState,
    state: InteractionState,
    /// Text typed into the open input surface so far.
    draft: String,
}

impl InteractionController {
    pub fn new(page_count: usize, config: &EditorConfig) -> Self {
        Self {
            store: AnnotationStore::new(),
            session: SessionState::new(page_count, config),
            state: InteractionState::Idle,
            draft: String::new(),
        }
    }

    // -- Read access ----------------------------------------------------------

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Whether the host should currently be listening for pointer motion.
    pub fn wants_pointer_motion(&self) -> bool {
        self.state.captures_pointer()
    }

    // -- Events ---------------------------------------------------------------

    /// Feed one input event through the state machine.
    pub fn handle(&mut self, event: InputEvent) -> Vec<Effect> {
        trace!(?event, state = ?self.state, "input event");
        match event {
            InputEvent::PointerDown(point) => self.pointer_down(point),
            InputEvent::PointerMove(point) => self.pointer_move(point),
            InputEvent::PointerUp => self.pointer_up(),
            InputEvent::TextChanged(text) => self.text_changed(text),
            InputEvent::CommitText(text) => self.commit_text(&text),
            InputEvent::Key(Key::Escape) => self.escape(),
            InputEvent::Key(Key::Delete) => self.delete_selected(),
        }
    }

    fn pointer_down(&mut self, point: Point) -> Vec<Effect> {
        // Pressing elsewhere takes focus from an open text input. Whatever was
        // typed lands where the entry was opened, and the press does nothing
        // else, so a focus-loss commit that follows finds no open entry.
        if matches!(self.state, InteractionState::TextEntryPending { .. }) {
            let draft = std::mem::take(&mut self.draft);
            return self.commit_text(&draft);
        }

        let mut effects = Vec::new();
        self.end_interaction(&mut effects);

        if !self.session.has_pages() {
            return effects;
        }

        let page = self.session.current_page();
        match self.session.mode() {
            ToolMode::Select => self.select_press(page, point, &mut effects),
            ToolMode::Text => {
                if self.store.hit_test(page, point).is_none() {
                    self.state = InteractionState::TextEntryPending { page, at: point };
                    effects.push(Effect::ShowTextInput { page, at: point });
                }
            }
            ToolMode::Checkbox => {
                if self.store.hit_test(page, point).is_none() {
                    let checked = self.session.checkbox_checked();
                    self.store.add(Annotation::new(
                        page,
                        point,
                        AnnotationKind::Checkbox(CheckboxAnnotation { checked }),
                    ));
                    effects.push(Effect::Redraw);
                }
            }
        }
        effects
    }

    fn select_press(&mut self, page: usize, point: Point, effects: &mut Vec<Effect>) {
        let on_handle = self
            .store
            .selected_annotation()
            .filter(|a| a.page == page)
            .and_then(|a| {
                if !a.resize_handle()?.contains(point) {
                    return None;
                }
                let start = match &a.kind {
                    AnnotationKind::Signature(signature) => {
                        ResizeStart::Signature(signature.size())
                    }
                    AnnotationKind::Text(text) => ResizeStart::Text {
                        font_size: text.font_size(),
                    },
                    AnnotationKind::Checkbox(_) => return None,
                };
                Some((a.id, start))
            });
        if let Some((id, start)) = on_handle {
            debug!(%id, "resize started");
            self.state = InteractionState::Resizing {
                id,
                start_pointer: point,
                start,
            };
            effects.push(Effect::CapturePointer);
            return;
        }

        match self.store.hit_test(page, point) {
            Some(id) if self.store.selected() == Some(id) => {
                if let Some(annotation) = self.store.get(id) {
                    let (dx, dy) = point.delta_from(annotation.position);
                    debug!(%id, "drag started");
                    self.state = InteractionState::Dragging {
                        id,
                        grab_offset: Point::new(dx, dy),
                    };
                    effects.push(Effect::CapturePointer);
                }
            }
            Some(id) => {
                self.store.select(Some(id));
                effects.push(Effect::Redraw);
            }
            None => {
                if self.store.selected().is_some() {
                    self.store.select(None);
                    effects.push(Effect::Redraw);
                }
            }
        }
    }

    fn pointer_move(&mut self, point: Point) -> Vec<Effect> {
        match self.state {
            InteractionState::Dragging { id, grab_offset } => {
                let Some(annotation) = self.store.get(id) else {
                    return Vec::new();
                };
                // Delta since the previous move: the new origin is where the
                // grab offset puts it, minus where the origin is now.
                let target = Point::new(point.x - grab_offset.x, point.y - grab_offset.y);
                let (dx, dy) = target.delta_from(annotation.position);
                if dx == 0.0 && dy == 0.0 {
                    return Vec::new();
                }
                self.store.update_position(id, dx, dy);
                vec![Effect::Redraw]
            }
            InteractionState::Resizing {
                id,
                start_pointer,
                start,
            } => {
                let (dx, dy) = point.delta_from(start_pointer);
                let changed = match start {
                    ResizeStart::Signature(size) => {
                        self.store
                            .update_size(id, size.width + dx, size.height + dy)
                    }
                    ResizeStart::Text { font_size } => {
                        let scale = 1.0 + dx / TEXT_RESIZE_PIXELS;
                        if scale <= MIN_TEXT_SCALE || scale >= MAX_TEXT_SCALE {
                            false
                        } else {
                            let size = clamp_scaled_font_size(font_size as f32 * scale);
                            self.store.update_font_size(id, size)
                        }
                    }
                };
                if changed {
                    vec![Effect::Redraw]
                } else {
                    Vec::new()
                }
            }
            InteractionState::Idle | InteractionState::TextEntryPending { .. } => Vec::new(),
        }
    }

    fn pointer_up(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.state.captures_pointer() {
            self.end_interaction(&mut effects);
        }
        effects
    }

    fn text_changed(&mut self, text: String) -> Vec<Effect> {
        if matches!(self.state, InteractionState::TextEntryPending { .. }) {
            self.draft = text;
        }
        Vec::new()
    }

    fn commit_text(&mut self, text: &str) -> Vec<Effect> {
        let InteractionState::TextEntryPending { page, at } = self.state else {
            return Vec::new();
        };
        self.state = InteractionState::Idle;
        self.draft.clear();
        let mut effects = vec![Effect::HideTextInput];
        if let Some(payload) =
            TextAnnotation::new(text, self.session.font_size(), self.session.text_color())
        {
            self.store
                .add(Annotation::new(page, at, AnnotationKind::Text(payload)));
            effects.push(Effect::Redraw);
        }
        effects
    }

    fn escape(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if matches!(self.state, InteractionState::TextEntryPending { .. }) {
            self.end_interaction(&mut effects);
        }
        effects
    }

    /// Return to `Idle`, telling the host to undo whatever the current state
    /// set up.
    fn end_interaction(&mut self, effects: &mut Vec<Effect>) {
        match std::mem::take(&mut self.state) {
            InteractionState::Idle => {}
            InteractionState::TextEntryPending { .. } => {
                self.draft.clear();
                effects.push(Effect::HideTextInput)
            }
            InteractionState::Dragging { .. } | InteractionState::Resizing { .. } => {
                effects.push(Effect::ReleasePointer)
            }
        }
    }

    // -- Commands -------------------------------------------------------------

    /// Switch tool mode. Always clears the selection and cancels whatever
    /// interaction is in progress.
    pub fn set_tool_mode(&mut self, mode: ToolMode) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.end_interaction(&mut effects);
        self.store.select(None);
        self.session.set_mode(mode);
        effects.push(Effect::Redraw);
        effects
    }

    /// Switch the page being edited.
    pub fn set_current_page(&mut self, page: usize) -> Result<Vec<Effect>> {
        if !self.session.contains_page(page) {
            return Err(SignwerkError::PageOutOfRange {
                page,
                page_count: self.session.page_count(),
            });
        }
        let mut effects = Vec::new();
        self.end_interaction(&mut effects);
        self.store.select(None);
        self.session.set_current_page(page);
        effects.push(Effect::Redraw);
        Ok(effects)
    }

    /// Defaults applied to text annotations created from now on.
    pub fn set_text_defaults(&mut self, font_size: u32, color: Rgb) {
        self.session.set_text_defaults(font_size, color);
    }

    /// Create a text annotation on the current page. Blank text is ignored.
    pub fn place_text(&mut self, at: Point, text: &str) -> Option<AnnotationId> {
        if !self.session.has_pages() {
            return None;
        }
        let payload =
            TextAnnotation::new(text, self.session.font_size(), self.session.text_color())?;
        Some(self.store.add(Annotation::new(
            self.session.current_page(),
            at,
            AnnotationKind::Text(payload),
        )))
    }

    /// Create a checkbox on the current page.
    pub fn place_checkbox(&mut self, at: Point, checked: bool) -> Option<AnnotationId> {
        if !self.session.has_pages() {
            return None;
        }
        Some(self.store.add(Annotation::new(
            self.session.current_page(),
            at,
            AnnotationKind::Checkbox(CheckboxAnnotation { checked }),
        )))
    }

    /// Create a signature on the current page.
    pub fn place_signature(&mut self, image: Vec<u8>, size: Size, at: Point) -> Option<AnnotationId> {
        if !self.session.has_pages() {
            return None;
        }
        Some(self.store.add(Annotation::new(
            self.session.current_page(),
            at,
            AnnotationKind::Signature(SignatureAnnotation::new(image, size)),
        )))
    }

    /// Select an annotation (or nothing). A drag or resize in progress is
    /// cancelled, since it would no longer act on the selection.
    pub fn select(&mut self, id: Option<AnnotationId>) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.state.captures_pointer() {
            self.end_interaction(&mut effects);
        }
        self.store.select(id);
        effects.push(Effect::Redraw);
        effects
    }

    /// Remove the selected annotation, if any, and return to `Idle`.
    pub fn delete_selected(&mut self) -> Vec<Effect> {
        let Some(id) = self.store.selected() else {
            return Vec::new();
        };
        let mut effects = Vec::new();
        self.end_interaction(&mut effects);
        self.store.remove(id);
        debug!(%id, "selected annotation deleted");
        effects.push(Effect::Redraw);
        effects
    }

    /// Remove the most recently created annotation.
    pub fn undo_last(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        let target = self.state.target();
        if let Some(removed) = self.store.undo_last() {
            if target == Some(removed.id) {
                self.end_interaction(&mut effects);
            }
            effects.push(Effect::Redraw);
        }
        effects
    }

    /// Remove every annotation.
    pub fn clear_all(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.state.captures_pointer() {
            self.end_interaction(&mut effects);
        }
        self.store.clear();
        effects.push(Effect::Redraw);
        effects
    }
}
