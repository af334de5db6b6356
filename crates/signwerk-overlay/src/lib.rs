// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// signwerk-overlay — The interactive annotation overlay engine.
//
// Holds the annotation model and store, the pointer/keyboard interaction state
// machine, the overlay-to-document coordinate mapper, and the bake exporter
// that draws annotations into the structured document on save. `Editor` ties
// them together with the document codec and page rasteriser.

pub mod annotation;
pub mod bake;
pub mod controller;
pub mod editor;
pub mod geometry;
pub mod mapper;
pub mod session;
pub mod store;

// Re-export the primary types so callers can use `signwerk_overlay::Editor` etc.
pub use annotation::{Annotation, AnnotationKind, CheckboxAnnotation, SignatureAnnotation, TextAnnotation};
pub use bake::BakeExporter;
pub use controller::{Effect, InputEvent, InteractionController, InteractionState, Key};
pub use editor::{Editor, LoadOutcome};
pub use mapper::{DocumentPoint, OverlayScale};
pub use session::SessionState;
pub use store::AnnotationStore;
