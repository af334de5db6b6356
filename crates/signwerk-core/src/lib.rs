// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Signwerk — Core types, error definitions, and collaborator traits shared
// across all crates.

pub mod codec;
pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;

pub use codec::{DocumentCodec, DrawOp, PageRasterProvider, RenderedPage, StandardFont};
pub use config::EditorConfig;
pub use error::SignwerkError;
pub use types::*;
