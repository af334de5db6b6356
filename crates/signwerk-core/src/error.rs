// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Signwerk.

use thiserror::Error;

/// Top-level error type for all Signwerk operations.
#[derive(Debug, Error)]
pub enum SignwerkError {
    // -- Document errors --
    #[error("unsupported document type: {0}")]
    UnsupportedDocument(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Collaborator errors --
    #[error("page rendering failed: {0}")]
    Render(String),

    #[error("document codec failed: {0}")]
    Codec(String),

    // -- Editing session --
    #[error("no document loaded for editing")]
    NoDocumentLoaded,

    #[error("page {page} out of range (document has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },

    #[error("invalid colour: {0}")]
    InvalidColor(String),

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SignwerkError>;
