// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// signwerk-document — Document processing for Signwerk.
//
// Provides the lopdf-backed codec the overlay bakes through, a headless page
// rasteriser, and the PDF toolbox (merge, split, rotate, compress, inspect,
// images to PDF).

pub mod pdf;
pub mod raster;

// Re-export the primary structs so callers can use `signwerk_document::PdfReader` etc.
pub use pdf::codec::{LopdfCodec, LopdfHandle};
pub use pdf::reader::{CompressReport, DocumentInfo, PdfReader};
pub use pdf::writer::PdfWriter;
pub use raster::BlankRasterizer;
