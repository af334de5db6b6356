// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — the lopdf codec used for baking, the toolbox operations
// (merge, split, rotate, compress, inspect), and image-to-PDF creation.

pub mod codec;
pub mod page;
pub mod reader;
pub mod writer;

pub use codec::{LopdfCodec, LopdfHandle};
pub use reader::{CompressReport, DocumentInfo, PdfReader};
pub use writer::PdfWriter;
