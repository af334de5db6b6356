// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open, inspect, merge, split, rotate, and compress existing PDF
// documents using the `lopdf` crate.

use std::path::Path;

use lopdf::{Document, Object, ObjectId};
use serde::Serialize;
use signwerk_core::PageSize;
use signwerk_core::error::{Result, SignwerkError};
use tracing::{debug, info, instrument};

use super::page::{self, PageCloner};

/// Sizes before and after a compression pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompressReport {
    pub original_bytes: usize,
    pub compressed_bytes: usize,
}

impl CompressReport {
    /// Size reduction as a percentage of the original. Negative when the
    /// output grew.
    pub fn reduction_percent(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        (1.0 - self.compressed_bytes as f64 / self.original_bytes as f64) * 100.0
    }
}

/// Page count and per-page sizes of a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentInfo {
    pub page_count: usize,
    pub pages: Vec<PageSize>,
    pub file_bytes: usize,
}

/// Reads and manipulates existing PDF files.
///
/// Wraps `lopdf::Document` and provides the toolbox operations: merging
/// several files, splitting into single pages, rotating every page, and
/// re-saving in compressed form.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
    /// Size of the bytes the document was parsed from.
    source_len: usize,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let data = std::fs::read(path_ref)?;
        Self::from_bytes(&data).map_err(|err| match err {
            SignwerkError::PdfError(msg) => {
                SignwerkError::PdfError(format!("failed to open {}: {}", path_ref.display(), msg))
            }
            other => other,
        })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = page::load_pdf(data, "PDF")?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self {
            document,
            source_len: data.len(),
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Size of each page, in page order.
    pub fn page_sizes(&self) -> Result<Vec<PageSize>> {
        self.page_ids()
            .into_iter()
            .map(|page_id| Ok(page::media_box(&self.document, page_id)?.size()))
            .collect()
    }

    /// Page count, page sizes, and source size.
    pub fn info(&self) -> Result<DocumentInfo> {
        let pages = self.page_sizes()?;
        Ok(DocumentInfo {
            page_count: pages.len(),
            pages,
            file_bytes: self.source_len,
        })
    }

    // -- Extraction -----------------------------------------------------------

    /// Extract a single page (1-indexed) into a new standalone PDF document.
    #[instrument(skip(self))]
    pub fn extract_page(&self, page_number: u32) -> Result<Vec<u8>> {
        let pages = self.document.get_pages();
        let page_id = *pages.get(&page_number).ok_or(SignwerkError::PageOutOfRange {
            page: page_number as usize,
            page_count: pages.len(),
        })?;

        let mut single = page::empty_document();
        PageCloner::new(&self.document).append_page(&mut single, page_id)?;
        let output = page::save_to_vec(&mut single, "extracted page")?;

        debug!(page_number, output_bytes = output.len(), "Page extracted");
        Ok(output)
    }

    /// Split the document into one single-page PDF per page, in page order.
    #[instrument(skip(self))]
    pub fn split_pages(&self) -> Result<Vec<Vec<u8>>> {
        let total = self.page_count() as u32;
        info!(total, "Splitting PDF into single pages");
        (1..=total).map(|page_number| self.extract_page(page_number)).collect()
    }

    /// Merge this document with one or more other PDF byte-slices, producing a
    /// combined PDF. Pages appear in the order: self, then each supplied
    /// document in order.
    #[instrument(skip_all, fields(additional_count = others.len()))]
    pub fn merge(&self, others: &[&[u8]]) -> Result<Vec<u8>> {
        info!(
            base_pages = self.page_count(),
            additional_documents = others.len(),
            "Merging PDFs"
        );

        let mut merged = self.document.clone();

        for (index, other_bytes) in others.iter().enumerate() {
            let other_doc = page::load_pdf(other_bytes, &format!("additional PDF #{}", index + 1))?;

            let mut cloner = PageCloner::new(&other_doc);
            for page_id in other_doc.get_pages().into_values() {
                cloner.append_page(&mut merged, page_id)?;
            }
        }

        let output = page::save_to_vec(&mut merged, "merged PDF")?;
        debug!(output_bytes = output.len(), "Merge complete");
        Ok(output)
    }

    /// Rotate every page by `degrees` (must be a multiple of 90), on top of
    /// whatever rotation each page already has.
    #[instrument(skip(self))]
    pub fn rotate_all(&self, degrees: i32) -> Result<Vec<u8>> {
        if degrees % 90 != 0 {
            return Err(SignwerkError::PdfError(format!(
                "rotation must be a multiple of 90, got {}",
                degrees
            )));
        }

        let mut doc = self.document.clone();
        for page_id in self.page_ids() {
            let existing_rotation = page::rotation(&doc, page_id);
            let new_rotation = (existing_rotation + i64::from(degrees)).rem_euclid(360);
            if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
                dict.set("Rotate", Object::Integer(new_rotation));
            }
            debug!(?page_id, existing_rotation, new_rotation, "Page rotated");
        }

        info!(degrees, pages = self.page_count(), "Rotated all pages");
        page::save_to_vec(&mut doc, "rotated PDF")
    }

    /// Re-save with unreferenced objects pruned and streams compressed.
    #[instrument(skip(self))]
    pub fn compress(&self) -> Result<(Vec<u8>, CompressReport)> {
        let mut doc = self.document.clone();
        let pruned = doc.prune_objects();
        doc.delete_zero_length_streams();
        doc.renumber_objects();
        doc.compress();

        let output = page::save_to_vec(&mut doc, "compressed PDF")?;
        let report = CompressReport {
            original_bytes: self.source_len,
            compressed_bytes: output.len(),
        };
        info!(
            pruned = pruned.len(),
            original_bytes = report.original_bytes,
            compressed_bytes = report.compressed_bytes,
            "Compression complete"
        );
        Ok((output, report))
    }

    // -- Helpers --------------------------------------------------------------

    fn page_ids(&self) -> Vec<ObjectId> {
        self.document.get_pages().into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::sample_pdf;

    #[test]
    fn page_sizes_follow_page_order() {
        let reader = PdfReader::from_bytes(&sample_pdf(&[(612, 792), (842, 595)])).unwrap();
        assert_eq!(reader.page_count(), 2);
        let sizes = reader.page_sizes().unwrap();
        assert_eq!(sizes[1], PageSize { width: 842.0, height: 595.0 });
    }

    #[test]
    fn info_summarises_the_document() {
        let source = sample_pdf(&[(612, 792)]);
        let info = PdfReader::from_bytes(&source).unwrap().info().unwrap();
        assert_eq!(info.page_count, 1);
        assert_eq!(info.file_bytes, source.len());
        assert_eq!(info.pages[0].width, 612.0);
    }

    #[test]
    fn merge_appends_pages_in_argument_order() {
        let a = sample_pdf(&[(100, 100)]);
        let b = sample_pdf(&[(200, 200), (300, 300)]);
        let c = sample_pdf(&[(400, 400)]);

        let merged = PdfReader::from_bytes(&a)
            .unwrap()
            .merge(&[b.as_slice(), c.as_slice()])
            .unwrap();
        let widths: Vec<f32> = PdfReader::from_bytes(&merged)
            .unwrap()
            .page_sizes()
            .unwrap()
            .iter()
            .map(|size| size.width)
            .collect();
        assert_eq!(widths, vec![100.0, 200.0, 300.0, 400.0]);
    }

    #[test]
    fn merge_rejects_garbage() {
        let a = sample_pdf(&[(100, 100)]);
        let result = PdfReader::from_bytes(&a).unwrap().merge(&[b"junk".as_slice()]);
        assert!(matches!(result, Err(SignwerkError::UnsupportedDocument(msg)) if msg.contains("#1")));
    }

    #[test]
    fn split_yields_one_document_per_page() {
        let reader = PdfReader::from_bytes(&sample_pdf(&[(100, 150), (200, 250), (300, 350)])).unwrap();
        let parts = reader.split_pages().unwrap();
        assert_eq!(parts.len(), 3);
        for (part, expected_height) in parts.iter().zip([150.0, 250.0, 350.0]) {
            let single = PdfReader::from_bytes(part).unwrap();
            assert_eq!(single.page_count(), 1);
            assert_eq!(single.page_sizes().unwrap()[0].height, expected_height);
        }
    }

    #[test]
    fn extract_out_of_range_page() {
        let reader = PdfReader::from_bytes(&sample_pdf(&[(100, 100)])).unwrap();
        assert!(matches!(
            reader.extract_page(2),
            Err(SignwerkError::PageOutOfRange { page: 2, page_count: 1 })
        ));
        assert!(reader.extract_page(0).is_err());
    }

    #[test]
    fn rotation_accumulates_and_wraps() {
        let reader = PdfReader::from_bytes(&sample_pdf(&[(100, 100), (100, 100)])).unwrap();
        let once = reader.rotate_all(270).unwrap();
        let twice = PdfReader::from_bytes(&once).unwrap().rotate_all(180).unwrap();

        let doc = Document::load_mem(&twice).unwrap();
        for page_id in doc.get_pages().into_values() {
            assert_eq!(page::rotation(&doc, page_id), 90);
        }
    }

    #[test]
    fn rotation_must_be_a_right_angle() {
        let reader = PdfReader::from_bytes(&sample_pdf(&[(100, 100)])).unwrap();
        assert!(reader.rotate_all(45).is_err());
        assert!(reader.rotate_all(-90).is_ok());
    }

    #[test]
    fn compress_reports_both_sizes() {
        let source = sample_pdf(&[(100, 100), (200, 200)]);
        let reader = PdfReader::from_bytes(&source).unwrap();
        let (output, report) = reader.compress().unwrap();

        assert_eq!(report.original_bytes, source.len());
        assert_eq!(report.compressed_bytes, output.len());
        assert_eq!(PdfReader::from_bytes(&output).unwrap().page_count(), 2);
    }

    #[test]
    fn reduction_percent_handles_growth_and_empty_input() {
        let shrunk = CompressReport { original_bytes: 200, compressed_bytes: 150 };
        assert_eq!(shrunk.reduction_percent(), 25.0);
        let grown = CompressReport { original_bytes: 100, compressed_bytes: 110 };
        assert!(grown.reduction_percent() < 0.0);
        let empty = CompressReport { original_bytes: 0, compressed_bytes: 10 };
        assert_eq!(empty.reduction_percent(), 0.0);
    }
}
