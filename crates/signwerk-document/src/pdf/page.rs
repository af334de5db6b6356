// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page-tree helpers shared by the codec and the toolbox: inherited attribute
// lookup, MediaBox resolution, fresh page trees, and cross-document page
// cloning.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use signwerk_core::{DocumentType, PageSize};
use signwerk_core::error::{Result, SignwerkError};
use tracing::warn;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Page trees deeper than this are treated as cyclic.
const MAX_TREE_DEPTH: usize = 64;

/// Used when neither the page nor any ancestor carries a MediaBox (A4).
const FALLBACK_MEDIA_BOX: MediaBox = MediaBox {
    llx: 0.0,
    lly: 0.0,
    urx: 595.0,
    ury: 842.0,
};

/// A page's MediaBox in default user space units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaBox {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

impl MediaBox {
    pub fn width(&self) -> f32 {
        (self.urx - self.llx).abs()
    }

    pub fn height(&self) -> f32 {
        (self.ury - self.lly).abs()
    }

    pub fn size(&self) -> PageSize {
        PageSize {
            width: self.width(),
            height: self.height(),
        }
    }
}

/// Parse PDF bytes. Content that is not a PDF at all (an image, text) is
/// `UnsupportedDocument`; a damaged PDF is a `PdfError`.
pub fn load_pdf(bytes: &[u8], what: &str) -> Result<Document> {
    match DocumentType::sniff(bytes) {
        Ok(DocumentType::Pdf) => {}
        Ok(other) => {
            return Err(SignwerkError::UnsupportedDocument(format!(
                "{} is a {:?} image, not a PDF",
                what, other
            )));
        }
        Err(SignwerkError::UnsupportedDocument(detail)) => {
            return Err(SignwerkError::UnsupportedDocument(format!("{}: {}", what, detail)));
        }
        Err(err) => return Err(err),
    }
    Document::load_mem(bytes)
        .map_err(|err| SignwerkError::PdfError(format!("failed to load {}: {}", what, err)))
}

/// Follow a reference to the object it names. Direct objects pass through.
pub fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).map_err(|err| {
            SignwerkError::PdfError(format!("cannot resolve object {:?}: {}", id, err))
        }),
        direct => Ok(direct),
    }
}

/// The page dictionary for `page_id`.
pub fn page_dict(doc: &Document, page_id: ObjectId) -> Result<&Dictionary> {
    doc.get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(|err| SignwerkError::PdfError(format!("page {:?} is not a dictionary: {}", page_id, err)))
}

/// Look up `key` on the page, falling back to its ancestors.
pub fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = Some(page_id);
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_object(current?).and_then(Object::as_dict).ok()?;
        if let Ok(value) = dict.get(key) {
            return resolve(doc, value).ok();
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

/// Resolve the page's effective MediaBox.
pub fn media_box(doc: &Document, page_id: ObjectId) -> Result<MediaBox> {
    let Some(raw) = inherited(doc, page_id, b"MediaBox") else {
        warn!(?page_id, "Page has no MediaBox, assuming A4");
        return Ok(FALLBACK_MEDIA_BOX);
    };

    let values = raw
        .as_array()
        .map_err(|err| SignwerkError::PdfError(format!("MediaBox is not an array: {}", err)))?;
    if values.len() != 4 {
        return Err(SignwerkError::PdfError(format!(
            "MediaBox has {} entries, expected 4",
            values.len()
        )));
    }

    let mut corners = [0.0f32; 4];
    for (slot, value) in corners.iter_mut().zip(values) {
        *slot = resolve(doc, value)?
            .as_float()
            .map_err(|err| SignwerkError::PdfError(format!("MediaBox entry not numeric: {}", err)))?;
    }
    let [llx, lly, urx, ury] = corners;
    Ok(MediaBox {
        llx: llx.min(urx),
        lly: lly.min(ury),
        urx: llx.max(urx),
        ury: lly.max(ury),
    })
}

/// Existing `/Rotate` of a page (inherited), normalised to `[0, 360)`.
pub fn rotation(doc: &Document, page_id: ObjectId) -> i64 {
    inherited(doc, page_id, b"Rotate")
        .and_then(|value| value.as_i64().ok())
        .unwrap_or(0)
        .rem_euclid(360)
}

/// An empty document with a catalog and an empty page tree.
pub fn empty_document() -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => Vec::<Object>::new(),
        "Count" => 0,
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Serialise a document into a byte vector.
pub fn save_to_vec(doc: &mut Document, what: &str) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|err| SignwerkError::PdfError(format!("failed to serialise {}: {}", what, err)))?;
    Ok(output)
}

// -- Cross-document cloning ---------------------------------------------------

/// Copies pages from one source document into a target, sharing every object
/// the copied pages have in common (fonts, images) instead of duplicating it.
pub struct PageCloner<'a> {
    source: &'a Document,
    copied: BTreeMap<ObjectId, ObjectId>,
}

impl<'a> PageCloner<'a> {
    pub fn new(source: &'a Document) -> Self {
        Self {
            source,
            copied: BTreeMap::new(),
        }
    }

    /// Clone the source page `page_id` into `target`, appending it as the last
    /// page of the target's page tree. Inherited attributes are materialised
    /// on the copy.
    pub fn append_page(&mut self, target: &mut Document, page_id: ObjectId) -> Result<ObjectId> {
        let mut page = page_dict(self.source, page_id)?.clone();
        for key in INHERITABLE {
            if !page.has(key)
                && let Some(value) = inherited(self.source, page_id, key)
            {
                page.set(key.to_vec(), value.clone());
            }
        }
        page.remove(b"Parent");

        let pages_id = target
            .catalog()
            .and_then(|catalog| catalog.get(b"Pages"))
            .and_then(Object::as_reference)
            .map_err(|err| SignwerkError::PdfError(format!("target has no page tree: {}", err)))?;

        // Registered before the deep clone so back-references (annotation /P)
        // land on the copy.
        let new_id = target.new_object_id();
        self.copied.insert(page_id, new_id);
        let mut cloned = match self.clone_object(target, &Object::Dictionary(page))? {
            Object::Dictionary(dict) => dict,
            _ => Dictionary::new(),
        };
        cloned.set("Parent", pages_id);
        target.objects.insert(new_id, Object::Dictionary(cloned));

        let pages = target
            .get_object_mut(pages_id)
            .and_then(Object::as_dict_mut)
            .map_err(|err| SignwerkError::PdfError(format!("page tree root unreadable: {}", err)))?;
        let count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        let mut kids = match pages.get(b"Kids") {
            Ok(Object::Array(kids)) => kids.clone(),
            _ => Vec::new(),
        };
        kids.push(Object::Reference(new_id));
        pages.set("Kids", kids);
        pages.set("Count", count + 1);

        Ok(new_id)
    }

    fn clone_object(&mut self, target: &mut Document, object: &Object) -> Result<Object> {
        match object {
            Object::Dictionary(dict) => Ok(Object::Dictionary(self.clone_dict(target, dict)?)),
            Object::Array(items) => {
                let mut cloned = Vec::with_capacity(items.len());
                for item in items {
                    cloned.push(self.clone_object(target, item)?);
                }
                Ok(Object::Array(cloned))
            }
            Object::Stream(stream) => {
                let mut cloned = stream.clone();
                cloned.dict = self.clone_dict(target, &stream.dict)?;
                Ok(Object::Stream(cloned))
            }
            Object::Reference(id) => {
                if let Some(mapped) = self.copied.get(id) {
                    return Ok(Object::Reference(*mapped));
                }
                match self.source.get_object(*id) {
                    Ok(referenced) => {
                        let new_id = target.new_object_id();
                        self.copied.insert(*id, new_id);
                        let cloned = self.clone_object(target, referenced)?;
                        target.objects.insert(new_id, cloned);
                        Ok(Object::Reference(new_id))
                    }
                    Err(err) => {
                        warn!(ref_id = ?id, %err, "Cannot resolve reference, using Null");
                        Ok(Object::Null)
                    }
                }
            }
            other => Ok(other.clone()),
        }
    }

    fn clone_dict(&mut self, target: &mut Document, dict: &Dictionary) -> Result<Dictionary> {
        let mut cloned = Dictionary::new();
        for (key, value) in dict.iter() {
            // Page-tree back-links are re-pointed by `append_page`.
            if key == b"Parent" {
                continue;
            }
            cloned.set(key.clone(), self.clone_object(target, value)?);
        }
        Ok(cloned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::sample_pdf;

    fn first_page(doc: &Document) -> ObjectId {
        *doc.get_pages().values().next().unwrap()
    }

    #[test]
    fn loading_rejects_non_pdf_content_by_type() {
        assert!(load_pdf(&sample_pdf(&[(10, 10)]), "fixture").is_ok());
        assert!(matches!(
            load_pdf(b"\x89PNG\r\n\x1a\n\x00\x00", "upload"),
            Err(SignwerkError::UnsupportedDocument(detail)) if detail.contains("Png")
        ));
        assert!(matches!(
            load_pdf(b"hello", "upload"),
            Err(SignwerkError::UnsupportedDocument(detail)) if detail.starts_with("upload")
        ));
    }

    #[test]
    fn media_box_is_read_from_the_page() {
        let doc = Document::load_mem(&sample_pdf(&[(612, 792)])).unwrap();
        let media = media_box(&doc, first_page(&doc)).unwrap();
        assert_eq!(media.size(), PageSize { width: 612.0, height: 792.0 });
    }

    #[test]
    fn resources_are_inherited_from_the_tree() {
        let doc = Document::load_mem(&sample_pdf(&[(100, 100)])).unwrap();
        let resources = inherited(&doc, first_page(&doc), b"Resources").unwrap();
        assert!(resources.as_dict().unwrap().has(b"Font"));
        assert!(inherited(&doc, first_page(&doc), b"Rotate").is_none());
        assert_eq!(rotation(&doc, first_page(&doc)), 0);
    }

    #[test]
    fn cloned_pages_carry_inherited_attributes() {
        let source = Document::load_mem(&sample_pdf(&[(300, 400), (500, 600)])).unwrap();
        let mut target = empty_document();
        let mut cloner = PageCloner::new(&source);
        for page_id in source.get_pages().into_values() {
            cloner.append_page(&mut target, page_id).unwrap();
        }

        let bytes = save_to_vec(&mut target, "clone").unwrap();
        let reloaded = Document::load_mem(&bytes).unwrap();
        let pages: Vec<_> = reloaded.get_pages().into_values().collect();
        assert_eq!(pages.len(), 2);
        assert_eq!(media_box(&reloaded, pages[1]).unwrap().height(), 600.0);
        let page = page_dict(&reloaded, pages[0]).unwrap();
        assert!(page.has(b"Resources"));
    }
}
