//! Template page import.
//!
//! A template PDF is read with `lopdf`. Importing one of its pages turns it
//! into a Form XObject of the output document: the page's decoded content
//! becomes the form stream, its MediaBox the form's `/BBox`, and its
//! resources are deep-copied into the output object table.
//!
//! Copying keeps an id map shared by every import from the same template, so
//! objects referenced by several pages (fonts, images) land in the output
//! once. A `Null` placeholder is registered before recursing into an object,
//! which breaks reference cycles such as `Page -> Parent -> Kids -> Page`.

use super::pdf_writer::ObjectTable;
use crate::error::{Error, Result};
use crate::object::{dict, Dict, Object, ObjectRef};
use lopdf::{Dictionary, Document, ObjectId};
use std::collections::HashMap;
use std::path::Path;

/// Maximum `/Parent` hops followed when resolving inherited attributes.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// A template page placed in the output document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportedPage {
    /// The Form XObject
    pub xobject: ObjectRef,
    /// The form's bounding box `[llx, lly, urx, ury]`
    pub bbox: [f64; 4],
}

/// A loaded template document.
#[derive(Debug)]
pub struct TemplateDocument {
    doc: Document,
    page_ids: Vec<ObjectId>,
    imported: HashMap<usize, ImportedPage>,
    id_map: HashMap<ObjectId, ObjectRef>,
}

impl TemplateDocument {
    /// Load a template from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let doc = Document::load(path).map_err(|e| {
            Error::TemplateImport(format!("Failed to load template {}: {}", path.display(), e))
        })?;
        log::info!("Loaded template {}", path.display());
        Self::from_document(doc)
    }

    /// Load a template from PDF bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_document(Document::load_mem(data)?)
    }

    fn from_document(doc: Document) -> Result<Self> {
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err(Error::TemplateImport("Template has no pages".to_string()));
        }
        Ok(Self {
            doc,
            page_ids,
            imported: HashMap::new(),
            id_map: HashMap::new(),
        })
    }

    /// Number of pages in the template.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Template page used for output page `page_index`: the page with the
    /// same index, or the last template page once the template runs out.
    pub fn page_for(&self, page_index: usize) -> usize {
        page_index.min(self.page_ids.len() - 1)
    }

    /// Import template page `index` (zero-based) into `objects`.
    ///
    /// Repeated imports of the same page return the first import.
    pub fn import_page(&mut self, index: usize, objects: &mut ObjectTable) -> Result<ImportedPage> {
        if let Some(imported) = self.imported.get(&index) {
            return Ok(*imported);
        }

        let page_id = *self.page_ids.get(index).ok_or_else(|| {
            Error::TemplateImport(format!(
                "Template page {} out of range ({} pages)",
                index + 1,
                self.page_ids.len()
            ))
        })?;

        let bbox = self.media_box(page_id)?;
        let content = self.doc.get_page_content(page_id)?;

        let resources = match self.inherited(page_id, b"Resources")?.cloned() {
            Some(resources) => self.copier(objects).convert(&resources)?,
            None => Object::Dictionary(Dict::new()),
        };

        let form = dict([
            ("Type", Object::name("XObject")),
            ("Subtype", Object::name("Form")),
            ("FormType", Object::Integer(1)),
            ("BBox", Object::rect(bbox[0], bbox[1], bbox[2], bbox[3])),
            ("Resources", resources),
        ]);
        let xobject = objects.add(Object::stream(form, content));

        log::debug!("Imported template page {} as {}", index + 1, xobject);

        let imported = ImportedPage { xobject, bbox };
        self.imported.insert(index, imported);
        Ok(imported)
    }

    fn copier<'a>(&'a mut self, objects: &'a mut ObjectTable) -> ObjectCopier<'a> {
        ObjectCopier {
            source: &self.doc,
            target: objects,
            id_map: &mut self.id_map,
        }
    }

    /// Look up a page attribute, following `/Parent` for inheritable keys.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<&lopdf::Object>> {
        let mut node: &Dictionary = self.doc.get_dictionary(page_id)?;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(value) = node.get(key) {
                return Ok(Some(value));
            }
            match node.get(b"Parent").and_then(lopdf::Object::as_reference) {
                Ok(parent) => node = self.doc.get_dictionary(parent)?,
                Err(_) => return Ok(None),
            }
        }
        Ok(None)
    }

    fn media_box(&self, page_id: ObjectId) -> Result<[f64; 4]> {
        let value = self
            .inherited(page_id, b"MediaBox")?
            .ok_or_else(|| Error::TemplateImport("Template page has no MediaBox".to_string()))?;
        let value = self.resolve(value)?;

        let numbers = match value {
            lopdf::Object::Array(items) if items.len() == 4 => items
                .iter()
                .map(|item| self.resolve(item).ok().and_then(number))
                .collect::<Option<Vec<f64>>>(),
            _ => None,
        };

        match numbers.as_deref() {
            Some(&[llx, lly, urx, ury]) => Ok([llx, lly, urx, ury]),
            _ => Err(Error::TemplateImport(format!("Malformed MediaBox {:?}", value))),
        }
    }

    fn resolve<'a>(&'a self, value: &'a lopdf::Object) -> Result<&'a lopdf::Object> {
        match value {
            lopdf::Object::Reference(id) => Ok(self.doc.get_object(*id)?),
            other => Ok(other),
        }
    }
}

fn number(value: &lopdf::Object) -> Option<f64> {
    match value {
        lopdf::Object::Integer(i) => Some(*i as f64),
        lopdf::Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// Deep copy of template objects into the output object table.
struct ObjectCopier<'a> {
    source: &'a Document,
    target: &'a mut ObjectTable,
    id_map: &'a mut HashMap<ObjectId, ObjectRef>,
}

impl ObjectCopier<'_> {
    /// Copy an indirect object (and everything it references) once.
    fn copy_object(&mut self, source_id: ObjectId) -> Result<ObjectRef> {
        if let Some(target) = self.id_map.get(&source_id) {
            return Ok(*target);
        }

        // Placeholder first so cycles resolve to the new id
        let target = self.target.add(Object::Null);
        self.id_map.insert(source_id, target);

        let source = self.source;
        let obj = source.get_object(source_id)?;
        let converted = self.convert(obj)?;
        self.target.set(target, converted);
        Ok(target)
    }

    /// Convert a direct object, remapping references into the output.
    fn convert(&mut self, obj: &lopdf::Object) -> Result<Object> {
        Ok(match obj {
            lopdf::Object::Null => Object::Null,
            lopdf::Object::Boolean(b) => Object::Boolean(*b),
            lopdf::Object::Integer(i) => Object::Integer(*i),
            lopdf::Object::Real(r) => Object::Real(f64::from(*r)),
            lopdf::Object::Name(name) => Object::Name(String::from_utf8_lossy(name).into_owned()),
            lopdf::Object::String(bytes, _) => Object::String(bytes.clone()),
            lopdf::Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.convert(item))
                    .collect::<Result<Vec<_>>>()?,
            ),
            lopdf::Object::Dictionary(dict) => Object::Dictionary(self.convert_dict(dict, false)?),
            lopdf::Object::Stream(stream) => Object::Stream {
                // Length is rewritten on output
                dict: self.convert_dict(&stream.dict, true)?,
                data: bytes::Bytes::from(stream.content.clone()),
            },
            lopdf::Object::Reference(id) => Object::Reference(self.copy_object(*id)?),
        })
    }

    fn convert_dict(&mut self, dict: &Dictionary, skip_length: bool) -> Result<Dict> {
        let mut out = Dict::new();
        for (key, value) in dict.iter() {
            if skip_length && key.as_slice() == b"Length" {
                continue;
            }
            out.insert(String::from_utf8_lossy(key).into_owned(), self.convert(value)?);
        }
        Ok(out)
    }
}
