//! PDF document writer.
//!
//! Assembles complete PDF documents with proper structure:
//! header, body, xref table, and trailer.

use super::content_stream::ContentStreamBuilder;
use super::font_manager::{EncodedText, PdfFont, FONT_RESOURCE};
use super::image_handler::ImageData;
use super::serializer::PdfSerializer;
use super::Canvas;
use crate::error::{Error, Result};
use crate::object::{dict, Dict, Object, ObjectRef};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;

/// Configuration for PDF generation.
#[derive(Debug, Clone)]
pub struct PdfWriterConfig {
    /// PDF version (e.g., "1.7")
    pub version: String,
    /// Document title
    pub title: Option<String>,
    /// Document author
    pub author: Option<String>,
    /// Document subject
    pub subject: Option<String>,
    /// Creator application
    pub creator: Option<String>,
    /// Whether to compress streams
    pub compress: bool,
    /// Stroke width for lines, grids and table borders
    pub line_width: f32,
}

impl Default for PdfWriterConfig {
    fn default() -> Self {
        Self {
            version: "1.7".to_string(),
            title: None,
            author: None,
            subject: None,
            creator: Some("fastpdf".to_string()),
            compress: false,
            line_width: 1.0,
        }
    }
}

impl PdfWriterConfig {
    /// Set document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set document author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Enable or disable stream compression.
    ///
    /// When enabled, every stream without a filter is compressed with
    /// FlateDecode (zlib/deflate) at finish.
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

/// Compress data using Flate/Deflate compression.
///
/// Returns compressed bytes suitable for FlateDecode filter.
fn compress_data(data: &[u8]) -> std::io::Result<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Indirect objects of the output document, keyed by object number.
#[derive(Debug)]
pub struct ObjectTable {
    next_id: u32,
    objects: BTreeMap<u32, Object>,
}

impl Default for ObjectTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectTable {
    /// Create an empty table. Object 0 is reserved for the xref free list head.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            objects: BTreeMap::new(),
        }
    }

    /// Reserve an object number without defining the object yet.
    pub fn alloc(&mut self) -> ObjectRef {
        let id = self.next_id;
        self.next_id += 1;
        ObjectRef::new(id, 0)
    }

    /// Define (or redefine) an allocated object.
    pub fn set(&mut self, obj_ref: ObjectRef, obj: Object) {
        self.objects.insert(obj_ref.id, obj);
    }

    /// Allocate and define an object in one step.
    pub fn add(&mut self, obj: Object) -> ObjectRef {
        let obj_ref = self.alloc();
        self.set(obj_ref, obj);
        obj_ref
    }

    /// Look up a defined object.
    pub fn get(&self, obj_ref: ObjectRef) -> Option<&Object> {
        self.objects.get(&obj_ref.id)
    }

    /// Number of defined objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no object has been defined.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// One past the highest allocated object number.
    pub fn size(&self) -> u32 {
        self.next_id
    }
}

/// Internal page data.
#[derive(Debug)]
struct PageData {
    width: f64,
    height: f64,
    content_builder: ContentStreamBuilder,
    /// XObject resources (resource name -> object ref)
    xobjects: BTreeMap<String, ObjectRef>,
}

/// PDF document writer.
///
/// Pages are appended in order and drawing always targets the last page.
/// Coordinates passed through [`Canvas`] use a top-left origin.
#[derive(Debug)]
pub struct PdfWriter {
    config: PdfWriterConfig,
    pages: Vec<PageData>,
    objects: ObjectTable,
    font: PdfFont,
    /// Embedded images by JPEG bytes, so repeated symbols share one XObject
    images: HashMap<Vec<u8>, ObjectRef>,
}

impl PdfWriter {
    /// Create a PDF writer drawing text with `font`.
    pub fn new(config: PdfWriterConfig, font: PdfFont) -> Self {
        Self {
            config,
            pages: Vec::new(),
            objects: ObjectTable::new(),
            font,
            images: HashMap::new(),
        }
    }

    /// Add a page with the given dimensions and make it current.
    ///
    /// Returns the zero-based page index.
    pub fn add_page(&mut self, width: f64, height: f64) -> usize {
        self.pages.push(PageData {
            width,
            height,
            content_builder: ContentStreamBuilder::new(),
            xobjects: BTreeMap::new(),
        });
        self.pages.len() - 1
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Content stream of the current page.
    pub fn current_content(&self) -> Option<&ContentStreamBuilder> {
        self.pages.last().map(|page| &page.content_builder)
    }

    /// Object table for collaborators that add their own objects.
    pub fn objects_mut(&mut self) -> &mut ObjectTable {
        &mut self.objects
    }

    fn current_page(&mut self) -> Result<&mut PageData> {
        self.pages
            .last_mut()
            .ok_or_else(|| Error::RenderWrite("no page has been added".to_string()))
    }

    /// Draw a form XObject stretched from its `bbox` onto the whole current page.
    pub fn draw_form(&mut self, form: ObjectRef, bbox: [f64; 4]) -> Result<()> {
        let page = self.current_page()?;
        let [llx, lly, urx, ury] = bbox;
        let (bw, bh) = (urx - llx, ury - lly);
        if bw <= 0.0 || bh <= 0.0 {
            return Err(Error::TemplateImport(format!("degenerate template box {:?}", bbox)));
        }

        let sx = page.width / bw;
        let sy = page.height / bh;
        let name = format!("Tpl{}", form.id);
        page.xobjects.insert(name.clone(), form);
        page.content_builder.draw_form(
            &name,
            [sx as f32, 0.0, 0.0, sy as f32, (-llx * sx) as f32, (-lly * sy) as f32],
        );
        Ok(())
    }

    /// Build the complete PDF document.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let font_ref = self.font.write_objects(&mut self.objects);
        let pages_ref = self.objects.alloc();

        let mut page_refs = Vec::with_capacity(self.pages.len());
        for page_data in &self.pages {
            let content = page_data.content_builder.build()?;
            let content_ref = self.objects.add(Object::stream(Dict::new(), content));

            let mut resources = vec![(
                "Font",
                Object::dictionary([(FONT_RESOURCE, Object::Reference(font_ref))]),
            )];
            if !page_data.xobjects.is_empty() {
                let xobjects = page_data
                    .xobjects
                    .iter()
                    .map(|(name, obj_ref)| (name.clone(), Object::Reference(*obj_ref)))
                    .collect();
                resources.push(("XObject", Object::Dictionary(xobjects)));
            }

            let page_obj = Object::dictionary([
                ("Type", Object::name("Page")),
                ("Parent", Object::Reference(pages_ref)),
                (
                    "MediaBox",
                    Object::rect(0.0, 0.0, page_data.width, page_data.height),
                ),
                ("Contents", Object::Reference(content_ref)),
                ("Resources", Object::dictionary(resources)),
            ]);
            page_refs.push(Object::Reference(self.objects.add(page_obj)));
        }

        let page_count = page_refs.len() as i64;
        self.objects.set(
            pages_ref,
            Object::dictionary([
                ("Type", Object::name("Pages")),
                ("Kids", Object::Array(page_refs)),
                ("Count", Object::Integer(page_count)),
            ]),
        );

        let catalog_ref = self.objects.add(Object::dictionary([
            ("Type", Object::name("Catalog")),
            ("Pages", Object::Reference(pages_ref)),
        ]));

        let mut info_entries = Vec::new();
        if let Some(title) = &self.config.title {
            info_entries.push(("Title", Object::text(title)));
        }
        if let Some(author) = &self.config.author {
            info_entries.push(("Author", Object::text(author)));
        }
        if let Some(subject) = &self.config.subject {
            info_entries.push(("Subject", Object::text(subject)));
        }
        if let Some(creator) = &self.config.creator {
            info_entries.push(("Creator", Object::text(creator)));
        }
        let info_ref = self.objects.add(Object::dictionary(info_entries));

        if self.config.compress {
            self.compress_streams()?;
        }

        log::debug!(
            "Writing PDF with {} pages and {} objects",
            page_count,
            self.objects.len()
        );

        self.write_document(catalog_ref, info_ref)
            .map_err(|e| Error::RenderWrite(e.to_string()))
    }

    /// Flate-compress every stream that has no filter yet.
    fn compress_streams(&mut self) -> Result<()> {
        for obj in self.objects.objects.values_mut() {
            if let Object::Stream { dict, data } = obj {
                if dict.contains_key("Filter") {
                    continue;
                }
                let compressed =
                    compress_data(data).map_err(|e| Error::RenderWrite(e.to_string()))?;
                dict.insert("Filter".to_string(), Object::name("FlateDecode"));
                *data = bytes::Bytes::from(compressed);
            }
        }
        Ok(())
    }

    fn write_document(&self, catalog_ref: ObjectRef, info_ref: ObjectRef) -> std::io::Result<Vec<u8>> {
        let mut serializer = PdfSerializer::new(&self.config.version)?;
        for (&id, obj) in &self.objects.objects {
            serializer.write_indirect(id, obj)?;
        }
        serializer.finish(
            self.objects.size(),
            dict([
                ("Root", Object::Reference(catalog_ref)),
                ("Info", Object::Reference(info_ref)),
            ]),
        )
    }

    /// Save the PDF to a file.
    pub fn save(self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let bytes = self.finish()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

impl Canvas for PdfWriter {
    fn draw_text(&mut self, left: f32, top: f32, size: f32, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let baseline = top + self.font.ascent() * size / 1000.0;
        let encoded = self.font.encode(text)?;

        let page = self.current_page()?;
        let y = page.height as f32 - baseline;
        let content = &mut page.content_builder;
        content.set_font(FONT_RESOURCE, size);
        match encoded {
            EncodedText::Literal(bytes) => content.text(bytes, left, y),
            EncodedText::Hex(hex) => content.hex_text(&hex, left, y),
        };
        Ok(())
    }

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<()> {
        let line_width = self.config.line_width;
        let page = self.current_page()?;
        let height = page.height as f32;
        page.content_builder
            .set_line_style(line_width)
            .line(x1, height - y1, x2, height - y2);
        Ok(())
    }

    fn draw_image(
        &mut self,
        left: f32,
        top: f32,
        width: f32,
        height: f32,
        image: &ImageData,
    ) -> Result<()> {
        // Fail before touching the object table when there is no page
        self.current_page()?;

        let image_ref = match self.images.get(&image.data) {
            Some(image_ref) => *image_ref,
            None => {
                let image_ref = self.objects.add(image.to_xobject());
                self.images.insert(image.data.clone(), image_ref);
                image_ref
            },
        };

        let page = self.current_page()?;
        let name = format!("Im{}", image_ref.id);
        page.xobjects.insert(name.clone(), image_ref);
        let y = page.height as f32 - top - height;
        page.content_builder.draw_xobject(&name, left, y, width, height);
        Ok(())
    }
}
