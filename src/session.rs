//! Document session: pages, template backgrounds, header/footer replay.
//!
//! A [`Session`] starts with one page. Every page, including the first, is
//! drawn over its template page (when a template is configured) and then
//! receives the header and footer items. The body items are drawn once, on
//! the last page, when the session is finished.
//!
//! # Example
//!
//! ```ignore
//! use fastpdf::{Item, Sections, Session, SessionConfig};
//!
//! let sections = Sections {
//!     header: vec![Item::text(40.0, 20.0, 10, "ACME Corp.")],
//!     body: vec![Item::text(40.0, 100.0, 12, "Hello")],
//!     footer: vec![Item::line(40.0, 800.0, 515.0, 0.0)],
//! };
//! let mut session = Session::new(SessionConfig::new(), sections)?;
//! session.new_page()?;
//! let bytes = session.finish()?;
//! ```

use crate::config::SessionConfig;
use crate::error::Result;
use crate::items::{deserialize_items, Item};
use crate::writer::{draw_items, DrawOptions, PdfFont, PdfWriter, TemplateDocument};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Item lists of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sections {
    /// Drawn on every page when the page is created
    pub header: Vec<Item>,
    /// Drawn once, on the last page, at finish
    pub body: Vec<Item>,
    /// Drawn on every page when the page is created
    pub footer: Vec<Item>,
}

impl Sections {
    /// Sections with only a body.
    pub fn body(items: Vec<Item>) -> Self {
        Self {
            body: items,
            ..Default::default()
        }
    }
}

/// An open document.
#[derive(Debug)]
pub struct Session {
    writer: PdfWriter,
    template: Option<TemplateDocument>,
    sections: Sections,
    page_size: (f64, f64),
    options: DrawOptions,
}

impl Session {
    /// Open a document and create its first page.
    ///
    /// Fails with `FontLoad` or `TemplateImport` when the configured font or
    /// template cannot be loaded.
    pub fn new(config: SessionConfig, sections: Sections) -> Result<Self> {
        let font = PdfFont::load(&config.font)?;
        let template = config
            .template
            .as_ref()
            .map(TemplateDocument::load)
            .transpose()?;

        let mut session = Self {
            writer: PdfWriter::new(config.writer_config(), font),
            template,
            sections,
            page_size: config.page_size.dimensions(),
            options: config.draw_options(),
        };
        session.new_page()?;
        Ok(session)
    }

    /// Append a page and make it current.
    ///
    /// The page gets its template background, then the header and footer.
    pub fn new_page(&mut self) -> Result<()> {
        let (width, height) = self.page_size;
        let index = self.writer.add_page(width, height);
        log::debug!("Added page {} ({} x {})", index + 1, width, height);

        if let Some(template) = self.template.as_mut() {
            let source = template.page_for(index);
            let imported = template.import_page(source, self.writer.objects_mut())?;
            self.writer.draw_form(imported.xobject, imported.bbox)?;
        }

        draw_items(&mut self.writer, &self.sections.header, &self.options)?;
        draw_items(&mut self.writer, &self.sections.footer, &self.options)
    }

    /// Draw items on the current page right away.
    pub fn draw(&mut self, items: &[Item]) -> Result<()> {
        draw_items(&mut self.writer, items, &self.options)
    }

    /// Number of pages created so far.
    pub fn page_count(&self) -> usize {
        self.writer.page_count()
    }

    /// Draw the body on the current page and serialize the document.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        draw_items(&mut self.writer, &self.sections.body, &self.options)?;
        let pages = self.writer.page_count();
        let bytes = self.writer.finish()?;
        log::info!("Finished document: {} pages, {} bytes", pages, bytes.len());
        Ok(bytes)
    }

    /// Finish the document and write it to `path`.
    pub fn save(self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.finish()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// A whole document description, loadable from JSON.
///
/// Item lists use the wire record format; unknown item types are skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderJob {
    /// Session settings
    pub config: SessionConfig,
    /// Items repeated on every page
    #[serde(deserialize_with = "deserialize_items")]
    pub header: Vec<Item>,
    /// Items drawn once
    #[serde(deserialize_with = "deserialize_items")]
    pub body: Vec<Item>,
    /// Items repeated on every page
    #[serde(deserialize_with = "deserialize_items")]
    pub footer: Vec<Item>,
}

impl RenderJob {
    /// Parse a job from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the job as a single-page document.
    pub fn render(self) -> Result<Vec<u8>> {
        let sections = Sections {
            header: self.header,
            body: self.body,
            footer: self.footer,
        };
        Session::new(self.config, sections)?.finish()
    }
}

/// Render `items` as the body of a new single-page document.
pub fn create_pdf(config: SessionConfig, items: Vec<Item>) -> Result<Vec<u8>> {
    Session::new(config, Sections::body(items))?.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_session_starts_with_one_page() {
        let mut session = Session::new(SessionConfig::new(), Sections::default()).unwrap();
        assert_eq!(session.page_count(), 1);
        session.new_page().unwrap();
        session.new_page().unwrap();
        assert_eq!(session.page_count(), 3);
        let bytes = session.finish().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
    }

    #[test]
    fn test_missing_template_fails_construction() {
        let config = SessionConfig::new().with_template("/nonexistent/template.pdf");
        let err = Session::new(config, Sections::default()).unwrap_err();
        assert!(matches!(err, Error::TemplateImport(_)));
    }

    #[test]
    fn test_missing_font_fails_construction() {
        let config = SessionConfig::new().with_font_file("/nonexistent/font.ttf");
        let err = Session::new(config, Sections::default()).unwrap_err();
        assert!(matches!(err, Error::FontLoad(_)));
    }

    #[test]
    fn test_header_failure_surfaces_on_new_page() {
        let sections = Sections {
            header: vec![Item::QrCode {
                left: 0.0,
                top: 0.0,
                size: 3,
                text: "too small".to_string(),
            }],
            ..Default::default()
        };
        let err = Session::new(SessionConfig::new(), sections).unwrap_err();
        assert!(matches!(err, Error::SymbolEncode(_)));
    }

    #[test]
    fn test_render_job_from_json() {
        let job = RenderJob::from_json(
            r#"{
                "config": {"pageSize": "letter", "title": "Label"},
                "header": [{"type": 0, "left": 10, "top": 10, "size": 8, "text": "H"}],
                "body": [{"type": 7}, {"type": 3, "left": 0, "top": 50, "width": 100}]
            }"#,
        )
        .unwrap();
        assert_eq!(job.config.page_size.dimensions(), (612.0, 792.0));
        assert_eq!(job.header, vec![Item::text(10.0, 10.0, 8, "H")]);
        assert_eq!(job.body, vec![Item::line(0.0, 50.0, 100.0, 0.0)]);
        assert!(job.footer.is_empty());

        let bytes = job.render().unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("/Title (Label)"));
    }

    #[test]
    fn test_render_job_rejects_malformed_json() {
        assert!(matches!(RenderJob::from_json("{"), Err(Error::ItemDecode(_))));
    }

    #[test]
    fn test_create_pdf() {
        let bytes = create_pdf(SessionConfig::new(), vec![Item::text(10.0, 10.0, 12, "Hi")]).unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("(Hi) Tj"));
    }
}
