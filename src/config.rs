//! Session configuration.

use crate::writer::{DrawOptions, FontSource, PdfWriterConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Page size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageSize {
    /// ISO A4 (210 x 297 mm)
    #[default]
    A4,
    /// US Letter (8.5 x 11 in)
    Letter,
    /// US Legal (8.5 x 14 in)
    Legal,
    /// ISO A3 (297 x 420 mm)
    A3,
    /// Width and height in points
    Custom(f64, f64),
}

impl PageSize {
    /// Width and height in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::Custom(w, h) => (*w, *h),
        }
    }
}

/// Configuration of a rendering session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// Size of every page
    pub page_size: PageSize,
    /// Font used for all text
    pub font: FontSource,
    /// Background template document
    pub template: Option<PathBuf>,
    /// Flate-compress content streams
    pub compress: bool,
    /// Stroke width for lines, grids and table borders
    pub line_width: f32,
    /// Quiet zone around QR symbols, in modules
    pub qr_quiet_zone: u32,
    /// Document title
    pub title: Option<String>,
    /// Document author
    pub author: Option<String>,
    /// Document subject
    pub subject: Option<String>,
    /// Creator application
    pub creator: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionConfig {
    /// Create a configuration with defaults: A4, Helvetica, no template.
    pub fn new() -> Self {
        let writer = PdfWriterConfig::default();
        Self {
            page_size: PageSize::A4,
            font: FontSource::default(),
            template: None,
            compress: writer.compress,
            line_width: writer.line_width,
            qr_quiet_zone: 0,
            title: None,
            author: None,
            subject: None,
            creator: writer.creator,
        }
    }

    /// Set the page size.
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the font.
    pub fn with_font(mut self, font: FontSource) -> Self {
        self.font = font;
        self
    }

    /// Use a TrueType font file.
    pub fn with_font_file(self, path: impl Into<PathBuf>) -> Self {
        self.with_font(FontSource::TrueType(path.into()))
    }

    /// Draw every page over a page of this template document.
    pub fn with_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template = Some(path.into());
        self
    }

    /// Enable or disable stream compression.
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Set the stroke width.
    pub fn with_line_width(mut self, line_width: f32) -> Self {
        self.line_width = line_width;
        self
    }

    /// Set the QR quiet zone.
    pub fn with_qr_quiet_zone(mut self, modules: u32) -> Self {
        self.qr_quiet_zone = modules;
        self
    }

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

    /// Set document subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Writer settings derived from this configuration.
    pub fn writer_config(&self) -> PdfWriterConfig {
        PdfWriterConfig {
            title: self.title.clone(),
            author: self.author.clone(),
            subject: self.subject.clone(),
            creator: self.creator.clone(),
            compress: self.compress,
            line_width: self.line_width,
            ..PdfWriterConfig::default()
        }
    }

    /// Item drawing settings derived from this configuration.
    pub fn draw_options(&self) -> DrawOptions {
        DrawOptions {
            qr_quiet_zone: self.qr_quiet_zone,
        }
    }
}
