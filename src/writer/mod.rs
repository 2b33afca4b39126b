//! PDF writing module.
//!
//! Items are turned into drawing calls on a [`Canvas`]; [`PdfWriter`] is the
//! canvas that assembles those calls into a PDF document.
//!
//! ## Architecture
//!
//! ```text
//! Item[]
//!     ↓
//! [draw_items] (item variant → canvas primitive)
//!     ↓                 ↘
//!     ↓          [TableLayout] / [BarcodeGenerator] (tables, grids, symbols)
//!     ↓                 ↙
//! [PdfWriter] (Canvas: pages, fonts, images, template forms)
//!     ↓
//! [ContentStreamBuilder] (operators → content stream bytes)
//!     ↓
//! [PdfSerializer] (objects, xref, trailer)
//!     ↓
//! PDF bytes
//! ```
//!
//! ## Low-Level API (PdfWriter)
//!
//! ```ignore
//! use fastpdf::writer::{Canvas, FontSource, PdfFont, PdfWriter, PdfWriterConfig};
//!
//! let font = PdfFont::load(&FontSource::default())?;
//! let mut writer = PdfWriter::new(PdfWriterConfig::default(), font);
//! writer.add_page(595.28, 841.89);
//! writer.draw_text(72.0, 72.0, 12.0, "Hello, World!")?;
//! let bytes = writer.finish()?;
//! ```

pub mod barcode;
mod content_stream;
mod dispatcher;
mod font_manager;
mod image_handler;
mod pdf_writer;
mod serializer;
mod table_renderer;
mod template_import;

pub use barcode::{BarcodeGenerator, QrCodeOptions, QrErrorCorrection};
pub use content_stream::{ContentStreamBuilder, ContentStreamOp};
pub use dispatcher::{draw_item, draw_items, DrawOptions};
pub use font_manager::{EmbeddedFont, EncodedText, FontSource, PdfFont, StandardFont};
pub use image_handler::{ColorSpace, ImageData, ImageError};
pub use pdf_writer::{ObjectTable, PdfWriter, PdfWriterConfig};
pub use serializer::PdfSerializer;
pub use table_renderer::{draw_grid, draw_table, grid_ops, TableLayout, TableOp};
pub use template_import::{ImportedPage, TemplateDocument};

use crate::error::Result;

/// Drawing surface for layout items.
///
/// Coordinates are in points with a top-left origin; implementations flip
/// them into their own space.
pub trait Canvas {
    /// Draw a single line of text whose top edge is at `top`.
    fn draw_text(&mut self, left: f32, top: f32, size: f32, text: &str) -> Result<()>;

    /// Stroke a straight segment.
    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<()>;

    /// Place an image in the `width` x `height` box whose top-left corner is
    /// at `(left, top)`.
    fn draw_image(
        &mut self,
        left: f32,
        top: f32,
        width: f32,
        height: f32,
        image: &ImageData,
    ) -> Result<()>;
}
