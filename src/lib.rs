// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

//! # fastpdf
//!
//! Item-driven PDF rendering: a declarative list of layout items (text,
//! barcodes, QR codes, lines, grids, tables) is drawn at absolute positions
//! onto a paginated document, optionally over the pages of a template PDF,
//! with header and footer items repeated on every page.
//!
//! ## Core Features
//!
//! - **Items**: Text, Code 128 barcodes, QR codes, lines, uniform grids and
//!   bordered tables, decodable from a flat JSON wire format
//! - **Templates**: each output page is drawn over a page of an existing PDF
//! - **Header/Footer**: repeated on every page, body drawn once
//! - **Fonts**: PDF Base-14 fonts or an embedded TrueType font
//!
//! ## Coordinates
//!
//! Item coordinates are in points with the origin at the top-left corner of
//! the page; `top` grows downwards. Text is positioned by the top of its line.
//!
//! ## Quick Start
//!
//! ```ignore
//! use fastpdf::{create_pdf, Item, SessionConfig};
//!
//! # fn main() -> fastpdf::Result<()> {
//! let items = vec![
//!     Item::text(40.0, 40.0, 18, "Shipping label"),
//!     Item::line(40.0, 64.0, 515.0, 0.0),
//!     Item::QrCode { left: 40.0, top: 80.0, size: 120, text: "PKG-0042".into() },
//! ];
//! let bytes = create_pdf(SessionConfig::new(), items)?;
//! std::fs::write("label.pdf", bytes)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Multi-page documents
//!
//! ```ignore
//! use fastpdf::{Sections, Session, SessionConfig};
//!
//! let config = SessionConfig::new().with_template("letterhead.pdf");
//! let mut session = Session::new(config, Sections { header, body, footer })?;
//! session.new_page()?;
//! session.save("out.pdf")?;
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Error handling
pub mod error;

// PDF object model
pub mod object;

// Layout items and session
pub mod config;
pub mod items;
pub mod session;

// PDF writing
pub mod writer;

// Re-exports
pub use config::{PageSize, SessionConfig};
pub use error::{Error, Result};
pub use items::{decode_items, Item, RawItem, Row, TableColumn};
pub use session::{create_pdf, RenderJob, Sections, Session};
pub use writer::{Canvas, FontSource};
