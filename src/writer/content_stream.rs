//! Page content streams.
//!
//! [`ContentStreamBuilder`] records the operators a page needs (text,
//! stroked segments, painted XObjects) and encodes them one per line.
//! Operator syntax follows ISO 32000-1:2008, Sections 8 and 9.

use super::serializer::write_escaped;
use crate::error::{Error, Result};
use std::io::{self, Write};

/// Affine matrix `[a b c d e f]`.
pub type Matrix = [f32; 6];

/// A content stream operator with its operands.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentStreamOp {
    /// `q`
    SaveState,
    /// `Q`
    RestoreState,
    /// `cm`
    Transform(Matrix),
    /// `BT`
    BeginText,
    /// `ET`
    EndText,
    /// `Tf` with a font resource name and size
    SetFont(String, f32),
    /// `Tm`
    SetTextMatrix(Matrix),
    /// `Tj` with a literal string of single-byte codes
    ShowText(Vec<u8>),
    /// `Tj` with a hex string of two-byte glyph ids, brackets included
    ShowGlyphs(String),
    /// `[] 0 d`
    SolidLine,
    /// `w`
    SetLineWidth(f32),
    /// `m`
    MoveTo(f32, f32),
    /// `l`
    LineTo(f32, f32),
    /// `S`
    Stroke,
    /// `Do` with an XObject resource name
    PaintXObject(String),
}

impl ContentStreamOp {
    /// Append this operator's encoding, without a line break.
    pub fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        match self {
            ContentStreamOp::SaveState => w.write_all(b"q"),
            ContentStreamOp::RestoreState => w.write_all(b"Q"),
            ContentStreamOp::Transform(m) => write_matrix(w, m, "cm"),
            ContentStreamOp::BeginText => w.write_all(b"BT"),
            ContentStreamOp::EndText => w.write_all(b"ET"),
            ContentStreamOp::SetFont(name, size) => write!(w, "/{} {} Tf", name, num(*size)),
            ContentStreamOp::SetTextMatrix(m) => write_matrix(w, m, "Tm"),
            ContentStreamOp::ShowText(text) => {
                w.write_all(b"(")?;
                write_escaped(w, text)?;
                w.write_all(b") Tj")
            },
            ContentStreamOp::ShowGlyphs(hex) => write!(w, "{} Tj", hex),
            ContentStreamOp::SolidLine => w.write_all(b"[] 0 d"),
            ContentStreamOp::SetLineWidth(width) => write!(w, "{} w", num(*width)),
            ContentStreamOp::MoveTo(x, y) => write!(w, "{} {} m", num(*x), num(*y)),
            ContentStreamOp::LineTo(x, y) => write!(w, "{} {} l", num(*x), num(*y)),
            ContentStreamOp::Stroke => w.write_all(b"S"),
            ContentStreamOp::PaintXObject(name) => write!(w, "/{} Do", name),
        }
    }
}

/// Normalize negative zero so it prints as `0`.
fn num(value: f32) -> f32 {
    value + 0.0
}

fn write_matrix<W: Write>(w: &mut W, m: &Matrix, operator: &str) -> io::Result<()> {
    for value in m {
        write!(w, "{} ", num(*value))?;
    }
    w.write_all(operator.as_bytes())
}

/// Builder for one page's content stream.
///
/// Tracks the open text object, the selected font and the line width so
/// `BT`, `Tf` and `w` are only emitted when something changes.
#[derive(Debug, Default)]
pub struct ContentStreamBuilder {
    operations: Vec<ContentStreamOp>,
    font: Option<(String, f32)>,
    in_text_object: bool,
    line_width: Option<f32>,
}

impl ContentStreamBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw operator.
    pub fn op(&mut self, op: ContentStreamOp) -> &mut Self {
        self.operations.push(op);
        self
    }

    /// Operators recorded so far.
    pub fn operations(&self) -> &[ContentStreamOp] {
        &self.operations
    }

    /// Open a text object unless one is open.
    pub fn begin_text(&mut self) -> &mut Self {
        if !self.in_text_object {
            self.in_text_object = true;
            self.op(ContentStreamOp::BeginText);
        }
        self
    }

    /// Close the open text object, if any.
    pub fn end_text(&mut self) -> &mut Self {
        if self.in_text_object {
            self.in_text_object = false;
            self.op(ContentStreamOp::EndText);
        }
        self
    }

    /// Select a font resource and size.
    pub fn set_font(&mut self, resource: &str, size: f32) -> &mut Self {
        let unchanged = matches!(&self.font, Some((name, current)) if name == resource && *current == size);
        if !unchanged {
            self.font = Some((resource.to_string(), size));
            self.op(ContentStreamOp::SetFont(resource.to_string(), size));
        }
        self
    }

    /// Show single-byte encoded text with its baseline origin at `(x, y)`.
    pub fn text(&mut self, encoded: Vec<u8>, x: f32, y: f32) -> &mut Self {
        self.begin_text()
            .op(ContentStreamOp::SetTextMatrix([1.0, 0.0, 0.0, 1.0, x, y]))
            .op(ContentStreamOp::ShowText(encoded))
    }

    /// Show a `<...>` glyph id string with its baseline origin at `(x, y)`.
    pub fn hex_text(&mut self, hex: &str, x: f32, y: f32) -> &mut Self {
        self.begin_text()
            .op(ContentStreamOp::SetTextMatrix([1.0, 0.0, 0.0, 1.0, x, y]))
            .op(ContentStreamOp::ShowGlyphs(hex.to_string()))
    }

    /// Select a solid stroke of `width`.
    pub fn set_line_style(&mut self, width: f32) -> &mut Self {
        match self.line_width {
            Some(current) if current == width => return self,
            Some(_) => {},
            None => {
                self.op(ContentStreamOp::SolidLine);
            },
        }
        self.line_width = Some(width);
        self.op(ContentStreamOp::SetLineWidth(width))
    }

    /// Stroke a single straight segment.
    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> &mut Self {
        self.end_text()
            .op(ContentStreamOp::MoveTo(x1, y1))
            .op(ContentStreamOp::LineTo(x2, y2))
            .op(ContentStreamOp::Stroke)
    }

    /// Paint an XObject through `matrix`, isolated in its own graphics state.
    pub fn draw_form(&mut self, resource: &str, matrix: Matrix) -> &mut Self {
        self.end_text()
            .op(ContentStreamOp::SaveState)
            .op(ContentStreamOp::Transform(matrix))
            .op(ContentStreamOp::PaintXObject(resource.to_string()))
            .op(ContentStreamOp::RestoreState)
    }

    /// Paint an image XObject into the box with lower-left corner `(x, y)`.
    pub fn draw_xobject(&mut self, resource: &str, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        self.draw_form(resource, [width, 0.0, 0.0, height, x, y])
    }

    /// Encode the stream.
    ///
    /// An open text object is closed in the output only; the builder keeps
    /// accepting operators afterwards.
    pub fn build(&self) -> Result<Vec<u8>> {
        self.encode().map_err(|e| Error::RenderWrite(e.to_string()))
    }

    fn encode(&self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        for op in &self.operations {
            op.encode(&mut buf)?;
            buf.push(b'\n');
        }
        if self.in_text_object {
            ContentStreamOp::EndText.encode(&mut buf)?;
            buf.push(b'\n');
        }
        Ok(buf)
    }
}
