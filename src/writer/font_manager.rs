//! Font management for PDF generation.
//!
//! A document uses exactly one font, registered on every page as `/F1`.
//!
//! # Embedded Fonts
//!
//! TrueType fonts are embedded whole. Per ISO 32000-1:2008, Sections 9.6-9.9, they use:
//! - CIDFont (Type 2) for TrueType fonts
//! - Identity-H encoding for Unicode
//! - ToUnicode CMap for text extraction
//!
//! # Standard Fonts
//!
//! The PDF Base-14 fonts need no embedding and use WinAnsiEncoding, so only
//! Latin-1 text renders; other characters are replaced by `?`.

use super::pdf_writer::ObjectTable;
use crate::error::{Error, Result};
use crate::object::{dict, Object, ObjectRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use ttf_parser::{Face, GlyphId};

/// Resource name of the document font in every page's `/Font` dictionary.
pub const FONT_RESOURCE: &str = "F1";

const BASE14_FONTS: [&str; 14] = [
    "Helvetica",
    "Helvetica-Bold",
    "Helvetica-Oblique",
    "Helvetica-BoldOblique",
    "Times-Roman",
    "Times-Bold",
    "Times-Italic",
    "Times-BoldItalic",
    "Courier",
    "Courier-Bold",
    "Courier-Oblique",
    "Courier-BoldOblique",
    "Symbol",
    "ZapfDingbats",
];

/// Where the document font comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FontSource {
    /// One of the PDF Base-14 fonts, by PostScript name
    Standard(String),
    /// A TrueType font file to embed
    TrueType(PathBuf),
}

impl Default for FontSource {
    fn default() -> Self {
        FontSource::Standard("Helvetica".to_string())
    }
}

/// Text encoded for a `Tj` operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedText {
    /// Single-byte codes for a literal string
    Literal(Vec<u8>),
    /// Hex string of 2-byte glyph IDs, including the angle brackets
    Hex(String),
}

/// The loaded document font.
#[derive(Debug)]
pub enum PdfFont {
    /// Base-14 font
    Standard(StandardFont),
    /// Embedded TrueType font
    Embedded(EmbeddedFont),
}

impl PdfFont {
    /// Load the font described by `source`.
    pub fn load(source: &FontSource) -> Result<Self> {
        match source {
            FontSource::Standard(name) => Ok(PdfFont::Standard(StandardFont::new(name)?)),
            FontSource::TrueType(path) => Ok(PdfFont::Embedded(EmbeddedFont::from_file(path)?)),
        }
    }

    /// Ascent in 1/1000 em, used to place the baseline below an item's top.
    pub fn ascent(&self) -> f32 {
        match self {
            PdfFont::Standard(font) => font.ascent(),
            PdfFont::Embedded(font) => font.ascender as f32,
        }
    }

    /// Encode text for the content stream, recording glyph usage.
    pub fn encode(&mut self, text: &str) -> Result<EncodedText> {
        match self {
            PdfFont::Standard(_) => Ok(EncodedText::Literal(encode_win_ansi(text))),
            PdfFont::Embedded(font) => Ok(EncodedText::Hex(font.encode_string(text)?)),
        }
    }

    /// Write the font dictionary (and its dependents) into the object table.
    pub fn write_objects(&self, objects: &mut ObjectTable) -> ObjectRef {
        match self {
            PdfFont::Standard(font) => font.write_objects(objects),
            PdfFont::Embedded(font) => font.write_objects(objects),
        }
    }
}

/// A PDF Base-14 font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardFont {
    name: String,
}

impl StandardFont {
    /// Select a Base-14 font by PostScript name.
    pub fn new(name: &str) -> Result<Self> {
        if !BASE14_FONTS.contains(&name) {
            return Err(Error::FontLoad(format!("{} is not a standard PDF font", name)));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    /// PostScript name of the font.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ascender in 1/1000 em.
    pub fn ascent(&self) -> f32 {
        match self.name.as_str() {
            "Helvetica" | "Helvetica-Oblique" | "Helvetica-Bold" | "Helvetica-BoldOblique" => 718.0,
            "Times-Roman" | "Times-Italic" => 683.0,
            "Times-Bold" | "Times-BoldItalic" => 676.0,
            "Courier" | "Courier-Oblique" => 629.0,
            "Courier-Bold" | "Courier-BoldOblique" => 626.0,
            _ => 750.0,
        }
    }

    fn write_objects(&self, objects: &mut ObjectTable) -> ObjectRef {
        let mut entries = vec![
            ("Type", Object::name("Font")),
            ("Subtype", Object::name("Type1")),
            ("BaseFont", Object::name(&self.name)),
        ];
        // Symbol and ZapfDingbats use their built-in encodings
        if !matches!(self.name.as_str(), "Symbol" | "ZapfDingbats") {
            entries.push(("Encoding", Object::name("WinAnsiEncoding")));
        }
        objects.add(Object::dictionary(entries))
    }
}

/// Map text to WinAnsiEncoding bytes, replacing unmappable characters with `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            ' '..='~' | '\u{A0}'..='\u{FF}' => ch as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}

/// Embedded TrueType font for PDF generation.
///
/// Tracks every glyph used so the `/W` array and ToUnicode CMap cover
/// exactly the text that was drawn.
#[derive(Debug)]
pub struct EmbeddedFont {
    /// Font name (PostScript name or user-provided)
    pub name: String,
    /// Raw font data (for embedding)
    font_data: Vec<u8>,
    /// Used glyphs: GID -> (first character mapped to it, width in 1/1000 em)
    used_glyphs: BTreeMap<u16, (char, u16)>,
    /// Font ascender value (1/1000 em)
    pub ascender: i32,
    /// Font descender value (1/1000 em)
    pub descender: i32,
    /// Cap height (1/1000 em)
    pub cap_height: i32,
    /// Font bounding box (llx, lly, urx, ury) in 1/1000 em
    pub bbox: (i32, i32, i32, i32),
    /// Font flags for PDF
    pub flags: u32,
    /// Stem vertical width
    pub stem_v: i16,
    units_per_em: u16,
}

impl EmbeddedFont {
    /// Create an embedded font from raw TTF/OTF data.
    ///
    /// # Arguments
    /// * `name` - Font name to use (if None, uses PostScript name from font)
    /// * `data` - Raw TTF/OTF file data
    pub fn from_data(name: Option<String>, data: Vec<u8>) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::FontLoad("Font data is empty".to_string()));
        }

        let face = Face::parse(&data, 0)
            .map_err(|e| Error::FontLoad(format!("Failed to parse font: {}", e)))?;

        let font_name = name
            .or_else(|| {
                face.names()
                    .into_iter()
                    .find(|name| name.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
                    .and_then(|name| name.to_string())
            })
            .unwrap_or_else(|| "Unknown".to_string());

        let units_per_em = face.units_per_em().max(1);
        let to_pdf = |v: i16| v as i32 * 1000 / units_per_em as i32;

        let bbox = face.global_bounding_box();

        let mut flags = 1 << 5; // Nonsymbolic
        if face.is_monospaced() {
            flags |= 1;
        }
        if face.is_italic() {
            flags |= 1 << 6;
        }

        let mut embedded = Self {
            name: font_name,
            font_data: Vec::new(),
            used_glyphs: BTreeMap::new(),
            ascender: to_pdf(face.ascender()),
            descender: to_pdf(face.descender()),
            cap_height: to_pdf(face.capital_height().unwrap_or(face.ascender())),
            bbox: (
                to_pdf(bbox.x_min),
                to_pdf(bbox.y_min),
                to_pdf(bbox.x_max),
                to_pdf(bbox.y_max),
            ),
            flags,
            stem_v: if face.is_bold() { 140 } else { 80 },
            units_per_em,
        };

        log::debug!("Loaded TrueType font {} ({} bytes)", embedded.name, data.len());
        embedded.font_data = data;

        Ok(embedded)
    }

    /// Load an embedded font from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            Error::FontLoad(format!("Failed to read font file {}: {}", path.display(), e))
        })?;
        Self::from_data(None, data)
    }

    /// Encode a string for use in PDF content stream (Identity-H encoding).
    ///
    /// Returns a hex string like "<00410042>" where each 4-digit hex is a glyph ID.
    /// Characters the font lacks map to glyph 0 (.notdef).
    pub fn encode_string(&mut self, text: &str) -> Result<String> {
        let face = Face::parse(&self.font_data, 0)
            .map_err(|e| Error::FontLoad(format!("Failed to parse font: {}", e)))?;

        let mut hex = String::with_capacity(text.len() * 4 + 2);
        hex.push('<');
        for ch in text.chars() {
            let gid = face.glyph_index(ch).map(|g| g.0).unwrap_or(0);
            let advance = face.glyph_hor_advance(GlyphId(gid)).unwrap_or(0);
            let width = (advance as u32 * 1000 / self.units_per_em as u32) as u16;
            self.used_glyphs.entry(gid).or_insert((ch, width));
            hex.push_str(&format!("{:04X}", gid));
        }
        hex.push('>');
        Ok(hex)
    }

    /// Get the raw font data for embedding.
    pub fn font_data(&self) -> &[u8] {
        &self.font_data
    }

    /// Check if any text has been drawn with this font.
    pub fn is_used(&self) -> bool {
        !self.used_glyphs.is_empty()
    }

    /// Generate the CID widths array for the W entry.
    ///
    /// Format: `[start [w1 w2 ...] start2 [w1 w2 ...] ...]` with runs of
    /// consecutive glyph IDs grouped together.
    pub fn generate_widths_array(&self) -> Object {
        let mut result = Vec::new();
        let mut run: Option<(u16, u16, Vec<Object>)> = None;

        for (&gid, &(_, width)) in &self.used_glyphs {
            match run.as_mut() {
                Some((_, last, widths)) if gid == *last + 1 => {
                    *last = gid;
                    widths.push(Object::Integer(width as i64));
                },
                _ => {
                    if let Some((start, _, widths)) = run.take() {
                        result.push(Object::Integer(start as i64));
                        result.push(Object::Array(widths));
                    }
                    run = Some((gid, gid, vec![Object::Integer(width as i64)]));
                },
            }
        }
        if let Some((start, _, widths)) = run {
            result.push(Object::Integer(start as i64));
            result.push(Object::Array(widths));
        }

        Object::Array(result)
    }

    /// Generate the ToUnicode CMap for text extraction.
    pub fn generate_tounicode_cmap(&self) -> String {
        let mut cmap = String::new();

        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo <<\n");
        cmap.push_str("  /Registry (Adobe)\n");
        cmap.push_str("  /Ordering (UCS)\n");
        cmap.push_str("  /Supplement 0\n");
        cmap.push_str(">> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n");
        cmap.push_str("<0000> <FFFF>\n");
        cmap.push_str("endcodespacerange\n");

        let mappings: Vec<(u16, char)> = self
            .used_glyphs
            .iter()
            .map(|(&gid, &(ch, _))| (gid, ch))
            .collect();

        // At most 100 entries per bfchar section
        for chunk in mappings.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for &(gid, ch) in chunk {
                let mut units = [0u16; 2];
                let utf16: String = ch
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|u| format!("{:04X}", u))
                    .collect();
                cmap.push_str(&format!("<{:04X}> <{}>\n", gid, utf16));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\n");
        cmap.push_str("end\n");

        cmap
    }

    fn write_objects(&self, objects: &mut ObjectTable) -> ObjectRef {
        let font_file = objects.add(Object::stream(
            dict([("Length1", Object::Integer(self.font_data.len() as i64))]),
            self.font_data.clone(),
        ));

        let (llx, lly, urx, ury) = self.bbox;
        let descriptor = objects.add(Object::dictionary([
            ("Type", Object::name("FontDescriptor")),
            ("FontName", Object::name(&self.name)),
            ("Flags", Object::Integer(self.flags as i64)),
            (
                "FontBBox",
                Object::Array(vec![
                    Object::Integer(llx as i64),
                    Object::Integer(lly as i64),
                    Object::Integer(urx as i64),
                    Object::Integer(ury as i64),
                ]),
            ),
            ("ItalicAngle", Object::Integer(0)),
            ("Ascent", Object::Integer(self.ascender as i64)),
            ("Descent", Object::Integer(self.descender as i64)),
            ("CapHeight", Object::Integer(self.cap_height as i64)),
            ("StemV", Object::Integer(self.stem_v as i64)),
            ("FontFile2", Object::Reference(font_file)),
        ]));

        let cid_font = objects.add(Object::dictionary([
            ("Type", Object::name("Font")),
            ("Subtype", Object::name("CIDFontType2")),
            ("BaseFont", Object::name(&self.name)),
            (
                "CIDSystemInfo",
                Object::dictionary([
                    ("Registry", Object::text("Adobe")),
                    ("Ordering", Object::text("Identity")),
                    ("Supplement", Object::Integer(0)),
                ]),
            ),
            ("FontDescriptor", Object::Reference(descriptor)),
            ("CIDToGIDMap", Object::name("Identity")),
            ("DW", Object::Integer(1000)),
            ("W", self.generate_widths_array()),
        ]));

        let to_unicode = objects.add(Object::stream(
            Default::default(),
            self.generate_tounicode_cmap().into_bytes(),
        ));

        objects.add(Object::dictionary([
            ("Type", Object::name("Font")),
            ("Subtype", Object::name("Type0")),
            ("BaseFont", Object::name(&self.name)),
            ("Encoding", Object::name("Identity-H")),
            ("DescendantFonts", Object::Array(vec![Object::Reference(cid_font)])),
            ("ToUnicode", Object::Reference(to_unicode)),
        ]))
    }
}
