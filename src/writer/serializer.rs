//! PDF file serialization.
//!
//! [`PdfSerializer`] lays out a classic PDF file: header, indirect objects,
//! a cross-reference table and the trailer. Object syntax follows
//! ISO 32000-1:2008, Section 7.3; the file structure Section 7.5.

use crate::object::{Dict, Object};
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Comment line after the header marking the file as binary.
const BINARY_MARKER: &[u8] = b"%\xE2\xE3\xCF\xD3\n";

/// Writes a complete PDF file into memory.
#[derive(Debug)]
pub struct PdfSerializer {
    out: Vec<u8>,
    offsets: BTreeMap<u32, usize>,
}

impl PdfSerializer {
    /// Start a file with the `%PDF-{version}` header.
    pub fn new(version: &str) -> io::Result<Self> {
        let mut out = Vec::new();
        writeln!(out, "%PDF-{}", version)?;
        out.extend_from_slice(BINARY_MARKER);
        Ok(Self {
            out,
            offsets: BTreeMap::new(),
        })
    }

    /// Write indirect object `id` (generation 0) and remember its offset.
    pub fn write_indirect(&mut self, id: u32, obj: &Object) -> io::Result<()> {
        self.offsets.insert(id, self.out.len());
        writeln!(self.out, "{} 0 obj", id)?;
        write_object(&mut self.out, obj)?;
        self.out.extend_from_slice(b"\nendobj\n");
        Ok(())
    }

    /// Write the xref table and trailer and return the file bytes.
    ///
    /// `size` is one past the highest object number; numbers that were
    /// never written are listed as free.
    pub fn finish(mut self, size: u32, trailer: Dict) -> io::Result<Vec<u8>> {
        let xref_start = self.out.len();
        writeln!(self.out, "xref\n0 {}", size)?;
        writeln!(self.out, "0000000000 65535 f ")?;
        for id in 1..size {
            match self.offsets.get(&id) {
                Some(offset) => writeln!(self.out, "{:010} 00000 n ", offset)?,
                None => writeln!(self.out, "0000000000 00001 f ")?,
            }
        }

        let mut trailer = trailer;
        trailer.insert("Size".to_string(), Object::Integer(size as i64));
        writeln!(self.out, "trailer")?;
        write_dict(&mut self.out, &trailer)?;
        write!(self.out, "\nstartxref\n{}\n%%EOF", xref_start)?;
        Ok(self.out)
    }
}

/// Write a direct object.
pub fn write_object<W: Write>(w: &mut W, obj: &Object) -> io::Result<()> {
    match obj {
        Object::Null => w.write_all(b"null"),
        Object::Boolean(b) => write!(w, "{}", b),
        Object::Integer(i) => write!(w, "{}", i),
        Object::Real(r) => write_real(w, *r),
        Object::String(s) => write_string(w, s),
        Object::Name(n) => write_name(w, n),
        Object::Array(items) => {
            w.write_all(b"[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    w.write_all(b" ")?;
                }
                write_object(w, item)?;
            }
            w.write_all(b"]")
        },
        Object::Dictionary(dict) => write_dict(w, dict),
        Object::Stream { dict, data } => {
            // Length always matches the bytes written
            let mut dict = dict.clone();
            dict.insert("Length".to_string(), Object::Integer(data.len() as i64));
            write_dict(w, &dict)?;
            w.write_all(b"\nstream\n")?;
            w.write_all(data)?;
            w.write_all(b"\nendstream")
        },
        Object::Reference(r) => write!(w, "{}", r),
    }
}

/// Render a direct object as text.
pub fn to_text(obj: &Object) -> String {
    let mut buf = Vec::new();
    match write_object(&mut buf, obj) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(e) => format!("<{}>", e),
    }
}

fn write_dict<W: Write>(w: &mut W, dict: &Dict) -> io::Result<()> {
    w.write_all(b"<<")?;
    for (i, (key, value)) in dict.iter().enumerate() {
        if i > 0 {
            w.write_all(b" ")?;
        }
        write_name(w, key)?;
        w.write_all(b" ")?;
        write_object(w, value)?;
    }
    w.write_all(b">>")
}

/// Printable ASCII goes out as a literal `(...)`, anything else as hex.
fn write_string<W: Write>(w: &mut W, data: &[u8]) -> io::Result<()> {
    let printable = data
        .iter()
        .all(|&b| matches!(b, b'\n' | b'\r' | b'\t' | 0x20..=0x7E));
    if printable {
        w.write_all(b"(")?;
        write_escaped(w, data)?;
        w.write_all(b")")
    } else {
        w.write_all(b"<")?;
        for byte in data {
            write!(w, "{:02X}", byte)?;
        }
        w.write_all(b">")
    }
}

/// Regular characters pass through; delimiters, whitespace, `#` and
/// non-ASCII bytes are written as `#xx`.
fn write_name<W: Write>(w: &mut W, name: &str) -> io::Result<()> {
    w.write_all(b"/")?;
    for byte in name.bytes() {
        let delimiter = matches!(
            byte,
            b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%' | b'#'
        );
        if delimiter || !(0x21..=0x7E).contains(&byte) {
            write!(w, "#{:02X}", byte)?;
        } else {
            w.write_all(&[byte])?;
        }
    }
    Ok(())
}

/// Write a real number with at most five decimals and no trailing zeros.
pub(crate) fn write_real<W: Write>(w: &mut W, value: f64) -> io::Result<()> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        return write!(w, "{}", value as i64);
    }
    let formatted = format!("{:.5}", value);
    match formatted.trim_end_matches('0').trim_end_matches('.') {
        "-0" => w.write_all(b"0"),
        trimmed => w.write_all(trimmed.as_bytes()),
    }
}

/// Escape the bytes of a literal string body.
pub(crate) fn write_escaped<W: Write>(w: &mut W, data: &[u8]) -> io::Result<()> {
    for &byte in data {
        let escaped: &[u8] = match byte {
            b'(' => b"\\(",
            b')' => b"\\)",
            b'\\' => b"\\\\",
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\t' => b"\\t",
            _ => {
                w.write_all(&[byte])?;
                continue;
            },
        };
        w.write_all(escaped)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{dict, ObjectRef};

    #[test]
    fn test_scalars() {
        assert_eq!(to_text(&Object::Null), "null");
        assert_eq!(to_text(&Object::Boolean(true)), "true");
        assert_eq!(to_text(&Object::Integer(-123)), "-123");
        assert_eq!(to_text(&Object::Reference(ObjectRef::new(7, 0))), "7 0 R");
    }

    #[test]
    fn test_reals() {
        assert_eq!(to_text(&Object::Real(841.89)), "841.89");
        assert_eq!(to_text(&Object::Real(1.0)), "1");
        assert_eq!(to_text(&Object::Real(0.5)), "0.5");
        assert_eq!(to_text(&Object::Real(-0.000001)), "0");
    }

    #[test]
    fn test_strings() {
        assert_eq!(to_text(&Object::text("Hello")), "(Hello)");
        assert_eq!(to_text(&Object::text("Test (parens)")), "(Test \\(parens\\))");
        assert_eq!(to_text(&Object::String(vec![0x00, 0xFF, 0x80])), "<00FF80>");
    }

    #[test]
    fn test_names_escape_delimiters() {
        assert_eq!(to_text(&Object::name("Identity-H")), "/Identity-H");
        assert_eq!(to_text(&Object::name("Name With Space")), "/Name#20With#20Space");
        assert_eq!(to_text(&Object::name("A<B>")), "/A#3CB#3E");
    }

    #[test]
    fn test_dictionary_is_compact_and_sorted() {
        let page = Object::dictionary([("Type", Object::name("Page")), ("Count", Object::Integer(1))]);
        assert_eq!(to_text(&page), "<</Count 1 /Type /Page>>");
        assert_eq!(to_text(&Object::Dictionary(Dict::new())), "<<>>");
    }

    #[test]
    fn test_stream_length_overrides_dictionary() {
        let stream = Object::stream(
            dict([("Length", Object::Reference(ObjectRef::new(9, 0)))]),
            &b"stream data"[..],
        );
        let text = to_text(&stream);
        assert!(text.starts_with("<</Length 11>>"));
        assert!(!text.contains("9 0 R"));
        assert!(text.ends_with("stream\nstream data\nendstream"));
    }

    #[test]
    fn test_file_layout() {
        let mut serializer = PdfSerializer::new("1.7").unwrap();
        serializer.write_indirect(1, &Object::Integer(42)).unwrap();
        serializer.write_indirect(3, &Object::Null).unwrap();
        let bytes = serializer
            .finish(4, dict([("Root", Object::Reference(ObjectRef::new(1, 0)))]))
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);

        assert!(bytes.starts_with(b"%PDF-1.7\n%"));
        assert!(text.contains("1 0 obj\n42\nendobj\n"));
        // Object 2 was never written
        assert!(text.contains("xref\n0 4\n0000000000 65535 f \n0000000015 00000 n \n0000000000 00001 f \n"));
        assert!(text.contains("trailer\n<</Root 1 0 R /Size 4>>\nstartxref\n"));
        assert!(text.ends_with("%%EOF"));
    }
}
