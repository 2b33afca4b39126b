//! Layout items.
//!
//! An [`Item`] describes one thing to draw at an absolute position. Items
//! travel as flat JSON records ([`RawItem`]) whose integer `type` field
//! selects the variant:
//!
//! | `type` | variant             |
//! |--------|---------------------|
//! | 0      | [`Item::Text`]      |
//! | 1      | [`Item::BarCode`]   |
//! | 2      | [`Item::QrCode`]    |
//! | 3      | [`Item::Line`]      |
//! | 4      | [`Item::Grid`]      |
//! | 5      | [`Item::Table`]     |
//!
//! Coordinates are in points with the origin at the top-left corner of the
//! page, `top` growing downwards.

use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// One table data row: column key -> cell text.
pub type Row = BTreeMap<String, String>;

/// A table column: header title, width and the row key it displays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableColumn {
    /// Column width in points
    pub width: i32,
    /// Header text
    pub title: String,
    /// Key looked up in each data row
    pub key: String,
}

impl TableColumn {
    /// Create a column.
    pub fn new(width: i32, title: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            width,
            title: title.into(),
            key: key.into(),
        }
    }
}

/// A drawable layout item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawItem", into = "RawItem")]
pub enum Item {
    /// Single line of text; `top` is the top of the line
    Text {
        /// Left edge
        left: f32,
        /// Top edge
        top: f32,
        /// Font size in points
        size: u32,
        /// Text content
        text: String,
    },
    /// Code 128 barcode occupying `width` x `height`
    BarCode {
        /// Left edge
        left: f32,
        /// Top edge
        top: f32,
        /// Width in points
        width: i32,
        /// Height in points
        height: i32,
        /// Encoded data
        text: String,
    },
    /// Square QR code with side `size`
    QrCode {
        /// Left edge
        left: f32,
        /// Top edge
        top: f32,
        /// Side length in points
        size: u32,
        /// Encoded data
        text: String,
    },
    /// Segment from `(left, top)` to `(left + width, top + height)`
    Line {
        /// Start x
        left: f32,
        /// Start y
        top: f32,
        /// Horizontal extent
        width: f32,
        /// Vertical extent
        height: f32,
    },
    /// Uniform grid of `row` x `column` cells
    Grid {
        /// Left edge
        left: f32,
        /// Top edge
        top: f32,
        /// Grid width
        width: i32,
        /// Grid height
        height: i32,
        /// Number of rows
        row: u32,
        /// Number of columns
        column: u32,
    },
    /// Header band plus one band per data row, every band `height` tall
    Table {
        /// Left edge
        left: f32,
        /// Top edge
        top: f32,
        /// Row height
        height: i32,
        /// Column definitions, left to right
        columns: Vec<TableColumn>,
        /// Data rows, top to bottom
        data: Vec<Row>,
    },
}

impl Item {
    /// Wire `type` code of this item.
    pub fn type_code(&self) -> u8 {
        match self {
            Item::Text { .. } => 0,
            Item::BarCode { .. } => 1,
            Item::QrCode { .. } => 2,
            Item::Line { .. } => 3,
            Item::Grid { .. } => 4,
            Item::Table { .. } => 5,
        }
    }

    /// Create a text item.
    pub fn text(left: f32, top: f32, size: u32, text: impl Into<String>) -> Self {
        Item::Text {
            left,
            top,
            size,
            text: text.into(),
        }
    }

    /// Create a line item.
    pub fn line(left: f32, top: f32, width: f32, height: f32) -> Self {
        Item::Line {
            left,
            top,
            width,
            height,
        }
    }
}

/// Flat JSON record used to transport items.
///
/// Every field is optional; fields the selected type does not use are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawItem {
    /// Item type code
    #[serde(rename = "type")]
    pub kind: u8,
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Font size (text) or side length (QR)
    pub size: u32,
    /// Width
    pub width: f64,
    /// Height, the row height for tables
    pub height: f64,
    /// Text or encoded data
    pub text: String,
    /// Grid column count
    pub column: u32,
    /// Grid row count
    pub row: u32,
    /// Table columns
    pub table_column: Vec<TableColumn>,
    /// Table rows
    pub table_data: Vec<Row>,
}

/// Error for a wire record whose `type` code names no item kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown item type {0}")]
pub struct UnknownItemType(pub u8);

impl TryFrom<RawItem> for Item {
    type Error = UnknownItemType;

    fn try_from(raw: RawItem) -> std::result::Result<Self, Self::Error> {
        let RawItem {
            kind,
            left,
            top,
            size,
            width,
            height,
            text,
            column,
            row,
            table_column,
            table_data,
        } = raw;

        Ok(match kind {
            0 => Item::Text {
                left,
                top,
                size,
                text,
            },
            1 => Item::BarCode {
                left,
                top,
                width: width as i32,
                height: height as i32,
                text,
            },
            2 => Item::QrCode {
                left,
                top,
                size,
                text,
            },
            3 => Item::Line {
                left,
                top,
                width: width as f32,
                height: height as f32,
            },
            4 => Item::Grid {
                left,
                top,
                width: width as i32,
                height: height as i32,
                row,
                column,
            },
            5 => Item::Table {
                left,
                top,
                height: height as i32,
                columns: table_column,
                data: table_data,
            },
            other => return Err(UnknownItemType(other)),
        })
    }
}

impl From<Item> for RawItem {
    fn from(item: Item) -> Self {
        let kind = item.type_code();
        let raw = RawItem {
            kind,
            ..Default::default()
        };
        match item {
            Item::Text {
                left,
                top,
                size,
                text,
            }
            | Item::QrCode {
                left,
                top,
                size,
                text,
            } => RawItem {
                left,
                top,
                size,
                text,
                ..raw
            },
            Item::BarCode {
                left,
                top,
                width,
                height,
                text,
            } => RawItem {
                left,
                top,
                width: width as f64,
                height: height as f64,
                text,
                ..raw
            },
            Item::Line {
                left,
                top,
                width,
                height,
            } => RawItem {
                left,
                top,
                width: width as f64,
                height: height as f64,
                ..raw
            },
            Item::Grid {
                left,
                top,
                width,
                height,
                row,
                column,
            } => RawItem {
                left,
                top,
                width: width as f64,
                height: height as f64,
                row,
                column,
                ..raw
            },
            Item::Table {
                left,
                top,
                height,
                columns,
                data,
            } => RawItem {
                left,
                top,
                height: height as f64,
                table_column: columns,
                table_data: data,
                ..raw
            },
        }
    }
}

fn keep_known(raw: Vec<RawItem>) -> Vec<Item> {
    raw.into_iter()
        .filter_map(|record| match Item::try_from(record) {
            Ok(item) => Some(item),
            Err(e) => {
                log::debug!("Skipping item: {}", e);
                None
            },
        })
        .collect()
}

/// Decode a JSON array of wire records, skipping unknown item types.
pub fn decode_items(json: &str) -> Result<Vec<Item>> {
    let raw: Vec<RawItem> = serde_json::from_str(json)?;
    Ok(keep_known(raw))
}

/// Serde helper decoding an item list with the same leniency as [`decode_items`].
pub fn deserialize_items<'de, D>(deserializer: D) -> std::result::Result<Vec<Item>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<RawItem>::deserialize(deserializer).map(keep_known)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_all_kinds() {
        let json = r#"[
            {"type": 0, "left": 10, "top": 20, "size": 12, "text": "hello"},
            {"type": 1, "left": 1, "top": 2, "width": 200, "height": 50, "text": "A-1"},
            {"type": 2, "left": 3, "top": 4, "size": 80, "text": "qr"},
            {"type": 3, "left": 0, "top": 100, "width": 500, "height": 0},
            {"type": 4, "left": 5, "top": 6, "width": 90, "height": 60, "row": 3, "column": 2},
            {"type": 5, "left": 0, "top": 0, "height": 20,
             "tableColumn": [{"width": 50, "title": "A", "key": "a"}],
             "tableData": [{"a": "1"}]}
        ]"#;

        let items = decode_items(json).unwrap();
        assert_eq!(items.len(), 6);
        assert_eq!(items[0], Item::text(10.0, 20.0, 12, "hello"));
        assert_eq!(
            items[1],
            Item::BarCode {
                left: 1.0,
                top: 2.0,
                width: 200,
                height: 50,
                text: "A-1".to_string()
            }
        );
        assert_eq!(items[3], Item::line(0.0, 100.0, 500.0, 0.0));
        assert_eq!(
            items[4],
            Item::Grid {
                left: 5.0,
                top: 6.0,
                width: 90,
                height: 60,
                row: 3,
                column: 2
            }
        );
        match &items[5] {
            Item::Table {
                height,
                columns,
                data,
                ..
            } => {
                assert_eq!(*height, 20);
                assert_eq!(columns, &vec![TableColumn::new(50, "A", "a")]);
                assert_eq!(data[0].get("a").map(String::as_str), Some("1"));
            },
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_fields_default() {
        let items = decode_items(r#"[{"type": 0}]"#).unwrap();
        assert_eq!(items, vec![Item::text(0.0, 0.0, 0, "")]);
    }

    #[test]
    fn test_unknown_type_skipped() {
        let items = decode_items(r#"[{"type": 9, "text": "?"}, {"type": 3, "width": 10}]"#).unwrap();
        assert_eq!(items, vec![Item::line(0.0, 0.0, 10.0, 0.0)]);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(decode_items("[{").is_err());
        assert!(decode_items(r#"{"type": 0}"#).is_err());
    }

    #[test]
    fn test_strict_item_rejects_unknown_type() {
        let err = serde_json::from_str::<Item>(r#"{"type": 42}"#).unwrap_err();
        assert!(err.to_string().contains("unknown item type 42"));
    }

    #[test]
    fn test_negative_line_extent_kept() {
        let items = decode_items(r#"[{"type": 3, "left": 50, "top": 50, "width": -20, "height": 30}]"#)
            .unwrap();
        assert_eq!(items[0], Item::line(50.0, 50.0, -20.0, 30.0));
    }

    #[test]
    fn test_negative_sizes_pass_through() {
        let json = r#"[
            {"type": 1, "width": -200, "height": -50, "text": "A"},
            {"type": 4, "left": 5, "top": 6, "width": -60, "height": -30, "row": 2, "column": 2},
            {"type": 5, "height": -20, "tableColumn": [{"width": -50, "title": "A", "key": "a"}]}
        ]"#;
        let items = decode_items(json).unwrap();
        assert_eq!(
            items[0],
            Item::BarCode {
                left: 0.0,
                top: 0.0,
                width: -200,
                height: -50,
                text: "A".to_string()
            }
        );
        assert_eq!(
            items[1],
            Item::Grid {
                left: 5.0,
                top: 6.0,
                width: -60,
                height: -30,
                row: 2,
                column: 2
            }
        );
        assert_eq!(
            items[2],
            Item::Table {
                left: 0.0,
                top: 0.0,
                height: -20,
                columns: vec![TableColumn::new(-50, "A", "a")],
                data: Vec::new(),
            }
        );
    }

    #[test]
    fn test_fractional_line_round_trips() {
        let line = Item::line(10.0, 10.0, 100.5, 0.25);
        let json = serde_json::to_string(&line).unwrap();
        let back: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(back, line);
        assert_eq!(decode_items(&format!("[{}]", json)).unwrap(), vec![line]);
    }

    #[test]
    fn test_serialize_uses_wire_record() {
        let json = serde_json::to_value(Item::text(1.0, 2.0, 9, "x")).unwrap();
        assert_eq!(json["type"], 0);
        assert_eq!(json["size"], 9);
        assert_eq!(json["text"], "x");
        assert_eq!(json["tableColumn"], serde_json::json!([]));
    }

    #[test]
    fn test_wire_record_preserves_table() {
        let table = Item::Table {
            left: 0.0,
            top: 0.0,
            height: 20,
            columns: vec![TableColumn::new(50, "A", "a"), TableColumn::new(50, "B", "b")],
            data: vec![Row::from([("a".to_string(), "1".to_string())])],
        };
        let json = serde_json::to_string(&table).unwrap();
        let back: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
