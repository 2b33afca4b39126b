//! Integration tests for JSON-described documents.

mod common;

use common::page_contents;
use fastpdf::{decode_items, Error, Item, RenderJob};

const JOB: &str = r#"{
    "config": {"pageSize": "a4", "title": "Packing slip", "lineWidth": 0.5},
    "header": [
        {"type": 0, "left": 40, "top": 30, "size": 14, "text": "PACKING SLIP"},
        {"type": 3, "left": 40, "top": 50, "width": 515, "height": 0}
    ],
    "body": [
        {"type": 1, "left": 40, "top": 70, "width": 220, "height": 50, "text": "ORD-20931"},
        {"type": 2, "left": 455, "top": 60, "size": 100, "text": "ORD-20931"},
        {"type": 4, "left": 40, "top": 200, "width": 90, "height": 60, "row": 3, "column": 2},
        {"type": 5, "left": 40, "top": 300, "height": 20,
         "tableColumn": [
            {"width": 200, "title": "Item", "key": "name"},
            {"width": 60, "title": "Qty", "key": "qty"}
         ],
         "tableData": [
            {"name": "Widget", "qty": "2"},
            {"name": "Gadget"}
         ]},
        {"type": 99, "text": "ignored"}
    ]
}"#;

#[test]
fn test_job_decodes_known_items() {
    let job = RenderJob::from_json(JOB).unwrap();
    assert_eq!(job.header.len(), 2);
    assert_eq!(job.body.len(), 4);
    assert!(job.footer.is_empty());
    assert_eq!(job.config.title.as_deref(), Some("Packing slip"));
    assert_eq!(job.config.line_width, 0.5);
    assert!(matches!(job.body[3], Item::Table { .. }));
}

#[test]
fn test_job_renders() {
    let bytes = RenderJob::from_json(JOB).unwrap().render().unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/Title (Packing slip)"));

    let content = &page_contents(&bytes)[0];
    assert!(content.contains("0.5 w"));
    assert!(content.contains("(PACKING SLIP) Tj"));
    for cell in ["(Item) Tj", "(Qty) Tj", "(Widget) Tj", "(2) Tj", "(Gadget) Tj"] {
        assert!(content.contains(cell), "missing {}", cell);
    }
    // Barcode and QR code
    assert_eq!(content.matches(" Do").count(), 2);
}

#[test]
fn test_item_list_round_trips_through_wire_records() {
    let items = vec![
        Item::text(1.0, 2.0, 10, "a"),
        Item::line(0.0, 0.0, 10.0, -5.0),
        Item::Grid {
            left: 0.0,
            top: 0.0,
            width: 10,
            height: 10,
            row: 1,
            column: 1,
        },
    ];
    let json = serde_json::to_string(&items).unwrap();
    assert_eq!(decode_items(&json).unwrap(), items);
}

#[test]
fn test_malformed_job() {
    assert!(matches!(
        RenderJob::from_json(r#"{"body": [{"type": "text"}]}"#),
        Err(Error::ItemDecode(_))
    ));
}

#[test]
fn test_negative_column_width_renders() {
    let job = r#"{"config": {"pageSize": "letter"},
        "body": [{"type": 5, "left": 100, "top": 10, "height": 20,
        "tableColumn": [{"width": -50, "title": "A", "key": "a"}]}]}"#;
    let bytes = RenderJob::from_json(job).unwrap().render().unwrap();
    let content = &page_contents(&bytes)[0];
    // Header top border runs leftwards from x = 100 to x = 50
    assert!(content.contains("100 782 m\n50 782 l"), "{}", content);
}

#[test]
fn test_oversized_quiet_zone_is_error() {
    let job = r#"{"config": {"qrQuietZone": 3000000000},
        "body": [{"type": 2, "size": 100, "text": "x"}]}"#;
    let err = RenderJob::from_json(job).unwrap().render().unwrap_err();
    assert!(matches!(err, Error::SymbolEncode(_)));
}
