//! Shared helpers for integration tests.

#![allow(dead_code)]

use lopdf::{dictionary, Document, Object, Stream};

/// Install a test logger once; repeated calls are ignored.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Re-parse a produced PDF and return each page's content stream as text.
pub fn page_contents(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).expect("output should parse");
    doc.get_pages()
        .values()
        .map(|page_id| {
            let content = doc.get_page_content(*page_id).expect("page content");
            String::from_utf8_lossy(&content).into_owned()
        })
        .collect()
}

/// Names of the XObjects painted by a content stream, in paint order.
pub fn painted_xobjects(content: &str) -> Vec<String> {
    let tokens: Vec<&str> = content.split_whitespace().collect();
    tokens
        .windows(2)
        .filter(|pair| pair[1] == "Do")
        .map(|pair| pair[0].trim_start_matches('/').to_string())
        .collect()
}

/// Decoded content of the XObject `name` on page `page_number` (1-based).
pub fn xobject_content(bytes: &[u8], page_number: u32, name: &str) -> String {
    let doc = Document::load_mem(bytes).expect("output should parse");
    let page_id = doc.get_pages()[&page_number];
    let page = doc.get_dictionary(page_id).unwrap();
    let resources = page.get(b"Resources").and_then(Object::as_dict).unwrap();
    let xobjects = resources.get(b"XObject").and_then(Object::as_dict).unwrap();
    let id = xobjects
        .get(name.as_bytes())
        .and_then(Object::as_reference)
        .unwrap();
    let stream = doc.get_object(id).and_then(Object::as_stream).unwrap();
    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    String::from_utf8_lossy(&data).into_owned()
}

/// Build a template PDF with one page per entry, each showing its text.
///
/// MediaBox and Resources sit on the page tree node so pages inherit them.
pub fn template_pdf(page_texts: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Roman",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "T1" => font_id },
    });

    let mut kids = Vec::new();
    for text in page_texts {
        let content = format!("BT /T1 18 Tf 72 760 Td ({}) Tj ET", text);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}
