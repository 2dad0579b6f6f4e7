use std::io::{Cursor, Read};

use careletter_core::{ChoiceContext, ClientType, Placeholders, Track, parse, select};
use careletter_renderer::{
    AdviceSummary, Bundle, LetterRenderer, RenderSettings, render_advice_summary, write_docx,
};
use zip::ZipArchive;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn read_entry(bytes: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut xml = String::new();
    entry.read_to_string(&mut xml).unwrap();
    xml
}

fn letter_bytes() -> Vec<u8> {
    let source = "\
[h] Scope of work
[numbering]
We will act for {client_name} & family.
[a] review your papers
[end numbering]
Yours sincerely";
    let parsed = parse(source);
    let context = ChoiceContext::new(ClientType::Individual, false, Track::SmallClaims);
    let elements = select(&parsed.document, &context);
    let settings = RenderSettings::default();
    let placeholders = Placeholders::new().with("client_name", "Jane <Smith>");
    let letter = LetterRenderer::new(&settings, &placeholders).render(&elements);
    write_docx(&letter.document).unwrap()
}

#[test]
fn package_contains_required_parts() {
    let bytes = letter_bytes();
    let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
    let mut names: Vec<&str> = archive.file_names().collect();
    names.sort_unstable();
    assert_eq!(
        names,
        vec![
            "[Content_Types].xml",
            "_rels/.rels",
            "word/_rels/document.xml.rels",
            "word/document.xml",
            "word/styles.xml",
        ]
    );
}

#[test]
fn document_part_is_well_formed_and_ordered() {
    let xml = read_entry(&letter_bytes(), "word/document.xml");
    let doc = roxmltree::Document::parse(&xml).unwrap();

    let paragraphs: Vec<_> = doc
        .descendants()
        .filter(|node| node.has_tag_name((W_NS, "p")))
        .collect();
    assert_eq!(paragraphs.len(), 4);

    let text_of = |node: roxmltree::Node| -> String {
        node.descendants()
            .filter(|n| n.has_tag_name((W_NS, "t")))
            .filter_map(|n| n.text())
            .collect()
    };
    assert_eq!(text_of(paragraphs[0]), "Scope of work");
    assert_eq!(text_of(paragraphs[1]), "1.We will act for Jane <Smith> & family.");
    assert_eq!(text_of(paragraphs[2]), "(a)review your papers");

    let tabs = paragraphs[1]
        .descendants()
        .filter(|n| n.has_tag_name((W_NS, "tab")) && n.parent().is_some_and(|p| p.has_tag_name((W_NS, "r"))))
        .count();
    assert_eq!(tabs, 1);

    let ind = paragraphs[1]
        .descendants()
        .find(|n| n.has_tag_name((W_NS, "ind")))
        .unwrap();
    assert_eq!(ind.attribute((W_NS, "left")), Some("425"));
    assert_eq!(ind.attribute((W_NS, "hanging")), Some("425"));

    let heading_run = paragraphs[0]
        .descendants()
        .find(|n| n.has_tag_name((W_NS, "rPr")))
        .unwrap();
    assert!(heading_run.children().any(|n| n.has_tag_name((W_NS, "b"))));
    assert!(heading_run.children().any(|n| n.has_tag_name((W_NS, "u"))));

    let body = doc
        .descendants()
        .find(|n| n.has_tag_name((W_NS, "body")))
        .unwrap();
    let last = body.children().filter(|n| n.is_element()).last().unwrap();
    assert!(last.has_tag_name((W_NS, "sectPr")));
}

#[test]
fn styles_part_carries_document_font() {
    let xml = read_entry(&letter_bytes(), "word/styles.xml");
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let fonts = doc
        .descendants()
        .find(|n| n.has_tag_name((W_NS, "rFonts")))
        .unwrap();
    assert_eq!(fonts.attribute((W_NS, "ascii")), Some("Arial"));
    let size = doc
        .descendants()
        .find(|n| n.has_tag_name((W_NS, "sz")))
        .unwrap();
    assert_eq!(size.attribute((W_NS, "val")), Some("22"));
}

#[test]
fn summary_table_ends_with_paragraph_before_section() {
    let summary = AdviceSummary {
        client_name: "Acme Ltd".to_string(),
        our_ref: "AC/9".to_string(),
        date: "15 October 2026".to_string(),
        method: "Video call".to_string(),
        content: "Limitation explained.".to_string(),
    };
    let document = render_advice_summary(&summary, &RenderSettings::default());
    let xml = read_entry(&write_docx(&document).unwrap(), "word/document.xml");
    let doc = roxmltree::Document::parse(&xml).unwrap();

    let rows = doc
        .descendants()
        .filter(|n| n.has_tag_name((W_NS, "tr")))
        .count();
    assert_eq!(rows, 3);
    for cell in doc.descendants().filter(|n| n.has_tag_name((W_NS, "tc"))) {
        assert!(cell.children().any(|n| n.has_tag_name((W_NS, "p"))));
    }

    let body = doc
        .descendants()
        .find(|n| n.has_tag_name((W_NS, "body")))
        .unwrap();
    let blocks: Vec<_> = body.children().filter(|n| n.is_element()).collect();
    let count = blocks.len();
    assert!(blocks[count - 3].has_tag_name((W_NS, "tbl")));
    assert!(blocks[count - 2].has_tag_name((W_NS, "p")));
}

#[test]
fn bundle_holds_both_documents() {
    let letter = letter_bytes();
    let mut bundle = Bundle::new();
    bundle.add("Client_Care_Letter_Jane_Smith.docx", &letter).unwrap();
    bundle
        .add("Initial_Advice_Summary_Jane_Smith.docx", b"summary")
        .unwrap();
    let bytes = bundle.finish().unwrap();

    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 2);
    let mut inner = Vec::new();
    archive
        .by_name("Client_Care_Letter_Jane_Smith.docx")
        .unwrap()
        .read_to_end(&mut inner)
        .unwrap();
    assert_eq!(inner, letter);
}
