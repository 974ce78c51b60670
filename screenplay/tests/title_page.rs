use screenplay::parser::source::split_lines;
use screenplay::title_page::{FieldValue, TITLE_PAGE_KEYS, TitlePageScan, recognize_key, scan};

fn scan_source(source: &str) -> TitlePageScan {
    scan(&split_lines(source))
}

#[test]
fn key_matching() {
    assert_eq!(recognize_key("Title"), Some("title"));
    assert_eq!(recognize_key("WRITTEN   BY"), Some("written by"));
    assert_eq!(recognize_key("Draft#"), Some("draft #"));
    assert_eq!(recognize_key("draft date"), Some("draft date"));
    assert_eq!(recognize_key("Producer"), None);
    assert_eq!(recognize_key(""), None);
}

#[test]
fn every_listed_key_is_recognized() {
    for key in TITLE_PAGE_KEYS {
        assert_eq!(recognize_key(&key.to_uppercase()), Some(*key));
    }
}

#[test]
fn fields_and_continuations() {
    let TitlePageScan::Found { page, consumed } =
        scan_source("Title: Night Shift\nContact:\n    Jane Doe\n    555-0100\n===\nINT. ROOM\n")
    else {
        panic!("expected a title page");
    };
    assert_eq!(consumed, 5);
    assert_eq!((page.start_line, page.end_line), (0, 4));
    assert_eq!(page.fields.len(), 2);
    assert_eq!(
        page.get("contact"),
        Some(&FieldValue::Lines(vec![
            "Jane Doe".to_string(),
            "555-0100".to_string()
        ]))
    );
    assert_eq!(
        page.get("TITLE"),
        Some(&FieldValue::Single("Night Shift".to_string()))
    );
    assert_eq!(page.get("author"), None);
}

#[test]
fn leading_blank_lines_are_skipped() {
    let TitlePageScan::Found { page, consumed } = scan_source("\n\nTitle: X\n===\n") else {
        panic!("expected a title page");
    };
    assert_eq!(page.start_line, 2);
    assert_eq!(consumed, 4);
}

#[test]
fn unknown_key_aborts() {
    assert_eq!(
        scan_source("Title: X\nProducer: Y\n===\n"),
        TitlePageScan::Unterminated { line: 0 }
    );
}

#[test]
fn blank_line_aborts() {
    assert_eq!(
        scan_source("Title: X\n\n===\n"),
        TitlePageScan::Unterminated { line: 0 }
    );
}

#[test]
fn absent_title_page() {
    assert_eq!(scan_source(""), TitlePageScan::Absent);
    assert_eq!(scan_source("INT. ROOM - DAY\n"), TitlePageScan::Absent);
    assert_eq!(scan_source("===\nText\n"), TitlePageScan::Absent);
}

#[test]
fn title_page_block_markup() {
    let TitlePageScan::Found { page, .. } = scan_source("Title: <Noir> & Co\n===\n") else {
        panic!("expected a title page");
    };
    let block = page.to_block();
    assert_eq!(block.id, "line-0");
    assert!(block.kind.is_markup());
    assert!(block.text.contains("&lt;Noir&gt; &amp; Co"));
}
