use super::*;
use crate::model::action::Action;

fn doc_with_pages(n: usize) -> ConfigDocument {
    let mut doc = ConfigDocument::default();
    for _ in 0..n {
        doc.pages.push(Page::with_tiles(doc.tile_count()));
    }
    doc
}

#[test]
fn fresh_document_is_valid() {
    let doc = ConfigDocument::default();
    assert_eq!(doc.tile_count(), 6);
    assert_eq!(doc.brightness, DEFAULT_BRIGHTNESS);
    assert!(doc.pages.is_empty());
    assert!(doc.check_invariants().is_empty());
    assert!(doc_with_pages(3).check_invariants().is_empty());
}

#[test]
fn detects_page_shape_mismatch() {
    let mut doc = doc_with_pages(2);
    doc.pages[1].displays.pop();
    let v = doc.check_invariants();
    assert_eq!(
        v,
        vec![Violation::PageShape {
            page: 1,
            buttons: 6,
            displays: 5,
            expected: 6
        }]
    );
    assert_eq!(doc.pages[1].tile_count(), None);
}

#[test]
fn detects_dangling_change_page() {
    let mut doc = doc_with_pages(2);
    doc.pages[0].buttons[3].secondary = Action::change_page(2);
    let v = doc.check_invariants();
    assert!(matches!(
        v.as_slice(),
        [Violation::DanglingPageTarget {
            target: 2,
            pages: 2,
            which: ActionSlot::Secondary,
            ..
        }]
    ));
    assert!(v[0].to_string().contains("page 0 button 3"));
}

#[test]
fn detects_bad_grid_and_bitmap() {
    let mut doc = ConfigDocument::default();
    doc.tile_grid_width = 0;
    doc.default_back_display = Display::default().with_converted_image(vec![0; 3]);
    let v = doc.check_invariants();
    assert!(v.contains(&Violation::GridDimension {
        name: "width",
        value: 0
    }));
    assert!(v.contains(&Violation::BitmapSize { slot: None, len: 3 }));
}

#[test]
fn slot_lookup_and_iteration_order() {
    let doc = doc_with_pages(2);
    assert!(doc.contains(SlotRef::new(1, 5)));
    assert!(!doc.contains(SlotRef::new(1, 6)));
    assert!(!doc.contains(SlotRef::new(2, 0)));
    assert!(doc.button(SlotRef::new(0, 0)).is_some());
    assert!(doc.display(SlotRef::new(9, 0)).is_none());
    let slots: Vec<SlotRef> = doc.buttons().map(|(s, _)| s).collect();
    assert_eq!(slots.len(), 12);
    assert_eq!(slots[7], SlotRef::new(1, 1));
}

#[test]
fn json_round_trip() {
    let mut doc = doc_with_pages(1);
    doc.pages[0].buttons[0].primary = Action::change_page(0);
    let json = serde_json::to_string(&doc).unwrap();
    assert!(json.contains("tileGridWidth"));
    let back: ConfigDocument = serde_json::from_str(&json).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn validate_joins_violations_and_checks_the_version() {
    let mut doc = doc_with_pages(1);
    assert!(doc.validate().is_ok());

    doc.tile_grid_width = 0;
    doc.pages[0].buttons[0].primary = Action::change_page(9);
    let msg = doc.validate().unwrap_err().to_string();
    assert!(msg.starts_with("validation error:"));
    assert!(msg.contains("grid width 0"));
    assert!(msg.contains("targets page 9"));

    let mut doc = doc_with_pages(0);
    doc.format_version = FormatVersion::new(2, 0, 0);
    assert!(doc.validate().is_err());
}
