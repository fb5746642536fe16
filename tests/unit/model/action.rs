use super::*;

#[test]
fn tags_are_stable() {
    for tag in 0..=5u8 {
        assert_eq!(ActionMode::from_tag(tag).unwrap().tag(), tag);
    }
    assert_eq!(ActionMode::from_tag(6), None);
    assert_eq!(ActionMode::ChangePage.tag(), 1);
}

#[test]
fn from_raw_checks_arity() {
    assert_eq!(
        Action::from_raw(1, &[3], true).unwrap(),
        Action::change_page(3)
    );
    assert!(Action::from_raw(1, &[], true).is_err());
    assert!(Action::from_raw(1, &[1, 2], true).is_err());
    assert!(Action::from_raw(3, &[], true).is_err());
    assert!(Action::from_raw(5, &[1], true).is_err());
    assert!(Action::from_raw(4, &[], true).is_err());
    assert!(Action::from_raw(4, &[1, 2, 3, 4, 5, 6, 7], true).is_err());
    assert!(Action::from_raw(9, &[], true).is_err());
}

#[test]
fn hotkey_codes_must_fit_a_byte() {
    let ok = Action::from_raw(2, &[0xE0, 0x06], true).unwrap();
    assert_eq!(
        ok.kind,
        ActionKind::Hotkey {
            keys: vec![0xE0, 0x06]
        }
    );
    assert!(Action::from_raw(2, &[0x100], true).is_err());
}

#[test]
fn noop_ignores_values() {
    let a = Action::from_raw(0, &[7, 8], false).unwrap();
    assert_eq!(a.kind, ActionKind::Noop);
    assert!(a.values().is_empty());
    assert!(!a.enabled);
}

#[test]
fn values_mirror_payload() {
    let a = Action::new(ActionKind::Settings {
        setting: 2,
        value: 40,
    });
    assert_eq!(a.mode(), ActionMode::Settings);
    assert_eq!(a.values(), vec![2, 40]);
    assert_eq!(a.change_page_target(), None);
    assert_eq!(Action::change_page(4).change_page_target(), Some(4));
}

#[test]
fn default_button_matches_factory_layout() {
    let b = ButtonSetting::default();
    assert!(b.primary.enabled);
    assert!(!b.secondary.enabled);
    assert_eq!(b.action(ActionSlot::Secondary).kind, ActionKind::Noop);
}

#[test]
fn json_shape_is_tagged_by_mode() {
    let a = Action::change_page(2);
    let json = serde_json::to_value(&a).unwrap();
    assert_eq!(json["kind"]["mode"], "change_page");
    assert_eq!(json["kind"]["page"], 2);
    let back: Action = serde_json::from_value(json).unwrap();
    assert_eq!(back, a);
}
