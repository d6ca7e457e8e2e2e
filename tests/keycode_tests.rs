use stayalive::utils::keycode::{ActionKey, KEY_TABLE};
use stayalive::ValidationError;

#[test]
fn test_known_codes() {
    assert_eq!(ActionKey::F13.code(), 0x7C);
    assert_eq!(ActionKey::F15.code(), 126);
    assert_eq!(ActionKey::F16.code(), 127);
    assert_eq!(ActionKey::F24.code(), 0x87);
}

#[test]
fn test_name_code_mapping_is_bidirectional() {
    for (key, name, code) in KEY_TABLE {
        assert_eq!(ActionKey::from_name(name), Some(key));
        assert_eq!(ActionKey::from_code(code), Some(key));
        assert_eq!(key.name(), name);
        assert_eq!(key.code(), code);
    }
}

#[test]
fn test_name_lookup_ignores_case_and_whitespace() {
    assert_eq!(ActionKey::from_name("f16"), Some(ActionKey::F16));
    assert_eq!(ActionKey::from_name("  F20 "), Some(ActionKey::F20));
    assert_eq!("f13".parse::<ActionKey>(), Ok(ActionKey::F13));
}

#[test]
fn test_unknown_names() {
    assert_eq!(ActionKey::from_name("F12"), None);
    assert_eq!(ActionKey::from_name("F25"), None);
    assert_eq!(ActionKey::from_name(""), None);
    assert_eq!(
        "Space".parse::<ActionKey>(),
        Err(ValidationError::UnknownKey("Space".to_string()))
    );
}

#[test]
fn test_unknown_codes() {
    assert_eq!(ActionKey::from_code(0), None);
    assert_eq!(ActionKey::from_code(0x7B), None); // F12
    assert_eq!(ActionKey::from_code(0x88), None);
}

#[test]
fn test_display_uses_name() {
    assert_eq!(ActionKey::F15.to_string(), "F15");
    assert_eq!(format!("{}", ActionKey::F22), "F22");
}

#[test]
fn test_all_lists_every_key_once() {
    let keys: Vec<ActionKey> = ActionKey::all().collect();
    assert_eq!(keys.len(), 12);
    assert_eq!(keys.first(), Some(&ActionKey::F13));
    assert_eq!(keys.last(), Some(&ActionKey::F24));
}
