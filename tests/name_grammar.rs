//! Property-based tests for the name grammar and message size bound.
//!
//! The validators are checked against a character-scanning model of the
//! grammar, written independently of the element-splitting implementation.

use dbus_props::message::{Message, MessageType};
use dbus_props::names::{
    message_is_small_enough, validate_bus_name, validate_error_name, validate_interface_name,
    validate_member_name,
};
use proptest::prelude::*;

/// Scan `s` one character at a time.
fn model(s: &str, unique_prefix: bool) -> bool {
    if s.is_empty() || s.len() > 255 {
        return false;
    }

    let (body, unique) = match s.strip_prefix(':') {
        Some(rest) if unique_prefix => (rest, true),
        _ => (s, false),
    };

    let mut elements = 0;
    let mut at_element_start = true;
    for c in body.chars() {
        if c == '.' {
            if at_element_start {
                return false;
            }
            at_element_start = true;
            continue;
        }
        if !(c.is_ascii_alphanumeric() || c == '_') {
            return false;
        }
        if at_element_start {
            if !unique && c.is_ascii_digit() {
                return false;
            }
            elements += 1;
            at_element_start = false;
        }
    }

    !at_element_start && elements >= 2
}

/// Strings mostly built from grammar characters, so both outcomes occur
fn name_like() -> impl Strategy<Value = String> {
    prop_oneof![
        "[:.a-c0-2_]{0,12}",
        "[a-zA-Z_][a-zA-Z0-9_]{0,6}(\\.[a-zA-Z0-9_]{0,6}){0,4}",
        ":[a-z0-9]{0,4}(\\.[a-z0-9]{0,4}){0,3}",
        "\\PC{0,20}",
    ]
}

proptest! {
    #[test]
    fn bus_name_matches_model(s in name_like()) {
        prop_assert_eq!(validate_bus_name(&s), model(&s, true));
    }

    #[test]
    fn interface_name_matches_model(s in name_like()) {
        prop_assert_eq!(validate_interface_name(&s), model(&s, false));
    }

    #[test]
    fn error_name_equals_interface_name(s in name_like()) {
        prop_assert_eq!(validate_error_name(&s), validate_interface_name(&s));
    }

    #[test]
    fn well_formed_names_accepted(
        s in "[A-Za-z_][A-Za-z0-9_]{0,10}(\\.[A-Za-z_][A-Za-z0-9_]{0,10}){1,5}"
    ) {
        prop_assert!(validate_bus_name(&s));
        prop_assert!(validate_interface_name(&s));
        prop_assert!(validate_error_name(&s));
        prop_assert!(!validate_member_name(&s));
    }

    #[test]
    fn unique_names_accepted_for_bus_only(
        s in ":[0-9][A-Za-z0-9_]{0,6}(\\.[0-9][A-Za-z0-9_]{0,6}){1,3}"
    ) {
        prop_assert!(validate_bus_name(&s));
        prop_assert!(!validate_interface_name(&s));
    }

    #[test]
    fn digit_leading_element_rejected(
        head in "[a-z]{1,6}",
        digit in "[0-9]",
        tail in "[a-z]{0,6}",
    ) {
        let s = format!("{head}.{digit}{tail}");
        prop_assert!(!validate_bus_name(&s));
        prop_assert!(!validate_interface_name(&s));
        let unique = format!(":{s}");
        prop_assert!(validate_bus_name(&unique));
    }

    #[test]
    fn member_names(s in "[A-Za-z_][A-Za-z0-9_]{0,40}") {
        prop_assert!(validate_member_name(&s));
        let dotted = format!("{s}.x");
        prop_assert!(!validate_member_name(&dotted));
        let digit_led = format!("1{s}");
        prop_assert!(!validate_member_name(&digit_led));
    }

    #[test]
    fn size_bound(n in 0usize..(1usize << 28)) {
        prop_assert_eq!(message_is_small_enough(n), n < 134_217_728);
    }

    #[test]
    fn path_decomposition(segments in prop::collection::vec("[a-zA-Z0-9_]{1,6}", 0..6)) {
        let path = format!("/{}", segments.join("/"));
        let mut msg = Message::new(MessageType::Signal);
        prop_assert!(msg.set_path(&path));
        let decomposed: Vec<&str> = msg.path_decomposed().collect();
        prop_assert_eq!(decomposed, segments.iter().map(String::as_str).collect::<Vec<_>>());
    }
}

#[test]
fn documented_examples() {
    assert!(validate_bus_name("org.freedesktop.DBus"));
    assert!(!validate_bus_name(".org.freedesktop"));
    assert!(validate_bus_name(":1.54"));
    assert!(validate_interface_name("org.freedesktop.DBus"));
    assert!(!validate_interface_name("org.2freedesktop"));
    assert!(message_is_small_enough(134_217_727));
    assert!(!message_is_small_enough(134_217_728));
}
