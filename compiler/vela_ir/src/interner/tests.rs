use pretty_assertions::assert_eq;

use super::StringInterner;
use crate::Name;

#[test]
fn interning_is_idempotent() {
    let interner = StringInterner::new();
    let a = interner.intern("station");
    let b = interner.intern("station");
    assert_eq!(a, b);
    assert_eq!(interner.lookup(a), "station");
}

#[test]
fn distinct_strings_get_distinct_names() {
    let interner = StringInterner::new();
    let a = interner.intern("first");
    let b = interner.intern("second");
    assert_ne!(a, b);
}

#[test]
fn empty_string_is_preinterned() {
    let interner = StringInterner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.len(), 1);
}

#[test]
fn get_does_not_intern() {
    let interner = StringInterner::new();
    assert_eq!(interner.get("missing"), None);
    assert_eq!(interner.len(), 1);
    let n = interner.intern("present");
    assert_eq!(interner.get("present"), Some(n));
}

#[test]
fn unknown_name_looks_up_as_empty() {
    let interner = StringInterner::new();
    assert_eq!(interner.lookup(Name::from_raw(999)), "");
}
