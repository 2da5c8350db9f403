//! Integration tests for RawRecord and references

use machinemind_foundation::{EntryType, RawRecord, RegRef, StorageKey, Value};

#[test]
fn with_and_without_are_persistent() {
    let base = RawRecord::new().with("name", "EVEREST");
    let extended = base.with("armor", 0);

    assert!(!base.contains("armor"));
    assert_eq!(extended.int("armor"), Some(0));
    assert!(!extended.without("armor").contains("armor"));
}

#[test]
fn merged_over_prefers_own_fields() {
    let defaults = RawRecord::new().with("name", "New Frame").with("license_level", 2);
    let raw = RawRecord::new().with("name", "EVEREST");
    let merged = raw.merged_over(&defaults);

    assert_eq!(merged.str("name"), Some("EVEREST"));
    assert_eq!(merged.int("license_level"), Some(2));
}

#[test]
fn typed_accessors_reject_wrong_shapes() {
    let raw = RawRecord::new().with("name", "x").with("level", 3).with("dark", true);

    assert_eq!(raw.str("level"), None);
    assert_eq!(raw.int("name"), None);
    assert_eq!(raw.bool("dark"), Some(true));
    assert!(raw.list("name").is_none());
    assert!(raw.reference("name").is_none());
}

#[test]
fn refs_are_collected_and_rewritten() {
    let a = RegRef::new(EntryType::FrameTrait, StorageKey::new("a"));
    let b = RegRef::new(EntryType::CoreSystem, StorageKey::new("b"));
    let raw = RawRecord::new()
        .with("traits", vec![Value::from(a)])
        .with("core_system", b);

    let mut refs = raw.refs();
    refs.sort();
    assert_eq!(refs.len(), 2);

    let local = raw.map_refs(|r| r.clone().in_registry("global"));
    assert!(local.refs().iter().all(|r| r.registry.as_deref() == Some("global")));
    assert!(local.refs().iter().all(|r| r.clone().local().is_local()));
}

#[test]
fn record_collects_from_pairs() {
    let raw: RawRecord = [("a", Value::Int(1)), ("b", Value::Int(2))].into_iter().collect();
    assert_eq!(raw.len(), 2);
    assert_eq!(raw.fields().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn record_converts_from_map_values_only() {
    let map = RawRecord::new().with("x", 1).into_value();
    assert!(RawRecord::try_from(map).is_ok());
    assert_eq!(RawRecord::try_from(Value::Int(1)).unwrap_err(), Value::Int(1));
}

#[test]
fn local_refs_fall_back_to_holder() {
    let r = RegRef::new(EntryType::Pilot, StorageKey::new("p"));
    assert!(r.is_local());
    assert_eq!(r.registry_or("global"), "global");
    assert_eq!(r.in_registry("inv").registry_or("global"), "inv");
}

#[test]
fn entry_types_parse_from_snake_case() {
    for kind in EntryType::ALL {
        assert_eq!(kind.to_string().parse::<EntryType>().unwrap(), kind);
    }
    assert!("npc_class".parse::<EntryType>().is_err());
}
