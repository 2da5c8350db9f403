//! Integration tests for Value types
//!
//! Tests Value variants, equality, hashing, display, and conversions.

use machinemind_foundation::{EntryType, RegRef, StorageKey, Value, ValueType};
use std::collections::HashSet;
use std::sync::Arc;

// =============================================================================
// Value Construction
// =============================================================================

#[test]
fn value_null() {
    let v = Value::Null;
    assert!(v.is_null());
    assert_eq!(v.value_type(), ValueType::Null);
}

#[test]
fn value_int() {
    let v = Value::Int(42);
    assert_eq!(v.as_int(), Some(42));
    assert_eq!(v.as_float(), None);
    assert_eq!(v.as_number(), Some(42.0));
}

#[test]
fn value_float() {
    let v = Value::Float(1.5);
    assert_eq!(v.as_float(), Some(1.5));
    assert_eq!(v.as_int(), None);
}

#[test]
fn value_string() {
    let v = Value::String(Arc::from("hello"));
    assert_eq!(v.as_str(), Some("hello"));
    assert_eq!(v, Value::from("hello"));
}

#[test]
fn value_ref() {
    let r = RegRef::new(EntryType::Frame, StorageKey::new("k1"));
    let v = Value::from(r.clone());
    assert_eq!(v.as_reg_ref(), Some(&r));
    assert_eq!(v.value_type(), ValueType::Ref);
}

#[test]
fn option_and_vec_conversions() {
    assert_eq!(Value::from(None::<i64>), Value::Null);
    assert_eq!(Value::from(Some(3_i64)), Value::Int(3));

    let list = Value::from(vec!["a", "b"]);
    assert_eq!(list.as_list().map(|l| l.len()), Some(2));
}

#[test]
fn map_builder() {
    let v = Value::map([("a", Value::Int(1)), ("b", Value::from("x"))]);
    let m = v.as_map().unwrap();
    assert_eq!(m.len(), 2);
    assert_eq!(m.get("a"), Some(&Value::Int(1)));
}

// =============================================================================
// Equality and Hashing
// =============================================================================

#[test]
fn float_equality_is_bitwise() {
    assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    assert_ne!(Value::Float(0.0), Value::Float(-0.0));
}

#[test]
fn int_and_float_are_distinct() {
    assert_ne!(Value::Int(1), Value::Float(1.0));
}

#[test]
fn values_hash_consistently() {
    let mut set = HashSet::new();
    set.insert(Value::from("x"));
    set.insert(Value::from("x"));
    set.insert(Value::Int(1));
    assert_eq!(set.len(), 2);
}

// =============================================================================
// Display
// =============================================================================

#[test]
fn display_is_unquoted() {
    assert_eq!(Value::from("Heat 2").to_string(), "Heat 2");
    assert_eq!(Value::Null.to_string(), "null");
    assert_eq!(Value::from(vec![1_i64, 2]).to_string(), "[1, 2]");
}

#[test]
fn display_of_refs_names_registry() {
    let r = RegRef::new(EntryType::MechWeapon, StorageKey::new("abc")).in_registry("global");
    assert_eq!(Value::from(r).to_string(), "mech_weapon:abc@global");
}

// =============================================================================
// Reference rewriting
// =============================================================================

#[test]
fn map_refs_reaches_nested_values() {
    let r = RegRef::new(EntryType::Deployable, StorageKey::new("d"));
    let nested = Value::map([("items", Value::from(vec![Value::from(r)]))]);
    let rewritten = nested.map_refs(&mut |r: &RegRef| r.clone().in_registry("other"));

    let mut out = Vec::new();
    rewritten.collect_refs(&mut out);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].registry.as_deref(), Some("other"));
}
