//! Integration tests for persistent collections

use machinemind_foundation::{LtMap, LtVec};

#[test]
fn vec_round_trips_through_iteration() {
    let v: LtVec<i64> = vec![3, 1, 2].into_iter().collect();
    let back: Vec<i64> = v.clone().into_iter().collect();
    assert_eq!(back, vec![3, 1, 2]);
    assert_eq!((&v).into_iter().count(), 3);
}

#[test]
fn map_iterates_in_key_order() {
    let m: LtMap<String, i64> = [("b".to_string(), 2), ("a".to_string(), 1)].into_iter().collect();
    let keys: Vec<&String> = m.keys().collect();
    assert_eq!(keys, vec!["a", "b"]);
}

#[test]
fn map_union_prefers_other() {
    let a: LtMap<&str, i64> = [("x", 1), ("y", 1)].into_iter().collect();
    let b: LtMap<&str, i64> = [("y", 2)].into_iter().collect();
    let u = a.union(&b);

    assert_eq!(u.get("x"), Some(&1));
    assert_eq!(u.get("y"), Some(&2));
    assert_eq!(a.get("y"), Some(&1));
}

#[test]
fn map_remove_is_persistent() {
    let a: LtMap<&str, i64> = [("x", 1)].into_iter().collect();
    let b = a.remove("x");
    assert!(b.is_empty());
    assert!(a.contains_key("x"));
}
