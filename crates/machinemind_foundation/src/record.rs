//! Raw records: the durable, schema-agnostic form of one entity.
//!
//! A raw record maps field names to plain values. It is the single source
//! of truth for an entity; live instances are materialized from it and
//! written back into it.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::collections::{LtMap, LtVec};
use crate::reference::RegRef;
use crate::value::Value;

/// Field mapping for one stored entity.
///
/// Clone is O(1); all updates return a new record sharing structure with
/// the original.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct RawRecord(LtMap<Arc<str>, Value>);

impl RawRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self(LtMap::new())
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets a field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns true if the field is present (even if null).
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Gets a string field.
    #[must_use]
    pub fn str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Gets an integer field.
    #[must_use]
    pub fn int(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_int)
    }

    /// Gets a boolean field.
    #[must_use]
    pub fn bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(Value::as_bool)
    }

    /// Gets a list field.
    #[must_use]
    pub fn list(&self, field: &str) -> Option<&LtVec<Value>> {
        self.get(field).and_then(Value::as_list)
    }

    /// Gets a reference field.
    #[must_use]
    pub fn reference(&self, field: &str) -> Option<&RegRef> {
        self.get(field).and_then(Value::as_reg_ref)
    }

    /// Returns a new record with the field set.
    #[must_use]
    pub fn with(&self, field: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        Self(self.0.insert(field.into(), value.into()))
    }

    /// Returns a new record with the field removed.
    #[must_use]
    pub fn without(&self, field: &str) -> Self {
        Self(self.0.remove(field))
    }

    /// Returns this record's fields laid over `defaults`.
    ///
    /// Fields present here win; fields only in `defaults` are filled in.
    #[must_use]
    pub fn merged_over(&self, defaults: &RawRecord) -> Self {
        Self(defaults.0.union(&self.0))
    }

    /// Iterates over fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, &Value)> {
        self.0.iter()
    }

    /// Iterates over field names in order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| &**k)
    }

    /// Collects every reference nested anywhere in this record.
    #[must_use]
    pub fn refs(&self) -> Vec<RegRef> {
        let mut out = Vec::new();
        for value in self.0.values() {
            value.collect_refs(&mut out);
        }
        out
    }

    /// Returns a copy of this record with every nested reference replaced by `f`.
    #[must_use]
    pub fn map_refs(&self, mut f: impl FnMut(&RegRef) -> RegRef) -> Self {
        Self(
            self.0
                .iter()
                .map(|(k, v)| (Arc::clone(k), v.map_refs(&mut f)))
                .collect(),
        )
    }

    /// Converts the record into a map value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Map(self.0)
    }
}

impl From<LtMap<Arc<str>, Value>> for RawRecord {
    fn from(map: LtMap<Arc<str>, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for RawRecord {
    type Error = Value;

    /// Converts a map value into a record, handing back any other value.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Map(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

impl<K: Into<Arc<str>>> FromIterator<(K, Value)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl fmt::Debug for RawRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
