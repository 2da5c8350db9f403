//! The field reader handed to [`RegEntry::load`](crate::RegEntry::load).
//!
//! Typed readers turn a raw record's loosely shaped values into schema
//! fields, producing `MissingField` / `TypeMismatch` errors tagged with the
//! kind being loaded. Reference readers come in two flavors:
//!
//! - `owned*` resolve strictly: an owned child that cannot be resolved is a
//!   load failure.
//! - `foreign*` resolve leniently: a dangling non-owned reference is dropped
//!   with a warning, unless the environment is configured with
//!   `strict_foreign_refs`.

use std::sync::Arc;

use machinemind_foundation::{
    EntryType, Error, RawRecord, RegRef, Result, StorageKey, Value, ValueType,
};
use tracing::warn;

use crate::ctx::OpCtx;
use crate::entry::{AnyEntry, Live, RegEntry};
use crate::registry::Registry;

/// Read access to one record during materialization.
pub struct Loader<'a> {
    registry: &'a Registry,
    ctx: &'a OpCtx,
    kind: EntryType,
    key: &'a StorageKey,
    raw: &'a RawRecord,
}

impl<'a> Loader<'a> {
    pub(crate) fn new(
        registry: &'a Registry,
        ctx: &'a OpCtx,
        kind: EntryType,
        key: &'a StorageKey,
        raw: &'a RawRecord,
    ) -> Self {
        Self {
            registry,
            ctx,
            kind,
            key,
            raw,
        }
    }

    /// The record being loaded (already merged over the kind's defaults).
    #[must_use]
    pub fn raw(&self) -> &'a RawRecord {
        self.raw
    }

    /// The registry holding the record.
    #[must_use]
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// The context the instance is being materialized into.
    #[must_use]
    pub fn ctx(&self) -> &'a OpCtx {
        self.ctx
    }

    /// The kind being loaded.
    #[must_use]
    pub fn kind(&self) -> EntryType {
        self.kind
    }

    /// The storage key being loaded.
    #[must_use]
    pub fn key(&self) -> &'a StorageKey {
        self.key
    }

    /// A reader over a nested record (an element of a list field, say) that
    /// shares this loader's registry, context, and error tagging.
    #[must_use]
    pub fn nested<'b>(&'b self, raw: &'b RawRecord) -> Loader<'b> {
        Loader {
            registry: self.registry,
            ctx: self.ctx,
            kind: self.kind,
            key: self.key,
            raw,
        }
    }

    /// The private inventory of the entry being loaded, created on demand.
    #[must_use]
    pub fn inventory(&self) -> Registry {
        self.registry.inventory_for(self.kind, self.key)
    }

    fn mismatch(&self, field: &str, expected: ValueType, actual: &Value) -> Error {
        Error::type_mismatch(self.kind, field, expected, actual.value_type())
    }

    /// Returns the field value, treating null as absent.
    fn present(&self, field: &str) -> Option<&'a Value> {
        self.raw.get(field).filter(|v| !v.is_null())
    }

    // --- scalars ---

    /// Reads a required string field.
    ///
    /// # Errors
    ///
    /// `MissingField` if absent or null, `TypeMismatch` if not a string.
    pub fn string(&self, field: &str) -> Result<String> {
        self.opt_string(field)?
            .ok_or_else(|| Error::missing_field(self.kind, field))
    }

    /// Reads an optional string field.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if present but not a string.
    pub fn opt_string(&self, field: &str) -> Result<Option<String>> {
        match self.present(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.to_string())),
            Some(other) => Err(self.mismatch(field, ValueType::String, other)),
        }
    }

    /// Reads a string field, falling back to `default` when absent.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if present but not a string.
    pub fn string_or(&self, field: &str, default: &str) -> Result<String> {
        Ok(self
            .opt_string(field)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// Reads a required integer field.
    ///
    /// # Errors
    ///
    /// `MissingField` if absent or null, `TypeMismatch` if not an integer.
    pub fn int(&self, field: &str) -> Result<i64> {
        self.opt_int(field)?
            .ok_or_else(|| Error::missing_field(self.kind, field))
    }

    /// Reads an optional integer field.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if present but not an integer.
    pub fn opt_int(&self, field: &str) -> Result<Option<i64>> {
        match self.present(field) {
            None => Ok(None),
            Some(Value::Int(n)) => Ok(Some(*n)),
            Some(other) => Err(self.mismatch(field, ValueType::Int, other)),
        }
    }

    /// Reads an integer field, falling back to `default` when absent.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if present but not an integer.
    pub fn int_or(&self, field: &str, default: i64) -> Result<i64> {
        Ok(self.opt_int(field)?.unwrap_or(default))
    }

    /// Reads a numeric field (int or float), falling back to `default`.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if present but not a number.
    pub fn number_or(&self, field: &str, default: f64) -> Result<f64> {
        match self.present(field) {
            None => Ok(default),
            Some(v) => v
                .as_number()
                .ok_or_else(|| self.mismatch(field, ValueType::Number, v)),
        }
    }

    /// Reads a boolean field, falling back to `default` when absent.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if present but not a boolean.
    pub fn bool_or(&self, field: &str, default: bool) -> Result<bool> {
        match self.present(field) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(self.mismatch(field, ValueType::Bool, other)),
        }
    }

    /// Returns the raw value of a field, if set.
    #[must_use]
    pub fn value(&self, field: &str) -> Option<Value> {
        self.present(field).cloned()
    }

    // --- collections ---

    /// Reads a list field. Absent or null yields an empty list.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if present but not a list.
    pub fn list(&self, field: &str) -> Result<Vec<Value>> {
        match self.present(field) {
            None => Ok(Vec::new()),
            Some(Value::List(items)) => Ok(items.iter().cloned().collect()),
            Some(other) => Err(self.mismatch(field, ValueType::List, other)),
        }
    }

    /// Reads a list of strings.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the field or any element has the wrong shape.
    pub fn string_list(&self, field: &str) -> Result<Vec<String>> {
        self.list(field)?
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.mismatch(field, ValueType::String, v))
            })
            .collect()
    }

    /// Reads a list of integers.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the field or any element has the wrong shape.
    pub fn int_list(&self, field: &str) -> Result<Vec<i64>> {
        self.list(field)?
            .iter()
            .map(|v| v.as_int().ok_or_else(|| self.mismatch(field, ValueType::Int, v)))
            .collect()
    }

    /// Reads a list of nested records (maps).
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the field or any element has the wrong shape.
    pub fn record_list(&self, field: &str) -> Result<Vec<RawRecord>> {
        self.list(field)?
            .into_iter()
            .map(|v| {
                let actual = v.value_type();
                RawRecord::try_from(v).map_err(|_| {
                    Error::type_mismatch(self.kind, field, ValueType::Map, actual)
                })
            })
            .collect()
    }

    /// Reads an optional nested record.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if present but not a map.
    pub fn opt_record(&self, field: &str) -> Result<Option<RawRecord>> {
        match self.present(field) {
            None => Ok(None),
            Some(Value::Map(map)) => Ok(Some(RawRecord::from(map.clone()))),
            Some(other) => Err(self.mismatch(field, ValueType::Map, other)),
        }
    }

    /// Reads a map of string keys to integers (e.g. stat blocks).
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the field or any value has the wrong shape.
    pub fn int_map(&self, field: &str) -> Result<Vec<(Arc<str>, i64)>> {
        match self.present(field) {
            None => Ok(Vec::new()),
            Some(Value::Map(map)) => map
                .iter()
                .map(|(k, v)| {
                    v.as_int()
                        .map(|n| (Arc::clone(k), n))
                        .ok_or_else(|| self.mismatch(field, ValueType::Int, v))
                })
                .collect(),
            Some(other) => Err(self.mismatch(field, ValueType::Map, other)),
        }
    }

    // --- references ---

    fn ref_at(&self, field: &str) -> Result<Option<RegRef>> {
        match self.present(field) {
            None => Ok(None),
            Some(Value::Ref(r)) => Ok(Some(r.clone())),
            Some(other) => Err(self.mismatch(field, ValueType::Ref, other)),
        }
    }

    fn refs_at(&self, field: &str) -> Result<Vec<RegRef>> {
        self.list(field)?
            .iter()
            .map(|v| {
                v.as_reg_ref()
                    .cloned()
                    .ok_or_else(|| self.mismatch(field, ValueType::Ref, v))
            })
            .collect()
    }

    /// Resolves a reference strictly, relative to the holding registry.
    ///
    /// # Errors
    ///
    /// Propagates any resolution or load failure.
    pub fn resolve<T: RegEntry>(&self, r: &RegRef) -> Result<Live<T>> {
        self.registry.resolve_typed::<T>(self.ctx, r)
    }

    /// Resolves a reference leniently. Returns `None` if it dangles.
    ///
    /// # Errors
    ///
    /// Propagates load failures of the target, and dangling references when
    /// the environment is strict.
    pub fn resolve_lenient<T: RegEntry>(&self, field: &str, r: &RegRef) -> Result<Option<Live<T>>> {
        self.lenient(field, r, self.resolve::<T>(r))
    }

    fn lenient<E>(&self, field: &str, r: &RegRef, resolved: Result<E>) -> Result<Option<E>> {
        match resolved {
            Ok(entry) => Ok(Some(entry)),
            Err(err) if err.is_not_found() && !self.registry.env().config().strict_foreign_refs => {
                warn!(
                    kind = %self.kind,
                    key = %self.key,
                    field,
                    target = %r,
                    "dropping unresolvable reference"
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Resolves an owned single-reference field.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` on a non-reference, or any resolution failure.
    pub fn owned<T: RegEntry>(&self, field: &str) -> Result<Option<Live<T>>> {
        self.ref_at(field)?
            .map(|r| self.resolve::<T>(&r))
            .transpose()
    }

    /// Resolves an owned list-of-references field, preserving order.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` on a malformed list, or any resolution failure.
    pub fn owned_many<T: RegEntry>(&self, field: &str) -> Result<Vec<Live<T>>> {
        self.registry
            .resolve_many_typed::<T>(self.ctx, &self.refs_at(field)?)
    }

    /// Resolves a non-owned single-reference field.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` on a non-reference, or a load failure of the target.
    pub fn foreign<T: RegEntry>(&self, field: &str) -> Result<Option<Live<T>>> {
        match self.ref_at(field)? {
            None => Ok(None),
            Some(r) => self.resolve_lenient::<T>(field, &r),
        }
    }

    /// Resolves a non-owned list-of-references field, dropping dangling
    /// entries.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` on a malformed list, or a load failure of a target.
    pub fn foreign_many<T: RegEntry>(&self, field: &str) -> Result<Vec<Live<T>>> {
        let mut out = Vec::new();
        for r in self.refs_at(field)? {
            if let Some(live) = self.resolve_lenient::<T>(field, &r)? {
                out.push(live);
            }
        }
        Ok(out)
    }

    /// Resolves an owned list of references whose targets may be of any kind.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` on a malformed list, or any resolution failure.
    pub fn owned_many_any(&self, field: &str) -> Result<Vec<AnyEntry>> {
        self.registry.resolve_many(self.ctx, &self.refs_at(field)?)
    }

    /// Resolves a non-owned list of references of any kind, dropping
    /// dangling entries.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` on a malformed list, or a load failure of a target.
    pub fn foreign_many_any(&self, field: &str) -> Result<Vec<AnyEntry>> {
        let mut out = Vec::new();
        for r in self.refs_at(field)? {
            let resolved = self.registry.resolve(self.ctx, &r);
            if let Some(entry) = self.lenient(field, &r, resolved)? {
                out.push(entry);
            }
        }
        Ok(out)
    }
}
