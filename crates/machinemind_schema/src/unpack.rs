//! Helpers for turning packed content records into stored records.
//!
//! Packed records are what content packs ship: children inline, cross
//! references as semantic ids. Unpacking creates the inline children as
//! entities of their own and swaps ids for references.

use machinemind_foundation::{EntryType, Error, RawRecord, Result, Value, ValueType};
use machinemind_registry::{OpCtx, Registry};
use tracing::warn;

use crate::deployable::Deployable;
use crate::manufacturer::Manufacturer;
use crate::tag::TagTemplate;

fn list<'a>(packed: &'a RawRecord, kind: EntryType, field: &str) -> Result<Vec<&'a Value>> {
    match packed.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::List(items)) => Ok(items.iter().collect()),
        Some(other) => Err(Error::type_mismatch(
            kind,
            field,
            ValueType::List,
            other.value_type(),
        )),
    }
}

/// Reads a packed list of nested records.
///
/// # Errors
///
/// `TypeMismatch` if the field or an element has the wrong shape.
pub fn records(packed: &RawRecord, kind: EntryType, field: &str) -> Result<Vec<RawRecord>> {
    list(packed, kind, field)?
        .into_iter()
        .map(|v| {
            RawRecord::try_from(v.clone()).map_err(|other| {
                Error::type_mismatch(kind, field, ValueType::Map, other.value_type())
            })
        })
        .collect()
}

/// Reads a packed list of strings.
///
/// # Errors
///
/// `TypeMismatch` if the field or an element has the wrong shape.
pub fn strings(packed: &RawRecord, kind: EntryType, field: &str) -> Result<Vec<String>> {
    list(packed, kind, field)?
        .into_iter()
        .map(|v| {
            v.as_str().map(str::to_string).ok_or_else(|| {
                Error::type_mismatch(kind, field, ValueType::String, v.value_type())
            })
        })
        .collect()
}

/// Creates each inline deployable and returns the list of references.
///
/// # Errors
///
/// Shape errors, or a deployable that fails to load.
pub fn deployables(
    packed: &RawRecord,
    kind: EntryType,
    reg: &Registry,
    ctx: &OpCtx,
) -> Result<Value> {
    let mut refs = Vec::new();
    for dep in records(packed, kind, "deployables")? {
        refs.push(Value::from(Deployable::unpack(&dep, reg, ctx)?.reg_ref()));
    }
    Ok(Value::from(refs))
}

/// Resolves `integrated` semantic ids against every kind in `reg`.
///
/// Ids that match nothing are skipped with a warning.
///
/// # Errors
///
/// Shape errors, or a matched record that fails to load.
pub fn integrated(
    packed: &RawRecord,
    kind: EntryType,
    reg: &Registry,
    ctx: &OpCtx,
) -> Result<Value> {
    let mut refs = Vec::new();
    for id in strings(packed, kind, "integrated")? {
        match reg.resolve_wildcard_mmid(ctx, &id)? {
            Some(entry) => refs.push(Value::from(entry.reg_ref())),
            None => warn!(%kind, id = %id, "skipping unresolved integrated id"),
        }
    }
    Ok(Value::from(refs))
}

/// Converts packed tag instances (`{id, val}`) into `{tag: ref, val}`.
///
/// Instances naming an unknown tag template are skipped with a warning.
///
/// # Errors
///
/// Shape errors, or a template that fails to load.
pub fn tags(
    packed: &RawRecord,
    kind: EntryType,
    field: &str,
    reg: &Registry,
    ctx: &OpCtx,
) -> Result<Value> {
    let cat = reg.get_cat::<TagTemplate>();
    let mut out = Vec::new();
    for inst in records(packed, kind, field)? {
        let Some(id) = inst.str("id") else {
            return Err(Error::missing_field(kind, format!("{field}.id")));
        };
        match cat.lookup_mmid(ctx, id)? {
            Some(template) => out.push(
                RawRecord::new()
                    .with("tag", template.reg_ref())
                    .with("val", inst.get("val").cloned())
                    .into_value(),
            ),
            None => warn!(%kind, tag = id, "skipping unknown tag"),
        }
    }
    Ok(Value::from(out))
}

/// Resolves a packed `source` manufacturer id to a reference (or null).
///
/// # Errors
///
/// `TypeMismatch` if `source` is not a string, or a load failure.
pub fn source(packed: &RawRecord, kind: EntryType, reg: &Registry, ctx: &OpCtx) -> Result<Value> {
    match packed.get("source") {
        None | Some(Value::Null) => Ok(Value::Null),
        Some(Value::String(id)) => {
            match reg.get_cat::<Manufacturer>().lookup_mmid(ctx, id)? {
                Some(m) => Ok(Value::from(m.reg_ref())),
                None => {
                    warn!(%kind, source = %id, "unknown manufacturer");
                    Ok(Value::Null)
                }
            }
        }
        Some(Value::Ref(r)) => Ok(Value::Ref(r.clone())),
        Some(other) => Err(Error::type_mismatch(
            kind,
            "source",
            ValueType::String,
            other.value_type(),
        )),
    }
}

/// Applies the usual equipment conversions: deployables, integrated, tags.
///
/// # Errors
///
/// Any of the individual conversions' errors.
pub fn equipment(
    packed: &RawRecord,
    kind: EntryType,
    reg: &Registry,
    ctx: &OpCtx,
) -> Result<RawRecord> {
    Ok(packed
        .with("deployables", deployables(packed, kind, reg, ctx)?)
        .with("integrated", integrated(packed, kind, reg, ctx)?)
        .with("tags", tags(packed, kind, "tags", reg, ctx)?))
}
