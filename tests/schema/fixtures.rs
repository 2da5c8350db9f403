//! Shared fixtures for schema tests.

use machinemind_foundation::{RawRecord, Value};
use machinemind_registry::{OpCtx, RegEnv, Registry, RegistryConfig};
use machinemind_schema::{Manufacturer, TagTemplate};

pub fn setup() -> (RegEnv, Registry) {
    let env = machinemind_schema::standard_env(RegistryConfig::deterministic(11)).unwrap();
    let reg = env.create_registry("global");
    (env, reg)
}

pub fn record(pairs: &[(&str, Value)]) -> Value {
    pairs
        .iter()
        .map(|(k, v)| (*k, v.clone()))
        .collect::<RawRecord>()
        .into_value()
}

/// Stores the manufacturers and tags most fixtures refer to.
pub fn base_content(reg: &Registry, ctx: &OpCtx) {
    for (id, name) in [("GMS", "GENERAL MASSIVE SYSTEMS"), ("IPS-N", "IPS-NORTHSTAR")] {
        let packed = RawRecord::new().with("id", id).with("name", name);
        Manufacturer::unpack(&packed, reg, ctx).unwrap();
    }
    for (id, name) in [
        ("tg_heat_self", "Heat {VAL} (Self)"),
        ("tg_limited", "Limited {VAL}"),
        ("tg_unique", "Unique"),
    ] {
        TagTemplate::unpack(&RawRecord::new().with("id", id).with("name", name), reg, ctx).unwrap();
    }
}

pub fn tag(id: &str, val: Option<i64>) -> Value {
    match val {
        Some(v) => record(&[("id", Value::from(id)), ("val", Value::Int(v))]),
        None => record(&[("id", Value::from(id))]),
    }
}
