//! Shared fixtures: a deterministic environment and a small slice of
//! Harrison Armory content.

use machinemind_foundation::{RawRecord, Value};
use machinemind_registry::{Live, OpCtx, RegEnv, Registry, RegistryConfig};
use machinemind_schema::{Frame, Manufacturer, MechWeapon};

pub fn env() -> RegEnv {
    machinemind_schema::standard_env(RegistryConfig::deterministic(42)).unwrap()
}

/// An environment with a `global` catalog and an empty `dest` registry.
pub fn two_registries() -> (RegEnv, Registry, Registry) {
    let env = env();
    let global = env.create_registry("global");
    let dest = env.create_registry("dest");
    (env, global, dest)
}

fn record(pairs: &[(&str, Value)]) -> Value {
    pairs
        .iter()
        .map(|(k, v)| (*k, v.clone()))
        .collect::<RawRecord>()
        .into_value()
}

/// Stores HA, the SHERMAN's integrated cannon, and the SHERMAN frame whose
/// core system integrates that cannon.
pub fn sherman(reg: &Registry, ctx: &OpCtx) -> Sherman {
    Manufacturer::unpack(
        &RawRecord::new().with("id", "HA").with("name", "HARRISON ARMORY"),
        reg,
        ctx,
    )
    .unwrap();

    let cannon = MechWeapon::unpack(
        &RawRecord::new()
            .with("id", "mw_sherman_integrated")
            .with("name", "ZF4 SOLIDCORE")
            .with("source", "HA")
            .with("mount", "Heavy")
            .with("type", "Cannon")
            .with(
                "damage",
                vec![record(&[("type", Value::from("Energy")), ("val", Value::from("4d6"))])],
            )
            .with("range", vec![record(&[("type", Value::from("Line")), ("val", Value::Int(20))])]),
        reg,
        ctx,
    )
    .unwrap();

    let core = record(&[
        ("name", Value::from("ZF4 SOLIDCORE")),
        ("active_name", Value::from("Solidcore")),
        ("activation", Value::from("Protocol")),
        ("integrated", Value::from(vec!["mw_sherman_integrated"])),
    ]);
    let trait_ = record(&[
        ("name", Value::from("Superheated Reactor Feed")),
        ("description", Value::from("1/round, reduce heat cost of your next tech action.")),
    ]);
    let frame = Frame::unpack(
        &RawRecord::new()
            .with("id", "mf_sherman")
            .with("name", "SHERMAN")
            .with("source", "HA")
            .with("mounts", vec!["Main/Aux", "Heavy"])
            .with("traits", vec![trait_])
            .with("core_system", core),
        reg,
        ctx,
    )
    .unwrap();

    Sherman { frame, cannon }
}

/// What [`sherman`] stored.
pub struct Sherman {
    pub frame: Live<Frame>,
    pub cannon: Live<MechWeapon>,
}
