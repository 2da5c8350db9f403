//! Fixtures shared by this crate's unit tests.

use machinemind_foundation::{RawRecord, Value};
use machinemind_registry::{Live, OpCtx, RegEnv, Registry, RegistryConfig};

use crate::frame::Frame;
use crate::manufacturer::Manufacturer;

/// A deterministic environment with every kind registered, plus its catalog.
pub(crate) fn setup() -> (RegEnv, Registry) {
    let env = crate::standard_env(RegistryConfig::deterministic(7)).unwrap();
    let reg = env.create_registry("global");
    (env, reg)
}

pub(crate) fn record(pairs: &[(&str, Value)]) -> Value {
    pairs
        .iter()
        .map(|(k, v)| (*k, v.clone()))
        .collect::<RawRecord>()
        .into_value()
}

/// Stores GMS and unpacks the EVEREST frame against it.
pub(crate) fn stock_frame(reg: &Registry, ctx: &OpCtx) -> Live<Frame> {
    Manufacturer::unpack(
        &RawRecord::new().with("id", "GMS").with("name", "GENERAL MASSIVE SYSTEMS"),
        reg,
        ctx,
    )
    .unwrap();

    let stats = record(&[
        ("size", Value::Int(1)),
        ("structure", Value::Int(4)),
        ("stress", Value::Int(4)),
        ("armor", Value::Int(0)),
        ("hp", Value::Int(8)),
        ("evasion", Value::Int(8)),
        ("edef", Value::Int(8)),
        ("heatcap", Value::Int(5)),
        ("repcap", Value::Int(5)),
        ("sensor_range", Value::Int(10)),
        ("tech_attack", Value::Int(0)),
        ("save", Value::Int(10)),
        ("speed", Value::Int(5)),
        ("sp", Value::Int(6)),
    ]);
    let initiative = record(&[
        ("name", Value::from("Initiative")),
        ("description", Value::from("1/scene, take any quick action as a free action.")),
    ]);
    let replaceable = record(&[
        ("name", Value::from("Replaceable Parts")),
        ("description", Value::from("Repair structure for 1 less repair.")),
        (
            "bonuses",
            Value::from(vec![record(&[
                ("id", Value::from("mech_structure_repair_cost")),
                ("val", Value::Int(-1)),
            ])]),
        ),
    ]);
    let core = record(&[
        ("name", Value::from("Hyperspec Fuel Injector")),
        ("active_name", Value::from("Power Up")),
        ("active_effect", Value::from("Gain +1 accuracy on all attacks, checks, and saves.")),
        ("activation", Value::from("Protocol")),
    ]);
    let packed = RawRecord::new()
        .with("id", "mf_standard_pattern_i_everest")
        .with("name", "EVEREST")
        .with("source", "GMS")
        .with("license_level", 0)
        .with("mechtype", vec!["Balanced"])
        .with("mounts", vec!["Main", "Flex", "Heavy"])
        .with("stats", stats)
        .with("traits", vec![initiative, replaceable])
        .with("core_system", core);
    Frame::unpack(&packed, reg, ctx).unwrap()
}
