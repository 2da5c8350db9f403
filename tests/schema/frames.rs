//! Integration tests for frames, traits, and core systems

use machinemind_foundation::{EntryType, RawRecord, Value};
use machinemind_registry::OpCtx;
use machinemind_schema::{CoreSystem, Frame, MechWeapon};

use crate::fixtures::{base_content, record, setup};

fn everest() -> RawRecord {
    let stats = record(&[
        ("size", Value::Int(1)),
        ("structure", Value::Int(4)),
        ("stress", Value::Int(4)),
        ("armor", Value::Int(0)),
        ("hp", Value::Int(10)),
        ("evasion", Value::Int(8)),
        ("edef", Value::Int(8)),
        ("heatcap", Value::Int(6)),
        ("repcap", Value::Int(5)),
        ("sensor_range", Value::Int(10)),
        ("tech_attack", Value::Int(0)),
        ("save", Value::Int(10)),
        ("speed", Value::Int(4)),
        ("sp", Value::Int(6)),
    ]);
    let traits = vec![
        record(&[
            ("name", Value::from("Initiative")),
            ("description", Value::from("1/scene, take any quick action as a free action.")),
        ]),
        record(&[
            ("name", Value::from("Replaceable Parts")),
            ("description", Value::from("Repair structure damage for 1 less repair.")),
            (
                "bonuses",
                Value::from(vec![record(&[
                    ("id", Value::from("mech_structure_repair_cost")),
                    ("val", Value::Int(-1)),
                ])]),
            ),
        ]),
    ];
    RawRecord::new()
        .with("id", "mf_standard_pattern_i_everest")
        .with("name", "EVEREST")
        .with("source", "GMS")
        .with("license_level", 0)
        .with("mounts", vec!["Main", "Flex", "Heavy"])
        .with("stats", stats)
        .with("traits", traits)
        .with(
            "core_system",
            record(&[
                ("name", Value::from("Hyperspec Fuel Injector")),
                ("active_name", Value::from("Power Up")),
                ("activation", Value::from("Protocol")),
            ]),
        )
}

#[test]
fn basic_frame_information() {
    let (_env, reg) = setup();
    let ctx = OpCtx::new();
    base_content(&reg, &ctx);
    Frame::unpack(&everest(), &reg, &ctx).unwrap();

    let ever = reg
        .get_cat::<Frame>()
        .lookup_mmid(&ctx, "mf_standard_pattern_i_everest")
        .unwrap()
        .unwrap();
    let f = ever.borrow();
    assert_eq!(f.name, "EVEREST");
    assert_eq!(f.stats.armor, 0);
    assert_eq!(f.stats.sensor_range, 10);
    assert_eq!(f.mounts, vec!["Main", "Flex", "Heavy"]);
    assert_eq!(f.source.as_ref().unwrap().borrow().id, "GMS");

    assert_eq!(f.traits[0].borrow().name, "Initiative");
    let parts = f.traits[1].borrow();
    assert_eq!(parts.name, "Replaceable Parts");
    assert_eq!(parts.effects.bonuses[0].id, "mech_structure_repair_cost");
    assert_eq!(parts.effects.bonuses[0].val, Value::Int(-1));

    let core = f.core_system.as_ref().unwrap().borrow();
    assert_eq!(core.name, "Hyperspec Fuel Injector");
    assert_eq!(core.active.name, "Power Up");
}

#[test]
fn unpacking_creates_one_record_per_child() {
    let (_env, reg) = setup();
    let ctx = OpCtx::new();
    base_content(&reg, &ctx);
    Frame::unpack(&everest(), &reg, &ctx).unwrap();

    assert_eq!(reg.count(EntryType::Frame), 1);
    assert_eq!(reg.count(EntryType::FrameTrait), 2);
    assert_eq!(reg.count(EntryType::CoreSystem), 1);
}

#[test]
fn core_system_integrates_a_weapon() {
    let (_env, reg) = setup();
    let ctx = OpCtx::new();
    base_content(&reg, &ctx);
    MechWeapon::unpack(
        &RawRecord::new()
            .with("id", "mw_lancaster_integrated")
            .with("name", "Integrated Repair Rig")
            .with("source", "IPS-N")
            .with("mount", "Aux")
            .with("type", "Rifle"),
        &reg,
        &ctx,
    )
    .unwrap();
    let lancaster = RawRecord::new()
        .with("id", "mf_lancaster")
        .with("name", "LANCASTER")
        .with("source", "IPS-N")
        .with(
            "core_system",
            record(&[
                ("name", Value::from("Latch Drone")),
                ("integrated", Value::from(vec!["mw_lancaster_integrated", "mw_not_real"])),
            ]),
        );
    Frame::unpack(&lancaster, &reg, &ctx).unwrap();

    let lanny = reg.get_cat::<Frame>().lookup_mmid(&ctx, "mf_lancaster").unwrap().unwrap();
    let frame = lanny.borrow();
    let core = frame.core_system.as_ref().unwrap().borrow();
    assert_eq!(core.attachments.integrated.len(), 1);
    let weapon = core.attachments.integrated[0].downcast::<MechWeapon>().unwrap();
    assert_eq!(weapon.borrow().size, "Aux");
    assert_eq!(weapon.borrow().source.as_ref().unwrap().borrow().id, "IPS-N");
}

#[test]
fn unknown_manufacturer_leaves_source_empty() {
    let (_env, reg) = setup();
    let ctx = OpCtx::new();
    let frame = Frame::unpack(&everest().with("source", "NOBODY"), &reg, &ctx).unwrap();
    assert!(frame.borrow().source.is_none());
}

#[test]
fn frame_copy_keeps_its_core_system() {
    let (env, reg) = setup();
    let dest = env.create_registry("campaign");
    let ctx = OpCtx::new();
    base_content(&reg, &ctx);
    let frame = Frame::unpack(&everest().with("homebrew_note", "kept"), &reg, &ctx).unwrap();

    let copy = frame.insinuate(&dest, None).unwrap();
    let raw = dest.get_raw(EntryType::Frame, copy.key()).unwrap();
    assert_eq!(raw.str("homebrew_note"), Some("kept"));
    assert_eq!(dest.get_cat::<CoreSystem>().len(), 1);
    assert_eq!(copy.borrow().traits.len(), 2);
    assert_eq!(copy.borrow().stats.hp, 10);
}
