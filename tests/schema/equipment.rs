//! Integration tests for mech and pilot equipment

use machinemind_foundation::{EntryType, ErrorKind, RawRecord, Value};
use machinemind_registry::OpCtx;
use machinemind_schema::{Deployable, MechSystem, MechWeapon, PilotEquipment, WeaponMod};

use crate::fixtures::{base_content, record, setup, tag};

#[test]
fn flat_weapon_becomes_one_profile() {
    let (_env, reg) = setup();
    let ctx = OpCtx::new();
    base_content(&reg, &ctx);

    let weapon = MechWeapon::unpack(
        &RawRecord::new()
            .with("id", "mw_thermal_rifle")
            .with("name", "Thermal Rifle")
            .with("source", "GMS")
            .with("mount", "Main")
            .with("type", "Rifle")
            .with("sp", 0)
            .with(
                "damage",
                vec![record(&[("type", Value::from("Energy")), ("val", Value::Int(2))])],
            )
            .with("range", vec![record(&[("type", Value::from("Range")), ("val", Value::Int(8))])])
            .with("tags", vec![tag("tg_heat_self", Some(1)), tag("tg_nowhere", None)]),
        &reg,
        &ctx,
    )
    .unwrap();

    let w = weapon.borrow();
    assert_eq!(w.profiles.len(), 1);
    let profile = w.profile().unwrap();
    assert_eq!(profile.kind, "Rifle");
    assert_eq!(profile.damage[0].val, Value::Int(2));
    assert_eq!(profile.range[0].kind, "Range");
    assert_eq!(profile.tags.len(), 1);
    assert_eq!(profile.tags[0].display_name(), "Heat 1 (Self)");

    let raw = reg.get_raw(EntryType::MechWeapon, weapon.key()).unwrap();
    assert!(!raw.contains("damage"));
}

#[test]
fn multi_profile_weapons_keep_every_profile() {
    let (_env, reg) = setup();
    let ctx = OpCtx::new();
    base_content(&reg, &ctx);

    let profiles = vec![
        record(&[("name", Value::from("Ranged")), ("type", Value::from("Cannon"))]),
        record(&[("name", Value::from("Melee")), ("type", Value::from("Melee"))]),
    ];
    let weapon = MechWeapon::unpack(
        &RawRecord::new()
            .with("id", "mw_kraul_rifle")
            .with("name", "Kraul Rifle")
            .with("mount", "Heavy")
            .with("profiles", profiles),
        &reg,
        &ctx,
    )
    .unwrap();

    let w = weapon.borrow();
    assert_eq!(w.profiles.len(), 2);
    assert_eq!(w.profiles[1].name, "Melee");
    assert_eq!(w.size, "Heavy");
}

#[test]
fn system_owns_its_inline_deployables() {
    let (env, reg) = setup();
    let ctx = OpCtx::new();
    base_content(&reg, &ctx);

    let deployable = record(&[
        ("name", Value::from("Turret Drone")),
        ("type", Value::from("Drone")),
        ("hp", Value::Int(5)),
        ("tags", Value::from(vec![tag("tg_unique", None)])),
    ]);
    let system = MechSystem::unpack(
        &RawRecord::new()
            .with("id", "ms_turret_drones")
            .with("name", "Turret Drones")
            .with("source", "GMS")
            .with("license", "Everest")
            .with("tags", vec![tag("tg_limited", Some(3))])
            .with("deployables", vec![deployable]),
        &reg,
        &ctx,
    )
    .unwrap();

    let s = system.borrow();
    assert_eq!(s.tags[0].display_name(), "Limited 3");
    let drone = s.attachments.deployables[0].borrow();
    assert_eq!(drone.name, "Turret Drone");
    assert_eq!(drone.max_hp, 5);
    assert_eq!(drone.current_hp, 5);
    assert_eq!(drone.tags[0].display_name(), "Unique");

    let dest = env.create_registry("campaign");
    system.insinuate(&dest, None).unwrap();
    assert_eq!(dest.get_cat::<Deployable>().len(), 1);
    assert_eq!(dest.count(EntryType::TagTemplate), 0);
}

#[test]
fn mods_check_weapon_type_and_size() {
    let (_env, reg) = setup();
    let ctx = OpCtx::new();
    base_content(&reg, &ctx);

    let m = WeaponMod::unpack(
        &RawRecord::new()
            .with("id", "wm_nanocomposite_adaptation")
            .with("name", "Nanocomposite Adaptation")
            .with("source", "GMS")
            .with("allowed_types", vec!["Rifle", "Cannon"])
            .with("restricted_sizes", vec!["Superheavy"]),
        &reg,
        &ctx,
    )
    .unwrap();

    let m = m.borrow();
    assert_eq!(m.allowed_types, vec!["Rifle", "Cannon"]);
    assert_eq!(m.source.as_ref().unwrap().borrow().id, "GMS");
    assert!(m.accepts("Rifle", "Main"));
    assert!(!m.accepts("Melee", "Main"));
    assert!(!m.accepts("Cannon", "Superheavy"));
}

#[test]
fn pilot_gear_dispatches_on_type() {
    let (_env, reg) = setup();
    let ctx = OpCtx::new();

    let armor = PilotEquipment::unpack(
        &RawRecord::new()
            .with("id", "pg_mobility_hardsuit")
            .with("name", "Mobility Hardsuit")
            .with("type", "Armor"),
        &reg,
        &ctx,
    )
    .unwrap();
    let weapon = PilotEquipment::unpack(
        &RawRecord::new().with("id", "pg_sidearm").with("name", "Sidearm").with("type", "Weapon"),
        &reg,
        &ctx,
    )
    .unwrap();

    assert_eq!(armor.kind(), EntryType::PilotArmor);
    assert_eq!(weapon.kind(), EntryType::PilotWeapon);
    assert_eq!(reg.count(EntryType::PilotArmor), 1);
    assert_eq!(reg.count(EntryType::PilotGear), 0);

    let err =
        PilotEquipment::unpack(&RawRecord::new().with("name", "Boat"), &reg, &ctx).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidValue { .. }));
}
