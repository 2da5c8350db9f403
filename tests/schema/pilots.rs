//! Integration tests for pilots, mechs, and licenses

use machinemind_foundation::{EntryType, RawRecord, Value};
use machinemind_registry::OpCtx;
use machinemind_schema::{
    BASE_PILOT_HP, CoreBonus, Faction, Frame, License, Mech, MechSystem, Pilot, PilotArmor,
    assign_mech,
};

use crate::fixtures::{base_content, record, setup};

fn frame(reg: &machinemind_registry::Registry, ctx: &OpCtx) -> machinemind_registry::Live<Frame> {
    let stats = record(&[
        ("hp", Value::Int(8)),
        ("structure", Value::Int(4)),
        ("stress", Value::Int(4)),
        ("repcap", Value::Int(5)),
        ("sp", Value::Int(6)),
    ]);
    Frame::unpack(
        &RawRecord::new()
            .with("id", "mf_standard_pattern_i_everest")
            .with("name", "EVEREST")
            .with("source", "GMS")
            .with("stats", stats),
        reg,
        ctx,
    )
    .unwrap()
}

#[test]
fn pilot_holds_foreign_catalog_entries() {
    let (_env, reg) = setup();
    let ctx = OpCtx::new();
    base_content(&reg, &ctx);
    frame(&reg, &ctx);
    let union = RawRecord::new().with("id", "f_union").with("name", "Union");
    let faction = Faction::unpack(&union, &reg, &ctx).unwrap();
    let bonus = CoreBonus::unpack(
        &RawRecord::new()
            .with("id", "cb_integrated_weapon")
            .with("name", "Integrated Weapon")
            .with("source", "GMS"),
        &reg,
        &ctx,
    )
    .unwrap();
    let license = License::unpack(
        &RawRecord::new()
            .with("name", "EVEREST")
            .with("manufacturer", "GMS")
            .with("rank", 2)
            .with("unlocks", vec!["mf_standard_pattern_i_everest"]),
        &reg,
        &ctx,
    )
    .unwrap();

    let pilot = reg.get_cat::<Pilot>().create_default(&ctx).unwrap();
    {
        let mut p = pilot.borrow_mut();
        p.callsign = "Hollow".to_string();
        p.level = 3;
        p.faction = Some(faction.clone());
        p.core_bonuses.push(bonus.clone());
        p.licenses.push(license.clone());
    }
    pilot.writeback().unwrap();

    let fresh = pilot.refreshed(&OpCtx::new()).unwrap();
    let p = fresh.borrow();
    assert_eq!(p.callsign, "Hollow");
    assert_eq!(p.faction.as_ref().unwrap().borrow().name, "Union");
    assert_eq!(p.core_bonuses[0].borrow().id, "cb_integrated_weapon");
    assert_eq!(p.license_ranks(), 2);
    let held = p.licenses[0].borrow();
    assert_eq!(held.unlocks[0].kind(), EntryType::Frame);
    assert_eq!(held.unlocked_at_rank().len(), 1);
}

#[test]
fn max_hp_counts_grit_and_owned_armor() {
    let (_env, reg) = setup();
    let ctx = OpCtx::new();
    let pilot = reg
        .create_live::<Pilot>(&ctx, RawRecord::new().with("level", 4))
        .unwrap();
    assert_eq!(pilot.borrow().max_hp(), BASE_PILOT_HP + 2);

    let armor = reg.get_cat::<PilotArmor>().create_default(&ctx).unwrap();
    armor.insinuate(&pilot.inventory(), None).unwrap();
    let fresh = pilot.refreshed(&OpCtx::new()).unwrap();
    assert_eq!(fresh.borrow().max_hp(), BASE_PILOT_HP + 2 + 3);
}

#[test]
fn mech_repairs_to_its_frame() {
    let (_env, reg) = setup();
    let ctx = OpCtx::new();
    base_content(&reg, &ctx);
    let everest = frame(&reg, &ctx);
    let system = reg
        .create_live::<MechSystem>(
            &ctx,
            RawRecord::new().with("name", "Pattern-A Jericho").with("sp", 2),
        )
        .unwrap();
    let mech = reg
        .create_live::<Mech>(&ctx, RawRecord::new().with("current_hp", 1).with("current_heat", 4))
        .unwrap();
    {
        let mut m = mech.borrow_mut();
        m.loadout.frame = Some(everest);
        m.loadout.systems.push(system);
        m.full_repair();
    }
    mech.writeback().unwrap();

    let fresh = mech.refreshed(&OpCtx::new()).unwrap();
    let m = fresh.borrow();
    assert_eq!(m.current_hp, 8);
    assert_eq!(m.current_heat, 0);
    assert_eq!(m.current_repairs, 5);
    assert_eq!(m.sp_used(), 2);
}

#[test]
fn moving_a_mech_brings_its_loadout_but_not_its_frame() {
    let (env, reg) = setup();
    let ctx = OpCtx::new();
    base_content(&reg, &ctx);
    let everest = frame(&reg, &ctx);
    let system = reg
        .create_live::<MechSystem>(&ctx, RawRecord::new().with("name", "Pattern-A Jericho"))
        .unwrap();
    let pilot = reg.get_cat::<Pilot>().create_default(&ctx).unwrap();
    let mech = reg.get_cat::<Mech>().create_default(&ctx).unwrap();
    {
        let mut m = mech.borrow_mut();
        m.loadout.frame = Some(everest.clone());
        m.loadout.systems.push(system);
    }
    assign_mech(&pilot, &mech);
    mech.writeback().unwrap();
    pilot.writeback().unwrap();

    let hangar = env.create_registry("hangar");
    let moved = mech.insinuate(&hangar, None).unwrap();

    assert_eq!(hangar.count(EntryType::Mech), 1);
    assert_eq!(hangar.count(EntryType::MechSystem), 1);
    assert_eq!(hangar.count(EntryType::Frame), 0);
    assert_eq!(hangar.count(EntryType::Pilot), 0);
    let m = moved.borrow();
    assert!(m.loadout.frame.as_ref().unwrap().registry().ptr_eq(&reg));
    assert!(m.pilot.as_ref().unwrap().registry().ptr_eq(&reg));
    assert!(m.loadout.systems[0].registry().ptr_eq(&hangar));
}
