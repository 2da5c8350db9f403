//! Integration tests for registry snapshots

use machinemind_foundation::{EntryType, RawRecord};
use machinemind_io::{
    ContentPack, RegistrySnapshot, from_bytes, intake_pack, load_from_file, save_to_file, to_bytes,
};
use machinemind_registry::{OpCtx, Registry};
use machinemind_schema::{Frame, Pilot, PilotArmor, PilotWeapon};

use crate::fixtures::{env, files};

/// Takes the pack in and equips one pilot from the catalog.
fn campaign(reg: &Registry) {
    let ctx = OpCtx::new();
    intake_pack(&ContentPack::from_files(files()).unwrap(), reg, &ctx).unwrap();

    let pilot = reg
        .create_live::<Pilot>(&ctx, RawRecord::new().with("callsign", "Hollow").with("level", 2))
        .unwrap();
    let inventory = pilot.inventory();
    for armor in reg.get_cat::<PilotArmor>().list_live(&ctx).unwrap() {
        armor.insinuate(&inventory, None).unwrap();
    }
    for weapon in reg.get_cat::<PilotWeapon>().list_live(&ctx).unwrap() {
        weapon.insinuate(&inventory, None).unwrap();
    }
}

#[test]
fn snapshot_restores_catalog_and_inventories() {
    let source_env = env(1);
    let reg = source_env.create_registry("global");
    campaign(&reg);
    let bytes = to_bytes(&reg).unwrap();

    let target_env = env(2);
    let restored = from_bytes(&target_env, &bytes).unwrap();
    assert_eq!(restored.total_records(), reg.total_records());
    assert_eq!(restored.inventories().len(), 1);

    let ctx = OpCtx::new();
    let pilot = restored.get_cat::<Pilot>().list_live(&ctx).unwrap().remove(0);
    let p = pilot.borrow();
    assert_eq!(p.callsign, "Hollow");
    assert_eq!(p.owned_armor.len(), 1);
    assert_eq!(p.owned_weapons.len(), 1);
    assert_eq!(p.max_hp(), 6 + 1 + 3);

    let sherman = restored.get_cat::<Frame>().lookup_mmid(&ctx, "mf_sherman").unwrap().unwrap();
    let frame = sherman.borrow();
    let core = frame.core_system.as_ref().unwrap().borrow();
    assert_eq!(core.attachments.integrated.len(), 1);
}

#[test]
fn snapshot_captures_the_same_tree_twice() {
    let reg = env(1).create_registry("global");
    campaign(&reg);
    let first = RegistrySnapshot::capture(&reg);
    let restored = from_bytes(&env(3), &to_bytes(&reg).unwrap()).unwrap();

    assert_eq!(RegistrySnapshot::capture(&restored), first);
    assert_eq!(first.record_count(), reg.total_records() + 2);
}

#[test]
fn restored_registries_keep_working() {
    let reg = env(1).create_registry("global");
    campaign(&reg);
    // Same seed: fresh keys would collide with restored ones if reissued.
    let target_env = env(1);
    let restored = from_bytes(&target_env, &to_bytes(&reg).unwrap()).unwrap();
    let ctx = OpCtx::new();

    let sherman = restored.get_cat::<Frame>().lookup_mmid(&ctx, "mf_sherman").unwrap().unwrap();
    let hangar = target_env.create_registry("hangar");
    let moved = sherman.insinuate(&hangar, None).unwrap();

    assert_eq!(hangar.count(EntryType::Frame), 1);
    assert_eq!(hangar.count(EntryType::MechWeapon), 1);
    assert!(EntryType::ALL.iter().all(|kind| !restored.contains(*kind, moved.key())));
    assert!(moved.borrow().source.as_ref().unwrap().registry().ptr_eq(&restored));
    assert_eq!(restored.count(EntryType::Frame), 1);
}

#[test]
fn snapshot_files_round_trip() {
    let reg = env(1).create_registry("global");
    campaign(&reg);
    let path = std::env::temp_dir().join("machinemind_io_campaign.msgpack");
    save_to_file(&reg, &path).unwrap();

    let restored = load_from_file(&env(2), &path).unwrap();
    assert_eq!(restored.name(), "global");
    assert_eq!(restored.count(EntryType::License), 1);

    let _ = std::fs::remove_file(&path);
}
