//! Property tests over storage and insinuation.

use std::collections::{BTreeMap, HashSet};

use machinemind_foundation::{EntryType, RawRecord, Value};
use machinemind_registry::{OpCtx, RegEnv, RegistryConfig};
use machinemind_schema::{Frame, Manufacturer};
use proptest::prelude::*;

fn env(seed: u64) -> RegEnv {
    machinemind_schema::standard_env(RegistryConfig::deterministic(seed)).unwrap()
}

fn frame_with_traits(names: &[String]) -> RawRecord {
    let traits: Vec<Value> = names
        .iter()
        .map(|name| {
            RawRecord::new()
                .with("name", name.as_str())
                .with("description", "")
                .into_value()
        })
        .collect();
    RawRecord::new()
        .with("id", "mf_prop")
        .with("name", "PROP")
        .with("traits", traits)
}

proptest! {
    #[test]
    fn creates_and_deletes_keep_storage_order(
        seed in any::<u64>(),
        names in prop::collection::vec("[A-Z]{1,6}", 1..12),
        drop_mask in prop::collection::vec(any::<bool>(), 12),
    ) {
        let env = env(seed);
        let reg = env.create_registry("global");
        let cat = reg.get_cat::<Manufacturer>();
        let ctx = OpCtx::new();

        let mut created = Vec::new();
        for name in &names {
            let m = cat
                .create_live(
                    &ctx,
                    RawRecord::new().with("id", name.as_str()).with("name", name.as_str()),
                )
                .unwrap();
            created.push(m.key().clone());
        }
        prop_assert_eq!(cat.len(), names.len());
        prop_assert_eq!(reg.keys(EntryType::Manufacturer), created.clone());

        let kept: Vec<_> = created
            .iter()
            .zip(&drop_mask)
            .filter_map(|(key, drop)| {
                if *drop {
                    cat.delete(key);
                    None
                } else {
                    Some(key.clone())
                }
            })
            .collect();
        prop_assert_eq!(cat.len(), kept.len());
        prop_assert_eq!(cat.list_keys(), kept);
    }

    #[test]
    fn insinuated_frames_are_disjoint_copies(
        traits in prop::collection::vec("[a-z]{1,10}", 0..6),
    ) {
        let env = env(5);
        let source = env.create_registry("source");
        let dest = env.create_registry("dest");
        let ctx = OpCtx::new();
        let frame = Frame::unpack(&frame_with_traits(&traits), &source, &ctx).unwrap();
        let before: Vec<_> = source.kinds().into_iter().map(|k| (k, source.list_raw(k))).collect();

        let copy = frame.insinuate(&dest, None).unwrap();

        prop_assert_eq!(dest.count(EntryType::Frame), 1);
        prop_assert_eq!(dest.count(EntryType::FrameTrait), traits.len());
        prop_assert_eq!(dest.total_records(), source.total_records());
        let after: Vec<_> = source.kinds().into_iter().map(|k| (k, source.list_raw(k))).collect();
        prop_assert_eq!(before, after);

        let source_keys: HashSet<_> = source
            .kinds()
            .into_iter()
            .flat_map(|k| source.keys(k))
            .collect();
        let mut dest_keys = dest.kinds().into_iter().flat_map(|k| dest.keys(k));
        prop_assert!(dest_keys.all(|k| !source_keys.contains(&k)));

        let names: Vec<_> = copy.borrow().traits.iter().map(|t| t.borrow().name.clone()).collect();
        prop_assert_eq!(names, traits);
    }

    #[test]
    fn writeback_keeps_fields_it_does_not_know(
        extras in prop::collection::btree_map("x_[a-z]{1,8}", "[ -~]{0,16}", 0..6),
        rename in "[A-Z]{1,8}",
    ) {
        let env = env(9);
        let reg = env.create_registry("global");
        let ctx = OpCtx::new();
        let mut fields = RawRecord::new().with("id", "GMS").with("name", "GMS");
        for (field, value) in &extras {
            fields = fields.with(field.as_str(), value.as_str());
        }
        let m = reg.create_live::<Manufacturer>(&ctx, fields).unwrap();
        m.borrow_mut().name = rename.clone();
        m.writeback().unwrap();

        let raw = reg.get_raw(EntryType::Manufacturer, m.key()).unwrap();
        prop_assert_eq!(raw.str("name"), Some(rename.as_str()));
        let kept: BTreeMap<String, String> = extras
            .keys()
            .filter_map(|field| raw.str(field).map(|v| (field.clone(), v.to_string())))
            .collect();
        prop_assert_eq!(kept, extras);
    }
}
