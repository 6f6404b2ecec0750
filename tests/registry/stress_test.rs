/*!
 * Registry Stress Tests
 * Randomized concurrent interleavings and a key-set model check
 */

use proptest::prelude::*;
use procprofile::{ActiveProfileSetRegistry, Profile, ProfileLayer, ProfileSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;
const OPS_PER_THREAD: usize = 2_000;
const IDENTITIES_PER_THREAD: usize = 6;
const IDENTITIES: usize = 12;
const STAMPS: usize = 3;

fn identity(i: usize) -> String {
    format!("app-{}", i)
}

fn stamp(i: usize) -> String {
    format!("stamp-{}", i)
}

fn make_set(i: usize) -> Arc<ProfileSet> {
    Arc::new(ProfileSet::with_layers(
        Arc::new(Profile::new(identity(i), "app")),
        None,
        Some(Arc::new(Profile::new(stamp(i % STAMPS), "stamp"))),
    ))
}

#[test]
fn test_concurrent_interleavings() {
    let registry = Arc::new(ActiveProfileSetRegistry::new());
    let total = THREADS * IDENTITIES_PER_THREAD;

    // Each thread owns a disjoint identity range for activate/deactivate and
    // tracks what it left registered; updates touch every range.
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(t as u64);
                let owned = t * IDENTITIES_PER_THREAD..(t + 1) * IDENTITIES_PER_THREAD;
                let mut model = BTreeSet::new();
                for _ in 0..OPS_PER_THREAD {
                    let mine = rng.gen_range(owned.clone());
                    let any = rng.gen_range(0..total);
                    match rng.gen_range(0..5) {
                        0 => {
                            registry.activate(make_set(mine)).unwrap();
                            model.insert(mine);
                        }
                        1 => {
                            let removed = registry.deactivate(&make_set(mine));
                            assert_eq!(removed, model.remove(&mine));
                        }
                        2 => {
                            registry.update_identity_layer(Arc::new(Profile::new(
                                identity(any),
                                "edited",
                            )));
                        }
                        3 => {
                            registry.update_stamp_layer(Arc::new(Profile::new(
                                stamp(any % STAMPS),
                                "edited",
                            )));
                        }
                        _ => {
                            // Direct set mutation outside the registry lock
                            if let Some(set) = registry.get(&identity(any)) {
                                set.set_override(None);
                                let _ = set.effective_flags();
                            }
                        }
                    }
                }
                model
            })
        })
        .collect();

    let mut expected: Vec<String> = Vec::new();
    for handle in handles {
        let model = handle.join().unwrap();
        expected.extend(model.into_iter().map(identity));
    }
    expected.sort();

    assert_eq!(registry.identity_ids(), expected);
    assert_eq!(registry.len(), expected.len());
    for id in registry.identity_ids() {
        let set = registry.get(&id).unwrap();
        assert_eq!(set.identity_id(), id);
        assert_eq!(set.identity().id, id);
        let stamp_layer = set.layer(ProfileLayer::Stamp).unwrap();
        assert!(stamp_layer.id.starts_with("stamp-"));
    }
}

#[derive(Debug, Clone)]
enum Op {
    Activate(usize),
    Deactivate(usize),
    UpdateIdentity(usize),
    UpdateStamp(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..IDENTITIES).prop_map(Op::Activate),
        (0..IDENTITIES).prop_map(Op::Deactivate),
        (0..IDENTITIES).prop_map(Op::UpdateIdentity),
        (0..STAMPS).prop_map(Op::UpdateStamp),
    ]
}

proptest! {
    #[test]
    fn registry_matches_key_set_model(ops in prop::collection::vec(arb_op(), 1..64)) {
        let registry = ActiveProfileSetRegistry::new();
        let mut model: BTreeSet<usize> = BTreeSet::new();

        for op in ops {
            match op {
                Op::Activate(i) => {
                    registry.activate(make_set(i)).unwrap();
                    model.insert(i);
                }
                Op::Deactivate(i) => {
                    let removed = registry.deactivate(&make_set(i));
                    prop_assert_eq!(removed, model.remove(&i));
                }
                Op::UpdateIdentity(i) => {
                    let updated = registry
                        .update_identity_layer(Arc::new(Profile::new(identity(i), "edited")));
                    prop_assert_eq!(updated, model.contains(&i));
                }
                Op::UpdateStamp(s) => {
                    let updated = registry
                        .update_stamp_layer(Arc::new(Profile::new(stamp(s), "edited")));
                    let expected = model.iter().filter(|i| *i % STAMPS == s).count();
                    prop_assert_eq!(updated, expected);
                }
            }
        }

        let mut expected: Vec<String> = model.iter().map(|i| identity(*i)).collect();
        expected.sort();
        prop_assert_eq!(registry.identity_ids(), expected);
    }
}
