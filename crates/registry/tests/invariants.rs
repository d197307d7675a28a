//! Property tests: counters and rewards stay consistent under arbitrary
//! sequences of operations, and failed operations change nothing.

use ikf_registry::*;
use ikf_token::{KnowledgeToken, RewardIssuer};
use ikf_types::{Address, ContentHash, FileStatus};
use proptest::prelude::*;
use std::sync::Arc;

const FILES: [&str; 5] = ["a.txt", "b.txt", "c.txt", "d.txt", "e.txt"];
const CATEGORIES: [&str; 3] = ["doc", "image", ""];

#[derive(Debug, Clone)]
enum Op {
    Create { file: usize, user: usize, size: u64, category: usize },
    Update { file: usize, user: usize, size: u64 },
    Approve { file: usize, user: usize, reward: u64 },
    Reject { file: usize, user: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..FILES.len(), 0..3usize, 0..3u64, 0..CATEGORIES.len())
            .prop_map(|(file, user, size, category)| Op::Create { file, user, size, category }),
        (0..FILES.len(), 0..3usize, 0..500u64)
            .prop_map(|(file, user, size)| Op::Update { file, user, size }),
        (0..FILES.len(), 0..3usize, 0..1_000u64)
            .prop_map(|(file, user, reward)| Op::Approve { file, user, reward }),
        (0..FILES.len(), 0..3usize).prop_map(|(file, user)| Op::Reject { file, user }),
    ]
}

/// User 0 is the administrator; any user may also contribute.
fn user(i: usize) -> Address {
    Address::from_label(&format!("user{i}"))
}

fn setup() -> (KnowledgeRegistry, Arc<KnowledgeToken>) {
    let admin = user(0);
    let registry_addr = Address::from_label("registry");
    let token = Arc::new(KnowledgeToken::new(Address::from_label("token"), admin, 0));
    token.add_minter(&admin, registry_addr).unwrap();
    let registry =
        KnowledgeRegistry::new(RegistryConfig::new(registry_addr, admin), token.clone()).unwrap();
    (registry, token)
}

fn apply(registry: &KnowledgeRegistry, op: &Op) -> Result<()> {
    match *op {
        Op::Create { file, user: u, size, category } => registry.create(
            &user(u),
            FileSubmission {
                filename: FILES[file].to_string(),
                content_hash: ContentHash::of(&size.to_le_bytes()),
                size,
                category: CATEGORIES[category].to_string(),
                metadata: String::new(),
            },
        ),
        Op::Update { file, user: u, size } => registry.update(
            &user(u),
            FileRevision {
                filename: FILES[file].to_string(),
                content_hash: ContentHash::of(&size.to_le_bytes()),
                size,
                metadata: "{}".to_string(),
            },
        ),
        Op::Approve { file, user: u, reward } => {
            registry.approve(&user(u), FILES[file], reward as u128)
        }
        Op::Reject { file, user: u } => registry.reject(&user(u), FILES[file], "no"),
    }
}

proptest! {
    #[test]
    fn counters_and_rewards_stay_consistent(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let (registry, token) = setup();

        for op in &ops {
            let before = registry.snapshot();
            let result = apply(&registry, op);
            let stats = registry.stats();

            prop_assert!(stats.is_consistent(), "inconsistent after {:?}: {:?}", op, stats);
            for status in FileStatus::ALL {
                prop_assert_eq!(
                    registry.list_by_status(status).len() as u64,
                    stats.count_of(status)
                );
            }
            prop_assert_eq!(stats.total_tokens_rewarded, token.total_supply());
            let minted: u128 = (0..3).map(|u| token.balance_of(&user(u))).sum();
            prop_assert_eq!(stats.total_tokens_rewarded, minted);

            if result.is_err() {
                prop_assert_eq!(registry.snapshot(), before);
            } else {
                prop_assert_eq!(registry.events().len(), before.events.len() + 1);
            }
        }
    }

    #[test]
    fn approved_files_are_frozen(reward in 0..1_000u64, size in 1..1_000u64) {
        let (registry, _) = setup();
        let owner = user(1);
        registry.create(&owner, FileSubmission {
            filename: "frozen.txt".into(),
            content_hash: ContentHash::of(b"v1"),
            size,
            category: "doc".into(),
            metadata: String::new(),
        }).unwrap();
        registry.approve(&user(0), "frozen.txt", reward as u128).unwrap();
        let approved = registry.file("frozen.txt").unwrap();

        for caller in [user(0), user(1), user(2)] {
            let err = registry.update(&caller, FileRevision {
                filename: "frozen.txt".into(),
                content_hash: ContentHash::of(b"v2"),
                size: size + 1,
                metadata: "changed".into(),
            }).unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::InvalidState);
        }
        prop_assert_eq!(registry.file("frozen.txt").unwrap(), approved);
    }
}
