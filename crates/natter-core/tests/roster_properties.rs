//! Property-based tests for the roster.
//!
//! After any sequence of joins and leaves, the list the sink last rendered
//! must be exactly the active slots in ascending id order.

use std::collections::BTreeMap;

use natter_core::{CAPACITY, RecordingSink, Roster};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Join(i64, String),
    Leave(i64),
}

/// Ids mostly in range, with some just outside either end.
fn arbitrary_id() -> impl Strategy<Value = i64> {
    prop_oneof![
        8 => 0i64..CAPACITY as i64,
        1 => -5i64..0,
        1 => CAPACITY as i64..CAPACITY as i64 + 5,
    ]
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (arbitrary_id(), "[a-z]{1,8}").prop_map(|(id, name)| Op::Join(id, name)),
        2 => arbitrary_id().prop_map(Op::Leave),
    ]
}

proptest! {
    #[test]
    fn prop_rendered_list_matches_model(ops in prop::collection::vec(arbitrary_op(), 1..80)) {
        let mut roster = Roster::new();
        let mut sink = RecordingSink::new();
        let mut model: BTreeMap<usize, String> = BTreeMap::new();

        for op in &ops {
            match op {
                Op::Join(id, name) => {
                    let applied = roster.set_active(*id, name, &mut sink);
                    match usize::try_from(*id).ok().filter(|&index| index < CAPACITY) {
                        Some(index) => {
                            model.insert(index, name.clone());
                            prop_assert!(applied);
                        },
                        None => prop_assert!(!applied),
                    }
                },
                Op::Leave(id) => {
                    roster.set_inactive(*id, &mut sink);
                    if let Ok(index) = usize::try_from(*id) {
                        model.remove(&index);
                    }
                },
            }
        }

        let expected: Vec<(usize, &str)> =
            model.iter().map(|(id, name)| (*id, name.as_str())).collect();
        let active: Vec<(usize, &str)> = roster.active().collect();

        prop_assert_eq!(&active, &expected);
        prop_assert_eq!(roster.len(), expected.len());

        // The sink only sees refreshes for in-range changes, so it can lag
        // behind when every op was out of range.
        if sink.events().is_empty() {
            prop_assert!(expected.is_empty());
        } else {
            prop_assert_eq!(sink.user_list(), expected);
        }
    }

    #[test]
    fn prop_join_then_leave_removes_id(id in 0i64..CAPACITY as i64, name in "[a-z]{1,8}") {
        let mut roster = Roster::new();
        let mut sink = RecordingSink::new();

        roster.set_active(id, &name, &mut sink);
        roster.set_inactive(id, &mut sink);

        prop_assert!(sink.user_list().iter().all(|(slot, _)| *slot as i64 != id));
        prop_assert!(roster.is_empty());
    }
}
