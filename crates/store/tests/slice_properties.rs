#![forbid(unsafe_code)]

use fm_core::EntityId;
use fm_core::model::Branch;
use fm_store::{Outcome, Slice};
use proptest::prelude::*;
use proptest::sample::Index;
use std::sync::Arc;

fn branch(id: u64, name: &str) -> Branch {
    Branch {
        id: EntityId::from(id),
        name: name.to_string(),
        manager: String::new(),
        email: String::new(),
        phone: String::new(),
        address: String::new(),
        city: None,
        country: None,
        latitude: None,
        longitude: None,
        status: None,
        ground_maintenance: None,
    }
}

fn numbered(names: &[String]) -> Vec<Branch> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| branch(i as u64 + 1, name))
        .collect()
}

fn loaded(items: Vec<Branch>) -> Slice<Branch> {
    let mut slice = Slice::new();
    slice.fulfilled(Outcome::Fetched(items));
    slice
}

fn snapshot(slice: &Slice<Branch>) -> Vec<Branch> {
    slice.iter().cloned().collect()
}

proptest! {
    #[test]
    fn fetch_replaces_wholesale(
        before in prop::collection::vec("[a-z]{1,6}", 0..12),
        after in prop::collection::vec("[a-z]{1,6}", 0..12),
    ) {
        let mut slice = loaded(numbered(&before));
        let fresh = numbered(&after);
        slice.fulfilled(Outcome::Fetched(fresh.clone()));
        prop_assert_eq!(snapshot(&slice), fresh);
        prop_assert!(!slice.loading());
    }

    #[test]
    fn create_appends_exactly_one(
        names in prop::collection::vec("[a-z]{1,6}", 0..12),
        extra in "[A-Z]{1,6}",
    ) {
        let mut slice = loaded(numbered(&names));
        let before = snapshot(&slice);
        let created = branch(1000, &extra);
        slice.fulfilled(Outcome::Created(created.clone()));

        let after = snapshot(&slice);
        prop_assert_eq!(after.len(), before.len() + 1);
        prop_assert_eq!(&after[..before.len()], &before[..]);
        prop_assert_eq!(after.last(), Some(&created));
    }

    #[test]
    fn update_touches_only_its_index(
        names in prop::collection::vec("[a-z]{1,6}", 1..12),
        pick in any::<Index>(),
        renamed in "[A-Z]{1,6}",
    ) {
        let mut slice = loaded(numbered(&names));
        let before: Vec<Arc<Branch>> = slice.items().iter().cloned().collect();
        let index = pick.index(before.len());
        let replacement = branch(index as u64 + 1, &renamed);
        slice.fulfilled(Outcome::Updated(replacement.clone()));

        let after = slice.items();
        prop_assert_eq!(after.len(), before.len());
        for (i, item) in after.iter().enumerate() {
            if i == index {
                prop_assert_eq!(&**item, &replacement);
            } else {
                prop_assert!(Arc::ptr_eq(item, &before[i]));
            }
        }
    }

    #[test]
    fn delete_removes_every_match_and_keeps_order(
        ids in prop::collection::vec(1u64..6, 0..20),
        target in 1u64..6,
    ) {
        let items: Vec<Branch> = ids.iter().enumerate().map(|(i, id)| branch(*id, &i.to_string())).collect();
        let mut slice = loaded(items.clone());
        slice.fulfilled(Outcome::Deleted(EntityId::from(target)));

        let expected: Vec<Branch> = items.into_iter().filter(|b| b.id != EntityId::from(target)).collect();
        prop_assert_eq!(snapshot(&slice), expected);
    }

    #[test]
    fn updates_for_absent_ids_change_nothing(
        names in prop::collection::vec("[a-z]{1,6}", 0..12),
    ) {
        let mut slice = loaded(numbered(&names));
        let before = Arc::clone(slice.items());
        slice.fulfilled(Outcome::Updated(branch(9999, "ghost")));
        prop_assert!(Arc::ptr_eq(&before, slice.items()));
    }
}
