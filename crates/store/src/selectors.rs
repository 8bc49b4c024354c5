#![forbid(unsafe_code)]

//! Memoized distinct-value projections over slice snapshots.

use crate::slice::Items;
use fm_core::Entity;
use fm_core::model::{Branch, Building, Floor, Space};
use std::collections::HashSet;
use std::sync::Arc;

/// Distinct values in first-occurrence order, blanks skipped.
pub fn distinct<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in values {
        if value.trim().is_empty() || !seen.insert(value) {
            continue;
        }
        out.push(value.to_string());
    }
    out
}

/// Distinct values of one field, recomputed only when the snapshot identity changes.
pub struct Distinct<E> {
    field: fn(&E) -> &str,
    memo: Option<(Items<E>, Arc<Vec<String>>)>,
    recomputations: u64,
}

impl<E: Entity> Distinct<E> {
    pub fn new(field: fn(&E) -> &str) -> Self {
        Self {
            field,
            memo: None,
            recomputations: 0,
        }
    }

    pub fn select(&mut self, items: &Items<E>) -> Arc<Vec<String>> {
        if let Some((seen, out)) = &self.memo
            && Arc::ptr_eq(seen, items)
        {
            return Arc::clone(out);
        }
        let field = self.field;
        let out = Arc::new(distinct(items.iter().map(|item| field(item))));
        self.memo = Some((Arc::clone(items), Arc::clone(&out)));
        self.recomputations += 1;
        out
    }

    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}

impl<E> std::fmt::Debug for Distinct<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Distinct")
            .field("recomputations", &self.recomputations)
            .finish_non_exhaustive()
    }
}

fn branch_name(branch: &Branch) -> &str {
    &branch.name
}

fn building_type(building: &Building) -> &str {
    &building.building_type
}

fn floor_name(floor: &Floor) -> &str {
    &floor.floor_name
}

fn floor_building_name(floor: &Floor) -> &str {
    floor.building_name.as_deref().unwrap_or_default()
}

fn space_name(space: &Space) -> &str {
    &space.space_name
}

fn space_manager(space: &Space) -> &str {
    &space.space_manager
}

pub fn branch_names() -> Distinct<Branch> {
    Distinct::new(branch_name)
}

pub fn building_types() -> Distinct<Building> {
    Distinct::new(building_type)
}

pub fn floor_names() -> Distinct<Floor> {
    Distinct::new(floor_name)
}

/// Building names as recorded on floors (the building filter on the floor page).
pub fn floor_building_names() -> Distinct<Floor> {
    Distinct::new(floor_building_name)
}

pub fn space_names() -> Distinct<Space> {
    Distinct::new(space_name)
}

pub fn space_managers() -> Distinct<Space> {
    Distinct::new(space_manager)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slice::{Outcome, Slice};
    use fm_core::EntityId;
    use fm_core::model::Space;

    fn space(id: u64, name: &str, manager: &str) -> Space {
        Space {
            id: EntityId::from(id),
            space_name: name.to_string(),
            branch_name: "Main".to_string(),
            building_name: "Tower".to_string(),
            floor_name: "Ground".to_string(),
            space_area: "10".to_string(),
            meta_type: "Office".to_string(),
            parent_space: None,
            space_condition: "Good".to_string(),
            space_manager: manager.to_string(),
            space_image: None,
        }
    }

    #[test]
    fn distinct_keeps_first_occurrence_and_skips_blanks() {
        assert_eq!(
            distinct(["b", "", "a", "b", "  ", "c", "a"]),
            vec!["b", "a", "c"]
        );
        assert!(distinct(Vec::<&str>::new()).is_empty());
    }

    #[test]
    fn memoized_until_items_change() {
        let mut slice = Slice::<Space>::new();
        slice.fulfilled(Outcome::Fetched(vec![
            space(1, "Lab", "Ada"),
            space(2, "Hall", "Ada"),
            space(3, "Lab", "Grace"),
        ]));
        let mut managers = space_managers();
        let mut names = space_names();

        let first = managers.select(slice.items());
        let again = managers.select(slice.items());
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(managers.recomputations(), 1);
        assert_eq!(*first, vec!["Ada", "Grace"]);
        assert_eq!(*names.select(slice.items()), vec!["Lab", "Hall"]);

        slice.fulfilled(Outcome::Created(space(4, "Store", "Linus")));
        let after = managers.select(slice.items());
        assert!(!Arc::ptr_eq(&first, &after));
        assert_eq!(managers.recomputations(), 2);
        assert_eq!(*after, vec!["Ada", "Grace", "Linus"]);
    }

    #[test]
    fn orphan_update_does_not_recompute() {
        let mut slice = Slice::<Space>::new();
        slice.fulfilled(Outcome::Fetched(vec![space(1, "Lab", "Ada")]));
        let mut managers = space_managers();
        managers.select(slice.items());

        slice.fulfilled(Outcome::Updated(space(7, "Ghost", "Nobody")));
        managers.select(slice.items());
        assert_eq!(managers.recomputations(), 1);
    }

    #[test]
    fn empty_collection_gives_empty_list() {
        let slice = Slice::<Space>::new();
        assert!(space_names().select(slice.items()).is_empty());
    }
}
