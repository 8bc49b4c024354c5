#![forbid(unsafe_code)]

use super::Gateway;
use crate::error::GatewayError;
use fm_core::wire::{merge_patch, next_id, record_id, replace_keeping_id};
use fm_core::{Entity, EntityId, EntityKind, UpdateMethod};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

type Record = Map<String, Value>;

/// In-process backend with the same record semantics as the data service.
/// Failures can be queued per collection to exercise rejection paths.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    collections: Mutex<BTreeMap<EntityKind, Vec<Record>>>,
    failures: Mutex<VecDeque<(EntityKind, GatewayError)>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn to_record(value: &impl Serialize) -> Result<Record, GatewayError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(GatewayError::Decode(format!("expected a JSON object, got {other}"))),
        Err(err) => Err(GatewayError::Decode(err.to_string())),
    }
}

fn from_record<T: DeserializeOwned>(record: &Record) -> Result<T, GatewayError> {
    serde_json::from_value(Value::Object(record.clone()))
        .map_err(|err| GatewayError::Decode(err.to_string()))
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed<E: Entity>(&self, items: &[E]) -> Result<(), GatewayError> {
        let records = items.iter().map(to_record).collect::<Result<Vec<_>, _>>()?;
        lock(&self.collections)
            .entry(E::KIND)
            .or_default()
            .extend(records);
        Ok(())
    }

    /// Queue a failure for the next call touching `kind`.
    pub fn fail_next(&self, kind: EntityKind, error: GatewayError) {
        lock(&self.failures).push_back((kind, error));
    }

    pub fn records(&self, kind: EntityKind) -> Vec<Value> {
        lock(&self.collections)
            .get(&kind)
            .map(|records| records.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    fn injected(&self, kind: EntityKind) -> Result<(), GatewayError> {
        let mut failures = lock(&self.failures);
        match failures.iter().position(|(k, _)| *k == kind) {
            Some(index) => match failures.remove(index) {
                Some((_, err)) => Err(err),
                None => Ok(()),
            },
            None => Ok(()),
        }
    }
}

impl<E: Entity> Gateway<E> for MemoryGateway {
    fn list(&self) -> Result<Vec<E>, GatewayError> {
        self.injected(E::KIND)?;
        let collections = lock(&self.collections);
        collections
            .get(&E::KIND)
            .map(|records| records.iter().map(from_record).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn create(&self, draft: &E::Draft) -> Result<E, GatewayError> {
        self.injected(E::KIND)?;
        let mut record = to_record(draft)?;
        let mut collections = lock(&self.collections);
        let records = collections.entry(E::KIND).or_default();
        let id = next_id(records.iter());
        record.insert("id".to_string(), Value::String(id.into_string()));
        let created = from_record(&record)?;
        records.push(record);
        Ok(created)
    }

    fn update(&self, id: &EntityId, patch: &E::Patch) -> Result<E, GatewayError> {
        self.injected(E::KIND)?;
        let body = to_record(patch)?;
        let mut collections = lock(&self.collections);
        let record = collections
            .get_mut(&E::KIND)
            .and_then(|records| {
                records
                    .iter_mut()
                    .find(|record| record_id(record).as_ref() == Some(id))
            })
            .ok_or(GatewayError::NotFound)?;
        match E::KIND.update_method() {
            UpdateMethod::Patch => merge_patch(record, &body),
            UpdateMethod::Put => *record = replace_keeping_id(&body, id),
        }
        from_record(record)
    }

    fn delete(&self, id: &EntityId) -> Result<EntityId, GatewayError> {
        self.injected(E::KIND)?;
        let mut collections = lock(&self.collections);
        let records = collections.get_mut(&E::KIND).ok_or(GatewayError::NotFound)?;
        let index = records
            .iter()
            .position(|record| record_id(record).as_ref() == Some(id))
            .ok_or(GatewayError::NotFound)?;
        records.remove(index);
        Ok(id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fm_core::model::{Branch, BranchDraft, BranchPatch, Floor, FloorDraft};

    fn draft(name: &str) -> BranchDraft {
        BranchDraft {
            name: name.to_string(),
            manager: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: "0123456789".to_string(),
            address: "1 High St".to_string(),
            ..BranchDraft::default()
        }
    }

    #[test]
    fn create_assigns_sequential_string_ids() {
        let gateway = MemoryGateway::new();
        let a: Branch = gateway.create(&draft("A")).expect("create a");
        let b: Branch = gateway.create(&draft("B")).expect("create b");
        assert_eq!(a.id.as_str(), "1");
        assert_eq!(b.id.as_str(), "2");
        assert_eq!(gateway.records(EntityKind::Branch)[1]["id"], "2");
    }

    #[test]
    fn patch_merges_fields() {
        let gateway = MemoryGateway::new();
        let created: Branch = gateway.create(&draft("A")).expect("create");
        let patch = BranchPatch {
            name: Some("Renamed".to_string()),
            ..BranchPatch::default()
        };
        let updated: Branch = gateway.update(&created.id, &patch).expect("update");
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.manager, "Ada");
    }

    #[test]
    fn put_replaces_the_record() {
        let gateway = MemoryGateway::new();
        let floor = FloorDraft {
            floor_name: "Ground".to_string(),
            branch_id: EntityId::from(1),
            building_id: EntityId::from(1),
            building_name: Some("Tower".to_string()),
            floor_number: 0,
            total_area: 100.0,
            floor_plan: Some("data:image/png;base64,AA==".to_string()),
            status: None,
            ground_maintenance: None,
        };
        let created: Floor = gateway.create(&floor).expect("create");
        let replacement = FloorDraft {
            floor_plan: None,
            floor_name: "First".to_string(),
            ..floor
        };
        let updated: Floor = gateway.update(&created.id, &replacement).expect("update");
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.floor_name, "First");
        assert_eq!(updated.floor_plan, None);
    }

    #[test]
    fn missing_ids_are_not_found() {
        let gateway = MemoryGateway::new();
        let err = Gateway::<Branch>::delete(&gateway, &EntityId::from(5)).unwrap_err();
        assert!(err.is_not_found());
        let err = Gateway::<Branch>::update(&gateway, &EntityId::from(5), &BranchPatch::default())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn injected_failures_hit_only_their_collection_once() {
        let gateway = MemoryGateway::new();
        gateway.fail_next(EntityKind::Floor, GatewayError::Status { status: 500 });

        assert!(Gateway::<Branch>::list(&gateway).expect("branches").is_empty());
        assert!(Gateway::<Floor>::list(&gateway).is_err());
        assert!(Gateway::<Floor>::list(&gateway).is_ok());
    }
}
