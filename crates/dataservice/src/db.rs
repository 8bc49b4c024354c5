#![forbid(unsafe_code)]

use fm_core::wire::{merge_patch, next_id, record_id, replace_keeping_id};
use fm_core::{EntityId, EntityKind};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

pub type Record = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("unknown collection {0:?}")]
    UnknownCollection(String),
    #[error("{collection}/{id} not found")]
    NotFound { collection: String, id: EntityId },
    #[error("request body must be a JSON object")]
    NotAnObject,
    #[error("id {0} already exists")]
    DuplicateId(EntityId),
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DataError {
    pub fn status(&self) -> u16 {
        match self {
            Self::UnknownCollection(_) | Self::NotFound { .. } => 404,
            Self::NotAnObject | Self::InvalidDocument(_) | Self::Json(_) => 400,
            Self::DuplicateId(_) => 409,
            Self::Io(_) => 500,
        }
    }
}

fn into_record(body: Value) -> Result<Record, DataError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(DataError::NotAnObject),
    }
}

/// Named collections of JSON records. The four console collections always exist;
/// a seed document may add more.
#[derive(Clone, Debug)]
pub struct Database {
    collections: BTreeMap<String, Vec<Record>>,
}

impl Default for Database {
    fn default() -> Self {
        let collections = EntityKind::ALL
            .iter()
            .map(|kind| (kind.collection().to_string(), Vec::new()))
            .collect();
        Self { collections }
    }
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// `{ "branches": [ {...}, ... ], "buildings": [...], ... }`
    pub fn from_document(doc: Value) -> Result<Self, DataError> {
        let Value::Object(top) = doc else {
            return Err(DataError::InvalidDocument("top level must be an object".to_string()));
        };
        let mut db = Self::default();
        for (name, value) in top {
            let Value::Array(rows) = value else {
                return Err(DataError::InvalidDocument(format!("{name:?} must be an array")));
            };
            let records = rows
                .into_iter()
                .map(|row| {
                    into_record(row).map_err(|_| {
                        DataError::InvalidDocument(format!("{name:?} rows must be objects"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            db.collections.insert(name, records);
        }
        Ok(db)
    }

    pub fn load(path: &Path) -> Result<Self, DataError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_document(serde_json::from_str(&raw)?)
    }

    /// Write the document next to `path` and rename it into place.
    pub fn save(&self, path: &Path) -> Result<(), DataError> {
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(&self.to_document())?;
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn to_document(&self) -> Value {
        Value::Object(
            self.collections
                .iter()
                .map(|(name, records)| {
                    let rows = records.iter().cloned().map(Value::Object).collect();
                    (name.clone(), Value::Array(rows))
                })
                .collect(),
        )
    }

    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    pub fn list(&self, collection: &str) -> Result<&[Record], DataError> {
        self.collections
            .get(collection)
            .map(Vec::as_slice)
            .ok_or_else(|| DataError::UnknownCollection(collection.to_string()))
    }

    fn records_mut(&mut self, collection: &str) -> Result<&mut Vec<Record>, DataError> {
        self.collections
            .get_mut(collection)
            .ok_or_else(|| DataError::UnknownCollection(collection.to_string()))
    }

    fn position(records: &[Record], collection: &str, id: &EntityId) -> Result<usize, DataError> {
        records
            .iter()
            .position(|record| record_id(record).as_ref() == Some(id))
            .ok_or_else(|| DataError::NotFound {
                collection: collection.to_string(),
                id: id.clone(),
            })
    }

    pub fn get(&self, collection: &str, id: &EntityId) -> Result<&Record, DataError> {
        let records = self.list(collection)?;
        let index = Self::position(records, collection, id)?;
        Ok(&records[index])
    }

    /// Append a record. A missing id is assigned as one past the largest numeric id.
    pub fn insert(&mut self, collection: &str, body: Value) -> Result<Record, DataError> {
        let mut record = into_record(body)?;
        let records = self.records_mut(collection)?;
        let id = match record_id(&record) {
            Some(id) if records.iter().any(|r| record_id(r).as_ref() == Some(&id)) => {
                return Err(DataError::DuplicateId(id));
            }
            Some(id) => id,
            None => next_id(records.iter()),
        };
        record.insert("id".to_string(), Value::String(id.into_string()));
        records.push(record.clone());
        Ok(record)
    }

    pub fn patch(&mut self, collection: &str, id: &EntityId, body: Value) -> Result<Record, DataError> {
        let patch = into_record(body)?;
        let records = self.records_mut(collection)?;
        let index = Self::position(records, collection, id)?;
        merge_patch(&mut records[index], &patch);
        Ok(records[index].clone())
    }

    pub fn replace(&mut self, collection: &str, id: &EntityId, body: Value) -> Result<Record, DataError> {
        let body = into_record(body)?;
        let records = self.records_mut(collection)?;
        let index = Self::position(records, collection, id)?;
        records[index] = replace_keeping_id(&body, id);
        Ok(records[index].clone())
    }

    pub fn remove(&mut self, collection: &str, id: &EntityId) -> Result<Record, DataError> {
        let records = self.records_mut(collection)?;
        let index = Self::position(records, collection, id)?;
        Ok(records.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded() -> Database {
        Database::from_document(json!({
            "branches": [
                { "id": 1, "name": "Main" },
                { "id": "4", "name": "North" }
            ],
            "audits": []
        }))
        .expect("seed document")
    }

    #[test]
    fn default_has_every_console_collection() {
        let db = Database::new();
        let names: Vec<_> = db.collection_names().collect();
        assert_eq!(names, vec!["branches", "buildings", "floors", "spaces"]);
    }

    #[test]
    fn seed_keeps_extra_collections_and_numeric_ids() {
        let db = seeded();
        assert!(db.list("audits").expect("extra collection").is_empty());
        let main = db.get("branches", &EntityId::from(1)).expect("numeric id matches");
        assert_eq!(main["name"], "Main");
    }

    #[test]
    fn insert_assigns_next_numeric_id_as_string() {
        let mut db = seeded();
        let created = db
            .insert("branches", json!({ "name": "South" }))
            .expect("insert");
        assert_eq!(created["id"], "5");
        assert_eq!(db.list("branches").expect("list").len(), 3);

        let err = db.insert("branches", json!({ "id": "5" })).unwrap_err();
        assert_eq!(err.status(), 409);
    }

    #[test]
    fn patch_and_replace_keep_the_id() {
        let mut db = seeded();
        let id = EntityId::from(4);
        let patched = db
            .patch("branches", &id, json!({ "id": "77", "city": "York" }))
            .expect("patch");
        assert_eq!(Value::Object(patched), json!({ "id": "4", "name": "North", "city": "York" }));

        let replaced = db
            .replace("branches", &id, json!({ "name": "Only" }))
            .expect("replace");
        assert_eq!(Value::Object(replaced), json!({ "name": "Only", "id": "4" }));
    }

    #[test]
    fn errors_map_to_statuses() {
        let mut db = seeded();
        assert_eq!(db.list("nope").unwrap_err().status(), 404);
        assert_eq!(db.remove("branches", &EntityId::from(9)).unwrap_err().status(), 404);
        assert_eq!(db.insert("branches", json!([1, 2])).unwrap_err().status(), 400);
        assert!(Database::from_document(json!({ "branches": {} })).is_err());
    }

    #[test]
    fn save_then_load_restores_the_document() {
        let dir = std::env::temp_dir().join(format!("fm_dataservice_db_{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("db.json");

        let mut db = seeded();
        db.remove("branches", &EntityId::from(1)).expect("remove");
        db.save(&path).expect("save");
        let loaded = Database::load(&path).expect("load");
        assert_eq!(loaded.to_document(), db.to_document());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
