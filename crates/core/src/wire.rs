#![forbid(unsafe_code)]

//! JSON-level record helpers shared by in-memory backends.

use crate::ids::EntityId;
use serde_json::{Map, Value};

/// Shallow merge used by PATCH: top-level keys of `patch` overwrite `target`.
/// The id is never overwritten.
pub fn merge_patch(target: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, value) in patch {
        if key == "id" {
            continue;
        }
        target.insert(key.clone(), value.clone());
    }
}

/// Full replacement used by PUT: every field but the id comes from `body`.
pub fn replace_keeping_id(body: &Map<String, Value>, id: &EntityId) -> Map<String, Value> {
    let mut out = body.clone();
    out.insert("id".to_string(), Value::String(id.as_str().to_string()));
    out
}

pub fn record_id(record: &Map<String, Value>) -> Option<EntityId> {
    match record.get("id")? {
        Value::String(raw) => EntityId::try_new(raw.as_str()).ok(),
        Value::Number(num) => num
            .as_u64()
            .map(EntityId::from)
            .or_else(|| num.as_i64().and_then(|n| EntityId::try_new(n.to_string()).ok())),
        _ => None,
    }
}

/// Next id for a collection: one past the largest numeric id, starting at 1.
pub fn next_id<'a>(records: impl IntoIterator<Item = &'a Map<String, Value>>) -> EntityId {
    let max = records
        .into_iter()
        .filter_map(record_id)
        .filter_map(|id| id.as_number())
        .max()
        .unwrap_or(0);
    EntityId::from(max.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn merge_patch_keeps_id_and_untouched_fields() {
        let mut target = obj(json!({ "id": "2", "name": "Y", "city": "Leeds" }));
        merge_patch(&mut target, &obj(json!({ "id": "99", "name": "X" })));
        assert_eq!(
            Value::Object(target),
            json!({ "id": "2", "name": "X", "city": "Leeds" })
        );
    }

    #[test]
    fn replace_drops_missing_fields() {
        let out = replace_keeping_id(&obj(json!({ "name": "X" })), &EntityId::from(4));
        assert_eq!(Value::Object(out), json!({ "name": "X", "id": "4" }));
    }

    #[test]
    fn next_id_skips_non_numeric_ids() {
        let records = [
            obj(json!({ "id": 3 })),
            obj(json!({ "id": "a9" })),
            obj(json!({ "id": "7" })),
            obj(json!({ "name": "no id" })),
        ];
        assert_eq!(next_id(records.iter()), EntityId::from(8));
        assert_eq!(next_id(std::iter::empty()), EntityId::from(1));
    }
}
