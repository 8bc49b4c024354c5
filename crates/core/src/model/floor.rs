#![forbid(unsafe_code)]

use super::Entity;
use crate::ids::EntityId;
use crate::kind::EntityKind;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Floor {
    pub id: EntityId,
    pub floor_name: String,
    pub branch_id: EntityId,
    pub building_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_name: Option<String>,
    #[serde(default)]
    pub floor_number: i64,
    #[serde(default)]
    pub total_area: f64,
    /// Floor plan image or PDF as a `data:` URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_maintenance: Option<bool>,
}

impl Floor {
    pub fn is_active(&self) -> bool {
        self.status.unwrap_or(true)
    }

    pub fn has_floor_plan(&self) -> bool {
        self.floor_plan
            .as_deref()
            .is_some_and(|plan| !plan.trim().is_empty())
    }

    /// Starting point for an edit form: floors are replaced wholesale on update.
    pub fn to_draft(&self) -> FloorDraft {
        FloorDraft {
            floor_name: self.floor_name.clone(),
            branch_id: self.branch_id.clone(),
            building_id: self.building_id.clone(),
            building_name: self.building_name.clone(),
            floor_number: self.floor_number,
            total_area: self.total_area,
            floor_plan: self.floor_plan.clone(),
            status: self.status,
            ground_maintenance: self.ground_maintenance,
        }
    }
}

impl Entity for Floor {
    const KIND: EntityKind = EntityKind::Floor;
    type Draft = FloorDraft;
    type Patch = FloorDraft;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> &str {
        &self.floor_name
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorDraft {
    pub floor_name: String,
    pub branch_id: EntityId,
    pub building_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_name: Option<String>,
    pub floor_number: i64,
    pub total_area: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_maintenance: Option<bool>,
}
