#![forbid(unsafe_code)]

use super::Entity;
use crate::ids::EntityId;
use crate::kind::EntityKind;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub id: EntityId,
    pub name: String,
    pub branch_id: EntityId,
    /// Display copy of the branch name taken when the building was saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    #[serde(rename = "type", default)]
    pub building_type: String,
    #[serde(default)]
    pub floors: u32,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_maintenance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Building {
    pub fn is_active(&self) -> bool {
        self.status.unwrap_or(true)
    }

    /// Label for the owning branch. Dangling references are tolerated and rendered as
    /// `Branch {id}`.
    pub fn branch_label<'n>(&self, lookup: impl Fn(&EntityId) -> Option<&'n str>) -> String {
        if let Some(name) = lookup(&self.branch_id).filter(|name| !name.trim().is_empty()) {
            return name.to_string();
        }
        match self.branch_name.as_deref().map(str::trim) {
            Some(copy) if !copy.is_empty() => copy.to_string(),
            _ => format!("Branch {}", self.branch_id),
        }
    }
}

impl Entity for Building {
    const KIND: EntityKind = EntityKind::Building;
    type Draft = BuildingDraft;
    type Patch = BuildingPatch;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingDraft {
    pub name: String,
    pub branch_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    #[serde(rename = "type")]
    pub building_type: String,
    pub floors: u32,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_maintenance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub building_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floors: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_maintenance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl BuildingPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
