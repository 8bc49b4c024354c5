#![forbid(unsafe_code)]

use super::Entity;
use crate::ids::EntityId;
use crate::kind::EntityKind;
use serde::{Deserialize, Serialize};

/// A space stores its parents as display names, not ids. Renaming a branch,
/// building or floor does not rewrite the spaces that copied the old name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub id: EntityId,
    pub space_name: String,
    #[serde(default)]
    pub branch_name: String,
    #[serde(default)]
    pub building_name: String,
    #[serde(default)]
    pub floor_name: String,
    #[serde(default)]
    pub space_area: String,
    #[serde(default)]
    pub meta_type: String,
    /// Name of the parent space; spaces nest one level deep.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_space: Option<String>,
    #[serde(default)]
    pub space_condition: String,
    #[serde(default)]
    pub space_manager: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_image: Option<String>,
}

impl Space {
    pub fn parent_name(&self) -> Option<&str> {
        self.parent_space
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_name().is_none()
    }

    pub fn to_draft(&self) -> SpaceDraft {
        SpaceDraft {
            space_name: self.space_name.clone(),
            branch_name: self.branch_name.clone(),
            building_name: self.building_name.clone(),
            floor_name: self.floor_name.clone(),
            space_area: self.space_area.clone(),
            meta_type: self.meta_type.clone(),
            parent_space: self.parent_space.clone(),
            space_condition: self.space_condition.clone(),
            space_manager: self.space_manager.clone(),
            space_image: self.space_image.clone(),
        }
    }
}

impl Entity for Space {
    const KIND: EntityKind = EntityKind::Space;
    type Draft = SpaceDraft;
    type Patch = SpaceDraft;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> &str {
        &self.space_name
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceDraft {
    pub space_name: String,
    pub branch_name: String,
    pub building_name: String,
    pub floor_name: String,
    pub space_area: String,
    pub meta_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_space: Option<String>,
    pub space_condition: String,
    pub space_manager: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_image: Option<String>,
}
