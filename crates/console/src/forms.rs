#![forbid(unsafe_code)]

//! Command-line fields to drafts. Pickers resolve against what the store has loaded.

use crate::cli::{
    BranchEdit, BranchFields, BuildingEdit, BuildingFields, FloorEdit, FloorFields, SpaceEdit,
    SpaceFields,
};
use crate::error::ConsoleError;
use fm_core::model::{
    Branch, BranchDraft, BranchPatch, Building, BuildingDraft, BuildingPatch, Floor, FloorDraft,
    Space, SpaceDraft,
};
use fm_core::search::{SearchError, SearchInput, SearchMode};
use fm_core::{Entity, EntityId};
use fm_store::{AppStore, Stored, distinct};

/// A picker that only accepts one of `suggestions`, returning its canonical spelling.
pub fn choose(field: &'static str, raw: &str, suggestions: Vec<String>) -> Result<String, ConsoleError> {
    SearchInput::new(SearchMode::Constrained { suggestions })
        .with_value(raw)
        .commit()
        .map_err(ConsoleError::choice(field))
}

/// Free text with suggestions; a case-insensitive match takes the suggestion's spelling.
fn free_text(raw: &str, suggestions: Vec<String>) -> String {
    let mut input = SearchInput::new(SearchMode::FreeText { suggestions }).with_value(raw);
    input.commit().unwrap_or_else(|_| raw.trim().to_string())
}

/// Look an item up by id, falling back to its label.
pub fn resolve<'s, E: Stored>(
    store: &'s AppStore,
    field: &'static str,
    raw: &str,
) -> Result<&'s E, ConsoleError> {
    let slice = store.slice::<E>();
    if let Ok(id) = EntityId::try_new(raw)
        && let Some(item) = slice.get(&id)
    {
        return Ok(item);
    }
    let name = choose(field, raw, distinct(slice.iter().map(Entity::label)))?;
    slice.find_by_label(&name).ok_or_else(|| ConsoleError::Choice {
        field,
        source: SearchError::NotAnOption {
            value: raw.to_string(),
        },
    })
}

pub fn branch_draft(fields: BranchFields) -> BranchDraft {
    BranchDraft {
        name: fields.name,
        manager: fields.manager,
        email: fields.email,
        phone: fields.phone,
        address: fields.address,
        city: Some(fields.city),
        country: Some(fields.country),
        latitude: fields.latitude,
        longitude: fields.longitude,
        status: Some(!fields.inactive),
        ground_maintenance: Some(!fields.no_ground_maintenance),
    }
}

pub fn branch_patch(fields: BranchEdit) -> Result<BranchPatch, ConsoleError> {
    let patch = BranchPatch {
        name: fields.name,
        manager: fields.manager,
        email: fields.email,
        phone: fields.phone,
        address: fields.address,
        city: fields.city,
        country: fields.country,
        latitude: fields.latitude,
        longitude: fields.longitude,
        status: fields.active,
        ground_maintenance: fields.ground_maintenance,
    };
    if patch.is_empty() {
        return Err(ConsoleError::NothingToChange);
    }
    Ok(patch)
}

fn building_types(store: &AppStore) -> Vec<String> {
    distinct(store.buildings().iter().map(|b| b.building_type.as_str()))
}

pub fn building_draft(store: &AppStore, fields: BuildingFields) -> Result<BuildingDraft, ConsoleError> {
    let branch: &Branch = resolve(store, "branch", &fields.branch)?;
    Ok(BuildingDraft {
        name: fields.name,
        branch_id: branch.id.clone(),
        branch_name: Some(branch.name.clone()),
        building_type: free_text(&fields.building_type, building_types(store)),
        floors: fields.floors,
        address: fields.address,
        latitude: fields.latitude,
        longitude: fields.longitude,
        status: Some(!fields.inactive),
        ground_maintenance: None,
        description: fields.description,
    })
}

pub fn building_patch(store: &AppStore, fields: BuildingEdit) -> Result<BuildingPatch, ConsoleError> {
    let branch = match &fields.branch {
        Some(raw) => Some(resolve::<Branch>(store, "branch", raw)?),
        None => None,
    };
    let patch = BuildingPatch {
        name: fields.name,
        branch_id: branch.map(|b| b.id.clone()),
        branch_name: branch.map(|b| b.name.clone()),
        building_type: fields
            .building_type
            .map(|raw| free_text(&raw, building_types(store))),
        floors: fields.floors,
        address: fields.address,
        latitude: fields.latitude,
        longitude: fields.longitude,
        status: fields.active,
        ground_maintenance: None,
        description: fields.description,
    };
    if patch.is_empty() {
        return Err(ConsoleError::NothingToChange);
    }
    Ok(patch)
}

fn place_on(draft: &mut FloorDraft, building: &Building) {
    draft.building_id = building.id.clone();
    draft.branch_id = building.branch_id.clone();
    draft.building_name = Some(building.name.clone());
}

pub fn floor_draft(store: &AppStore, fields: FloorFields) -> Result<FloorDraft, ConsoleError> {
    let building: &Building = resolve(store, "building", &fields.building)?;
    Ok(FloorDraft {
        floor_name: fields.name,
        branch_id: building.branch_id.clone(),
        building_id: building.id.clone(),
        building_name: Some(building.name.clone()),
        floor_number: fields.number,
        total_area: fields.area,
        floor_plan: fields.plan,
        status: Some(!fields.inactive),
        ground_maintenance: None,
    })
}

/// Full replacement for a floor: the current record with the given fields changed.
pub fn floor_replacement(store: &AppStore, current: &Floor, fields: FloorEdit) -> Result<FloorDraft, ConsoleError> {
    let mut draft = current.to_draft();
    if let Some(raw) = &fields.building {
        place_on(&mut draft, resolve(store, "building", raw)?);
    }
    if let Some(name) = fields.name {
        draft.floor_name = name;
    }
    if let Some(number) = fields.number {
        draft.floor_number = number;
    }
    if let Some(area) = fields.area {
        draft.total_area = area;
    }
    if fields.clear_plan {
        draft.floor_plan = None;
    } else if let Some(plan) = fields.plan {
        draft.floor_plan = Some(plan);
    }
    if let Some(active) = fields.active {
        draft.status = Some(active);
    }
    Ok(draft)
}

const META_TYPES: [&str; 3] = ["Commercial", "Residential", "Storage"];
const CONDITIONS: [&str; 3] = ["Good", "Average", "Needs Maintenance"];

fn fixed(options: &[&str]) -> Vec<String> {
    options.iter().map(|option| option.to_string()).collect()
}

fn space_managers(store: &AppStore) -> Vec<String> {
    distinct(store.spaces().iter().map(|s| s.space_manager.as_str()))
}

fn names<E: Stored>(store: &AppStore) -> Vec<String> {
    distinct(store.slice::<E>().iter().map(Entity::label))
}

pub fn space_draft(store: &AppStore, fields: SpaceFields) -> Result<SpaceDraft, ConsoleError> {
    let parent_space = match &fields.parent {
        Some(raw) if !raw.trim().is_empty() => Some(choose("parent", raw, names::<Space>(store))?),
        _ => None,
    };
    Ok(SpaceDraft {
        space_name: fields.name.trim().to_string(),
        branch_name: choose("branch", &fields.branch, names::<Branch>(store))?,
        building_name: choose("building", &fields.building, names::<Building>(store))?,
        floor_name: choose("floor", &fields.floor, names::<Floor>(store))?,
        space_area: fields.area,
        meta_type: free_text(&fields.meta_type, fixed(&META_TYPES)),
        parent_space,
        space_condition: free_text(&fields.condition, fixed(&CONDITIONS)),
        space_manager: free_text(&fields.manager, space_managers(store)),
        space_image: fields.image,
    })
}

pub fn space_replacement(store: &AppStore, current: &Space, fields: SpaceEdit) -> Result<SpaceDraft, ConsoleError> {
    let mut draft = current.to_draft();
    if let Some(name) = fields.name {
        draft.space_name = name.trim().to_string();
    }
    if let Some(raw) = &fields.branch {
        draft.branch_name = choose("branch", raw, names::<Branch>(store))?;
    }
    if let Some(raw) = &fields.building {
        draft.building_name = choose("building", raw, names::<Building>(store))?;
    }
    if let Some(raw) = &fields.floor {
        draft.floor_name = choose("floor", raw, names::<Floor>(store))?;
    }
    if let Some(area) = fields.area {
        draft.space_area = area;
    }
    if let Some(meta_type) = fields.meta_type {
        draft.meta_type = free_text(&meta_type, fixed(&META_TYPES));
    }
    if fields.no_parent {
        draft.parent_space = None;
    } else if let Some(raw) = &fields.parent {
        draft.parent_space = Some(choose("parent", raw, names::<Space>(store))?);
    }
    if let Some(condition) = fields.condition {
        draft.space_condition = free_text(&condition, fixed(&CONDITIONS));
    }
    if let Some(manager) = fields.manager {
        draft.space_manager = free_text(&manager, space_managers(store));
    }
    if let Some(image) = fields.image {
        draft.space_image = Some(image);
    }
    Ok(draft)
}
