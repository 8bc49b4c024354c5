use super::*;
use crate::ids::EntityId;
use serde_json::json;

fn id(raw: &str) -> EntityId {
    EntityId::try_new(raw).unwrap()
}

#[test]
fn branch_reads_wire_shape_and_ignores_unknown_fields() {
    let branch: Branch = serde_json::from_value(json!({
        "id": 1,
        "name": "Main",
        "manager": "Ada",
        "email": "ada@example.com",
        "phone": "0123456789",
        "address": "1 High St",
        "city": "Leeds",
        "groundMaintenance": false,
        "legacyField": "ignored"
    }))
    .unwrap();

    assert_eq!(branch.id, id("1"));
    assert_eq!(branch.city.as_deref(), Some("Leeds"));
    assert!(branch.is_active());
    assert!(!branch.has_ground_maintenance());
    assert_eq!(branch.label(), "Main");
}

#[test]
fn branch_patch_sends_only_present_fields() {
    let patch = BranchPatch {
        name: Some("X".to_string()),
        status: Some(false),
        ..BranchPatch::default()
    };
    assert_eq!(
        serde_json::to_value(&patch).unwrap(),
        json!({ "name": "X", "status": false })
    );
    assert!(!patch.is_empty());
    assert!(BranchPatch::default().is_empty());
}

#[test]
fn building_type_uses_the_wire_name() {
    let building: Building = serde_json::from_value(json!({
        "id": "b1",
        "name": "Tower",
        "branchId": 3,
        "type": "Office",
        "floors": 12,
        "address": "2 Low St"
    }))
    .unwrap();
    assert_eq!(building.building_type, "Office");
    assert_eq!(building.branch_id, id("3"));

    let value = serde_json::to_value(&building).unwrap();
    assert_eq!(value["type"], json!("Office"));
    assert_eq!(value["branchId"], json!("3"));
    assert!(value.get("branchName").is_none());
}

#[test]
fn building_branch_label_falls_back_for_dangling_references() {
    let mut building: Building = serde_json::from_value(json!({
        "id": 5,
        "name": "Annex",
        "branchId": 9
    }))
    .unwrap();

    assert_eq!(building.branch_label(|_| None), "Branch 9");

    building.branch_name = Some("Old Name".to_string());
    assert_eq!(building.branch_label(|_| None), "Old Name");

    let live = "North";
    assert_eq!(
        building.branch_label(|branch_id| (branch_id.as_str() == "9").then_some(live)),
        "North"
    );
}

#[test]
fn floor_round_trips_through_its_draft() {
    let floor: Floor = serde_json::from_value(json!({
        "id": "f1",
        "floorName": "Ground",
        "branchId": "1",
        "buildingId": "2",
        "floorNumber": 0,
        "totalArea": 250.5,
        "floorPlan": "data:image/png;base64,AAAA"
    }))
    .unwrap();

    assert!(floor.has_floor_plan());
    let draft = floor.to_draft();
    assert_eq!(draft.floor_number, 0);
    assert_eq!(draft.total_area, 250.5);

    let value = serde_json::to_value(&draft).unwrap();
    assert!(value.get("id").is_none());
    assert_eq!(value["floorPlan"], json!("data:image/png;base64,AAAA"));
}

#[test]
fn space_keeps_parent_by_name() {
    let space: Space = serde_json::from_value(json!({
        "id": "s1",
        "spaceName": "Room 101",
        "branchName": "Main",
        "buildingName": "Tower",
        "floorName": "Ground",
        "spaceArea": "40",
        "metaType": "Office",
        "parentSpace": "  ",
        "spaceCondition": "Good",
        "spaceManager": "Lin"
    }))
    .unwrap();

    assert!(space.is_top_level());
    assert_eq!(space.parent_name(), None);

    let mut child = space.clone();
    child.parent_space = Some("Wing A".to_string());
    assert_eq!(child.parent_name(), Some("Wing A"));
    assert_eq!(child.to_draft().parent_space.as_deref(), Some("Wing A"));
}
