#![forbid(unsafe_code)]

use fm_core::EntityId;
use fm_core::model::{Branch, BranchDraft, BranchPatch, Building, BuildingPatch, Floor, Space};
use fm_dataservice::{DataService, Database};
use fm_store::{ApiConfig, HttpGateway, Session, StoreError};
use serde_json::json;
use std::time::Duration;

fn seeded_service() -> Option<DataService> {
    let db = Database::from_document(json!({
        "branches": [
            { "id": 1, "name": "Main", "manager": "Ada", "email": "ada@example.com",
              "phone": "0123456789", "address": "1 High St", "city": "Leeds", "country": "UK" }
        ],
        "buildings": [
            { "id": "1", "name": "Tower", "branchId": "1", "type": "Office", "floors": 3,
              "address": "1 High St" },
            { "id": "2", "name": "Annex", "branchId": "9", "type": "Storage", "floors": 1,
              "address": "2 High St" }
        ],
        "floors": [
            { "id": "1", "floorName": "Ground", "branchId": "1", "buildingId": "1",
              "buildingName": "Tower", "floorNumber": 0, "totalArea": 250.5,
              "floorPlan": "data:image/png;base64,AA==" }
        ],
        "spaces": []
    }))
    .expect("seed document");
    // Skip when loopback bind is not permitted.
    DataService::start(db, 0).ok()
}

fn session_for(service: &DataService) -> Session<HttpGateway> {
    let config = ApiConfig::default().with_base_url(service.base_url());
    Session::new(HttpGateway::new(&config).expect("gateway"))
}

#[test]
fn fetch_create_patch_delete_round_trip() {
    let Some(service) = seeded_service() else {
        return;
    };
    let mut session = session_for(&service);

    session.invalidate::<Branch>().expect("fetch branches");
    let main = session.store().branches().get(&EntityId::from(1)).expect("numeric id loads");
    assert_eq!(main.name, "Main");

    let draft = BranchDraft {
        name: "North".to_string(),
        manager: "Grace".to_string(),
        email: "grace@example.com".to_string(),
        phone: "0987654321".to_string(),
        address: "9 Hill Rd".to_string(),
        city: Some("York".to_string()),
        country: Some("UK".to_string()),
        ..BranchDraft::default()
    };
    let ticket = session.create::<Branch>(draft).expect("valid draft");
    let applied = session.settle(ticket).expect("created");
    let id = applied.entity.expect("server id");
    assert_eq!(id, EntityId::from(2));
    assert_eq!(session.store().branches().len(), 2);

    let patch = BranchPatch {
        manager: Some("Linus".to_string()),
        ..BranchPatch::default()
    };
    let ticket = session.update::<Branch>(id.clone(), patch).expect("valid patch");
    session.settle(ticket).expect("patched");
    let north = session.store().branches().get(&id).expect("still present");
    assert_eq!(north.manager, "Linus");
    assert_eq!(north.city.as_deref(), Some("York"));

    let ticket = session.delete::<Branch>(id.clone());
    session.settle(ticket).expect("deleted");
    assert!(session.store().branches().get(&id).is_none());

    let on_server = service.snapshot();
    assert_eq!(on_server["branches"].as_array().map(Vec::len), Some(1));
}

#[test]
fn floors_are_replaced_with_put() {
    let Some(service) = seeded_service() else {
        return;
    };
    let mut session = session_for(&service);
    session.invalidate::<Floor>().expect("fetch floors");

    let floor = session.store().floors().get(&EntityId::from(1)).expect("floor").clone();
    let mut draft = floor.to_draft();
    draft.floor_name = "Lobby".to_string();
    draft.floor_plan = None;
    let ticket = session.update::<Floor>(floor.id.clone(), draft).expect("valid floor");
    session.settle(ticket).expect("replaced");

    let stored = &service.snapshot()["floors"][0];
    assert_eq!(stored["floorName"], "Lobby");
    assert!(stored.get("floorPlan").is_none());
    assert_eq!(
        session.store().floors().get(&floor.id).map(|f| f.has_floor_plan()),
        Some(false)
    );
}

#[test]
fn missing_items_report_not_found() {
    let Some(service) = seeded_service() else {
        return;
    };
    let mut session = session_for(&service);
    session.invalidate::<Building>().expect("fetch buildings");

    let patch = BuildingPatch {
        name: Some("Gone".to_string()),
        ..BuildingPatch::default()
    };
    let ticket = session.update::<Building>(EntityId::from(77), patch).expect("valid patch");
    let err = session.settle(ticket).unwrap_err();
    assert!(matches!(&err, StoreError::Rejected(message) if message == "Building not found"));
    assert_eq!(session.store().buildings().error(), Some("Building not found"));
    assert_eq!(session.store().buildings().len(), 2);

    let failure = session.store().notices().latest().expect("failure notice");
    assert_eq!(failure.text, "Building not found");
}

#[test]
fn free_text_ids_survive_the_url_path() {
    let db = Database::from_document(json!({
        "branches": [
            { "id": "north campus", "name": "North" },
            { "id": "café 50%", "name": "Cafe" },
            { "id": 3, "name": "Main" }
        ]
    }))
    .expect("seed document");
    let Ok(service) = DataService::start(db, 0) else {
        return;
    };
    let mut session = session_for(&service);
    session.invalidate::<Branch>().expect("fetch branches");

    let patch = BranchPatch {
        manager: Some("Grace".to_string()),
        ..BranchPatch::default()
    };
    let north = EntityId::try_new("north campus").expect("id");
    let ticket = session.update::<Branch>(north.clone(), patch).expect("valid patch");
    session.settle(ticket).expect("patched");
    assert_eq!(
        session.store().branches().get(&north).map(|b| b.manager.as_str()),
        Some("Grace")
    );

    for raw in ["north campus", "café 50%"] {
        let id = EntityId::try_new(raw).expect("id");
        let ticket = session.delete::<Branch>(id.clone());
        session.settle(ticket).expect("deleted");
        assert!(session.store().branches().get(&id).is_none(), "{raw}");
    }

    let remaining = service.snapshot()["branches"].clone();
    assert_eq!(remaining, json!([{ "id": 3, "name": "Main" }]));
}

#[test]
fn unreachable_service_is_a_network_failure() {
    let Some(port) = std::net::TcpListener::bind("127.0.0.1:0")
        .ok()
        .and_then(|listener| listener.local_addr().ok())
        .map(|addr| addr.port())
    else {
        return;
    };
    let config = ApiConfig {
        base_url: format!("http://127.0.0.1:{port}"),
        timeout: Duration::from_millis(500),
    };
    let mut session = Session::new(HttpGateway::new(&config).expect("gateway"));

    let err = session.invalidate::<Space>().unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Failed to fetch spaces: network error"), "{message}");
    assert!(!session.store().spaces().loading());
    assert!(session.store().notices().is_empty());
}
