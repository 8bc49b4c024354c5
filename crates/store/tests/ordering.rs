#![forbid(unsafe_code)]

use fm_core::EntityId;
use fm_core::model::{Branch, BranchDraft, BranchPatch};
use fm_store::{Applied, Gateway, GatewayError, MemoryGateway, Session};
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

fn branch(id: u64, name: &str) -> Branch {
    Branch {
        id: EntityId::from(id),
        name: name.to_string(),
        manager: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        phone: "0123456789".to_string(),
        address: "1 High St".to_string(),
        city: Some("Leeds".to_string()),
        country: Some("UK".to_string()),
        latitude: None,
        longitude: None,
        status: None,
        ground_maintenance: None,
    }
}

/// Lists block until the test releases a response; the first waiting worker gets the
/// first release.
struct GatedGateway {
    releases: Mutex<Receiver<Vec<Branch>>>,
}

impl Gateway<Branch> for GatedGateway {
    fn list(&self) -> Result<Vec<Branch>, GatewayError> {
        let releases = self.releases.lock().expect("gate lock");
        releases
            .recv()
            .map_err(|_| GatewayError::Transport("gate closed".to_string()))
    }

    fn create(&self, _draft: &BranchDraft) -> Result<Branch, GatewayError> {
        Err(GatewayError::Status { status: 501 })
    }

    fn update(&self, _id: &EntityId, _patch: &BranchPatch) -> Result<Branch, GatewayError> {
        Err(GatewayError::Status { status: 501 })
    }

    fn delete(&self, _id: &EntityId) -> Result<EntityId, GatewayError> {
        Err(GatewayError::Status { status: 501 })
    }
}

fn pump_until_applied<B: Send + Sync + 'static>(session: &mut Session<B>) -> Vec<Applied> {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let applied = session.pump();
        if !applied.is_empty() {
            return applied;
        }
        assert!(Instant::now() < deadline, "no outcome arrived in time");
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn overlapping_fetches_last_resolved_wins() {
    let (release, releases) = mpsc::channel();
    let mut session = Session::new(GatedGateway {
        releases: Mutex::new(releases),
    });

    session.fetch_all::<Branch>();
    session.fetch_all::<Branch>();
    assert!(session.store().branches().loading());

    release.send(vec![branch(1, "Old")]).expect("release first");
    let first = pump_until_applied(&mut session);
    assert_eq!(first.len(), 1);
    assert_eq!(session.store().branches().iter().next().map(|b| b.name.as_str()), Some("Old"));

    release.send(vec![branch(1, "New"), branch(2, "Other")]).expect("release second");
    let rest = session.wait_idle();
    assert_eq!(rest.len(), 1);

    let names: Vec<_> = session.store().branches().iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["New", "Other"]);
    assert!(!session.store().branches().loading());
}

#[test]
fn delete_racing_an_update_still_removes_the_item() {
    let gateway = MemoryGateway::new();
    gateway.seed(&[branch(1, "A"), branch(2, "B")]).expect("seed");
    let mut session = Session::new(gateway);
    session.invalidate::<Branch>().expect("initial fetch");

    let patch = BranchPatch {
        name: Some("B2".to_string()),
        ..BranchPatch::default()
    };
    session.update::<Branch>(EntityId::from(2), patch).expect("valid patch");
    session.delete::<Branch>(EntityId::from(2));
    session.wait_idle();

    let ids: Vec<_> = session.store().branches().iter().map(|b| b.id.clone()).collect();
    assert_eq!(ids, vec![EntityId::from(1)]);
}

#[test]
fn update_arriving_after_delete_is_dropped() {
    let gateway = MemoryGateway::new();
    gateway.seed(&[branch(1, "A")]).expect("seed");
    let mut session = Session::new(gateway);
    session.invalidate::<Branch>().expect("initial fetch");

    let ticket = session.delete::<Branch>(EntityId::from(1));
    session.settle(ticket).expect("deleted");

    // A late success for the removed item: the server still had it when it answered.
    session
        .store_mut()
        .slice_mut::<Branch>()
        .fulfilled(fm_store::Outcome::Updated(branch(1, "Late")));
    assert!(session.store().branches().is_empty());
}

#[test]
fn slices_fail_independently() {
    let gateway = MemoryGateway::new();
    gateway.fail_next(fm_core::EntityKind::Floor, GatewayError::Status { status: 503 });
    let mut session = Session::new(gateway);

    session.fetch_all::<Branch>();
    session.fetch_all::<fm_core::model::Floor>();
    session.wait_idle();

    assert_eq!(session.store().branches().error(), None);
    assert_eq!(
        session.store().floors().error(),
        Some("Failed to fetch floors: request failed with status code 503")
    );
    assert_eq!(session.store().errors().len(), 1);
}
