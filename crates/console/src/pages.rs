#![forbid(unsafe_code)]

//! Page logic shared by every entity screen: mount, filtered listing, add/edit with a
//! refetch afterwards, and delete behind the shared confirmation dialog.

use crate::error::ConsoleError;
use fm_core::confirm::{ConfirmOptions, Confirmation};
use fm_core::model::{Branch, Building, Floor, Space};
use fm_core::search::contains_ci;
use fm_core::{Entity, EntityId, EntityKind};
use fm_store::{AppStore, Applied, Backend, Gateway, Notice, Session, Stored, Ticket};
use std::collections::BTreeSet;
use std::fmt;

/// How one entity kind appears on its page.
pub trait Listing: Stored {
    type Filter: Default + fmt::Debug;

    const HEADERS: &'static [&'static str];

    /// Other collections the rows read from; fetched on mount with the page's own.
    const LOOKUPS: &'static [EntityKind];

    fn matches(&self, filter: &Self::Filter) -> bool;

    fn row(&self, store: &AppStore) -> Vec<String>;
}

fn yes_no(value: bool) -> String {
    let text = if value { "yes" } else { "no" };
    text.to_string()
}

fn active(value: bool) -> String {
    let text = if value { "active" } else { "inactive" };
    text.to_string()
}

#[derive(Debug, Default)]
pub struct BranchFilter {
    pub name: String,
}

impl Listing for Branch {
    type Filter = BranchFilter;
    const HEADERS: &'static [&'static str] =
        &["ID", "Name", "Manager", "Email", "Phone", "City", "Country", "Status", "Grounds"];
    const LOOKUPS: &'static [EntityKind] = &[];

    fn matches(&self, filter: &Self::Filter) -> bool {
        contains_ci(&self.name, &filter.name)
    }

    fn row(&self, _store: &AppStore) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.manager.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.city.clone().unwrap_or_default(),
            self.country.clone().unwrap_or_default(),
            active(self.is_active()),
            yes_no(self.has_ground_maintenance()),
        ]
    }
}

#[derive(Debug, Default)]
pub struct BuildingFilter {
    pub name: String,
    pub building_type: String,
}

impl Listing for Building {
    type Filter = BuildingFilter;
    const HEADERS: &'static [&'static str] =
        &["ID", "Name", "Branch", "Type", "Floors", "Address", "Status"];
    const LOOKUPS: &'static [EntityKind] = &[EntityKind::Branch];

    fn matches(&self, filter: &Self::Filter) -> bool {
        contains_ci(&self.name, &filter.name) && contains_ci(&self.building_type, &filter.building_type)
    }

    fn row(&self, store: &AppStore) -> Vec<String> {
        let branches = store.branches();
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.branch_label(|id| branches.get(id).map(|b| b.name.as_str())),
            self.building_type.clone(),
            self.floors.to_string(),
            self.address.clone(),
            active(self.is_active()),
        ]
    }
}

#[derive(Debug, Default)]
pub struct FloorFilter {
    pub floor_name: String,
    pub building_name: String,
}

impl Listing for Floor {
    type Filter = FloorFilter;
    const HEADERS: &'static [&'static str] =
        &["ID", "Floor", "Number", "Building", "Area (sq ft)", "Plan", "Status"];
    const LOOKUPS: &'static [EntityKind] = &[EntityKind::Building];

    fn matches(&self, filter: &Self::Filter) -> bool {
        contains_ci(&self.floor_name, &filter.floor_name)
            && contains_ci(self.building_name.as_deref().unwrap_or(""), &filter.building_name)
    }

    fn row(&self, store: &AppStore) -> Vec<String> {
        let building = store
            .buildings()
            .get(&self.building_id)
            .map(|b| b.name.clone())
            .or_else(|| self.building_name.clone().filter(|n| !n.trim().is_empty()))
            .unwrap_or_else(|| format!("Building {}", self.building_id));
        vec![
            self.id.to_string(),
            self.floor_name.clone(),
            self.floor_number.to_string(),
            building,
            format!("{:.1}", self.total_area),
            yes_no(self.has_floor_plan()),
            active(self.is_active()),
        ]
    }
}

#[derive(Debug, Default)]
pub struct SpaceFilter {
    pub space_name: String,
    pub manager: String,
}

impl Listing for Space {
    type Filter = SpaceFilter;
    const HEADERS: &'static [&'static str] = &[
        "ID", "Space", "Branch", "Building", "Floor", "Area", "Type", "Parent", "Condition",
        "Manager",
    ];
    const LOOKUPS: &'static [EntityKind] = &[];

    fn matches(&self, filter: &Self::Filter) -> bool {
        contains_ci(&self.space_name, &filter.space_name)
            && contains_ci(&self.space_manager, &filter.manager)
    }

    fn row(&self, _store: &AppStore) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.space_name.clone(),
            self.branch_name.clone(),
            self.building_name.clone(),
            self.floor_name.clone(),
            self.space_area.clone(),
            self.meta_type.clone(),
            self.parent_name().unwrap_or("-").to_string(),
            self.space_condition.clone(),
            self.space_manager.clone(),
        ]
    }
}

/// Rendered state of one page: what a table view needs, nothing more.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PageView {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
    pub loading: bool,
    pub error: Option<String>,
    /// Shown instead of rows when there are none.
    pub empty_message: Option<String>,
    /// Index into `rows` of the item saved last on this page.
    pub highlight: Option<usize>,
}

#[derive(Debug)]
struct PendingSave {
    generation: u64,
    ticket: Ticket,
}

pub fn fetch_kind<B: Backend>(session: &mut Session<B>, kind: EntityKind) -> Ticket {
    match kind {
        EntityKind::Branch => session.fetch_all::<Branch>(),
        EntityKind::Building => session.fetch_all::<Building>(),
        EntityKind::Floor => session.fetch_all::<Floor>(),
        EntityKind::Space => session.fetch_all::<Space>(),
    }
}

/// Session plus page-local state. Page state is tied to a mount generation; results
/// that settle after a remount still reach the store but not the page.
pub struct Console<B> {
    session: Session<B>,
    dialog: Confirmation<Session<B>>,
    generation: u64,
    page: Option<EntityKind>,
    saves: Vec<PendingSave>,
    highlight: Option<EntityId>,
}

impl<B> fmt::Debug for Console<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("generation", &self.generation)
            .field("page", &self.page)
            .field("dialog", &self.dialog)
            .finish_non_exhaustive()
    }
}

impl<B: Backend> Console<B> {
    pub fn new(backend: B) -> Self {
        Self {
            session: Session::new(backend),
            dialog: Confirmation::new(),
            generation: 0,
            page: None,
            saves: Vec::new(),
            highlight: None,
        }
    }

    pub fn session(&self) -> &Session<B> {
        &self.session
    }

    pub fn store(&self) -> &AppStore {
        self.session.store()
    }

    pub fn dialog(&self) -> &Confirmation<Session<B>> {
        &self.dialog
    }

    /// Hand over every notice raised so far, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.session.store_mut().notices_mut().drain()
    }

    pub fn highlighted(&self) -> Option<&EntityId> {
        self.highlight.as_ref()
    }

    /// Enter the page for `E`: new generation, fresh page state, fetches dispatched.
    pub fn mount<E: Listing>(&mut self) -> Vec<Ticket> {
        self.generation += 1;
        self.page = Some(E::KIND);
        self.highlight = None;
        self.dialog.cancel();
        tracing::debug!(page = %E::KIND, generation = self.generation, "mount");

        let mut tickets = vec![fetch_kind(&mut self.session, E::KIND)];
        for kind in E::LOOKUPS {
            tickets.push(fetch_kind(&mut self.session, *kind));
        }
        tickets
    }

    /// Fetch collections a form picks from, leaving page state alone.
    pub fn prefetch(&mut self, kinds: &[EntityKind]) -> Vec<Ticket> {
        kinds
            .iter()
            .filter(|kind| Some(**kind) != self.page)
            .map(|kind| fetch_kind(&mut self.session, *kind))
            .collect()
    }

    /// Opening a form clears the banner for that collection.
    pub fn open_form<E: Listing>(&mut self) {
        self.session.store_mut().slice_mut::<E>().clear_error();
    }

    pub fn submit_create<E: Listing>(&mut self, draft: E::Draft) -> Result<Ticket, ConsoleError>
    where
        B: Gateway<E>,
    {
        self.open_form::<E>();
        let ticket = self.session.create::<E>(draft)?;
        self.track(ticket);
        Ok(ticket)
    }

    pub fn submit_update<E: Listing>(&mut self, id: EntityId, patch: E::Patch) -> Result<Ticket, ConsoleError>
    where
        B: Gateway<E>,
    {
        self.open_form::<E>();
        let ticket = self.session.update::<E>(id, patch)?;
        self.track(ticket);
        Ok(ticket)
    }

    fn track(&mut self, ticket: Ticket) {
        self.saves.push(PendingSave {
            generation: self.generation,
            ticket,
        });
    }

    /// Open the shared dialog for deleting `id`. Nothing is sent until [`Console::confirm`].
    pub fn request_delete<E: Listing>(&mut self, id: EntityId) -> Result<(), ConsoleError>
    where
        B: Gateway<E>,
    {
        let label = self
            .store()
            .slice::<E>()
            .get(&id)
            .map(|item| item.label().to_string())
            .ok_or_else(|| ConsoleError::Unknown {
                kind: E::KIND,
                id: id.clone(),
            })?;
        let title = format!("Delete {}?", E::KIND.title());
        let message = format!(
            "Are you sure you want to delete {} \"{label}\"? This action cannot be undone.",
            E::KIND.singular()
        );
        self.dialog.request_confirmation(
            move |session: &mut Session<B>| {
                session.delete::<E>(id);
            },
            ConfirmOptions::new(title, message),
        );
        Ok(())
    }

    pub fn cancel(&mut self) -> bool {
        self.dialog.cancel()
    }

    /// Run the pending action, then settle everything it started.
    pub fn confirm(&mut self) -> Result<Vec<Applied>, ConsoleError> {
        if !self.dialog.confirm(&mut self.session) {
            return Ok(Vec::new());
        }
        self.finish()
    }

    /// Wait for every request in flight, update page state for saves made on the current
    /// mount, and refetch each collection a successful mutation touched.
    pub fn finish(&mut self) -> Result<Vec<Applied>, ConsoleError> {
        let applied = self.session.wait_idle();
        let mut touched = BTreeSet::new();
        for outcome in &applied {
            if outcome.is_ok() && outcome.operation.is_mutation() {
                touched.insert(outcome.kind);
            }
            let Some(index) = self.saves.iter().position(|s| s.ticket == outcome.ticket) else {
                continue;
            };
            let save = self.saves.remove(index);
            if save.generation != self.generation {
                tracing::debug!(ticket = %save.ticket, "save settled after remount");
                continue;
            }
            if outcome.is_ok() {
                self.highlight = outcome.entity.clone();
                let verb = match outcome.operation {
                    fm_store::Operation::Create => "added",
                    _ => "updated",
                };
                self.session
                    .store_mut()
                    .notices_mut()
                    .success(format!("{} {verb}", outcome.kind.title()));
            }
        }
        for kind in touched {
            fetch_kind(&mut self.session, kind);
        }
        let mut refreshed = self.session.wait_idle();
        let mut all = applied;
        all.append(&mut refreshed);
        Ok(all)
    }

    pub fn view<E: Listing>(&self, filter: &E::Filter) -> PageView {
        let store = self.store();
        let slice = store.slice::<E>();
        let matching: Vec<&E> = slice.iter().filter(|item| item.matches(filter)).collect();
        let highlight = self
            .highlight
            .as_ref()
            .filter(|_| self.page == Some(E::KIND))
            .and_then(|id| matching.iter().position(|item| item.id() == id));
        let empty_message = if !matching.is_empty() {
            None
        } else if slice.is_empty() {
            Some(format!(
                "No {} available. Add your first {}!",
                E::KIND.collection(),
                E::KIND.singular()
            ))
        } else {
            Some(format!("No {} match your search criteria.", E::KIND.collection()))
        };
        PageView {
            headers: E::HEADERS.to_vec(),
            rows: matching.iter().map(|item| item.row(store)).collect(),
            loading: slice.loading(),
            error: slice.error().map(str::to_string),
            empty_message,
            highlight,
        }
    }
}
