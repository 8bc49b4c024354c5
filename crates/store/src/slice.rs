#![forbid(unsafe_code)]

use crate::error::GatewayError;
use fm_core::{Entity, EntityId, EntityKind};
use std::fmt;
use std::sync::Arc;

/// Collection snapshot. The outer `Arc` is replaced whenever the collection changes,
/// so `Arc::ptr_eq` on two snapshots answers "did anything change".
pub type Items<E> = Arc<Vec<Arc<E>>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    FetchAll,
    Create,
    Update(EntityId),
    Delete(EntityId),
}

impl Operation {
    pub fn verb(&self) -> &'static str {
        match self {
            Self::FetchAll => "fetch",
            Self::Create => "add",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::FetchAll)
    }

    pub fn target(&self) -> Option<&EntityId> {
        match self {
            Self::Update(id) | Self::Delete(id) => Some(id),
            Self::FetchAll | Self::Create => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target() {
            Some(id) => write!(f, "{}({id})", self.verb()),
            None => f.write_str(self.verb()),
        }
    }
}

#[derive(Debug)]
pub enum Outcome<E> {
    Fetched(Vec<E>),
    Created(E),
    Updated(E),
    Deleted(EntityId),
}

/// Message stored on a slice when `operation` on `kind` fails.
pub fn failure_message(kind: EntityKind, operation: &Operation, err: &GatewayError) -> String {
    if err.is_not_found() && operation.target().is_some() {
        return format!("{} not found", kind.title());
    }
    let noun = match operation {
        Operation::FetchAll => kind.collection(),
        _ => kind.singular(),
    };
    format!("Failed to {} {noun}: {err}", operation.verb())
}

/// Client-side cache of one entity collection plus its request status.
#[derive(Debug)]
pub struct Slice<E> {
    items: Items<E>,
    loading: bool,
    error: Option<String>,
}

impl<E> Default for Slice<E> {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            loading: false,
            error: None,
        }
    }
}

impl<E: Entity> Slice<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &Items<E> {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.items.iter().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn get(&self, id: &EntityId) -> Option<&E> {
        self.iter().find(|item| item.id() == id)
    }

    pub fn position(&self, id: &EntityId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// First item whose label equals `label`, ignoring case and surrounding blanks.
    pub fn find_by_label(&self, label: &str) -> Option<&E> {
        let label = label.trim();
        self.iter()
            .find(|item| item.label().trim().eq_ignore_ascii_case(label))
    }

    pub fn pending(&mut self, operation: &Operation) {
        tracing::trace!(kind = %E::KIND, %operation, "pending");
        self.loading = true;
        self.error = None;
    }

    /// Apply a successful result. Returns the id the result concerned, if any.
    pub fn fulfilled(&mut self, outcome: Outcome<E>) -> Option<EntityId> {
        self.loading = false;
        match outcome {
            Outcome::Fetched(items) => {
                self.items = Arc::new(items.into_iter().map(Arc::new).collect());
                None
            }
            Outcome::Created(item) => {
                let id = item.id().clone();
                let mut next = Vec::with_capacity(self.items.len() + 1);
                next.extend(self.items.iter().cloned());
                next.push(Arc::new(item));
                self.items = Arc::new(next);
                Some(id)
            }
            Outcome::Updated(item) => {
                let id = item.id().clone();
                let Some(index) = self.position(&id) else {
                    tracing::debug!(kind = %E::KIND, %id, "dropping update for an item not held locally");
                    return Some(id);
                };
                let mut next: Vec<Arc<E>> = self.items.iter().cloned().collect();
                next[index] = Arc::new(item);
                self.items = Arc::new(next);
                Some(id)
            }
            Outcome::Deleted(id) => {
                if self.position(&id).is_some() {
                    let next = self
                        .items
                        .iter()
                        .filter(|item| item.id() != &id)
                        .cloned()
                        .collect();
                    self.items = Arc::new(next);
                }
                Some(id)
            }
        }
    }

    /// Apply a failure. Items are left untouched. Returns the stored message.
    pub fn rejected(&mut self, operation: &Operation, err: &GatewayError) -> String {
        let message = failure_message(E::KIND, operation, err);
        self.loading = false;
        self.error = Some(message.clone());
        message
    }

    pub fn settle(
        &mut self,
        operation: &Operation,
        result: Result<Outcome<E>, GatewayError>,
    ) -> Result<Option<EntityId>, String> {
        match result {
            Ok(outcome) => Ok(self.fulfilled(outcome)),
            Err(err) => Err(self.rejected(operation, &err)),
        }
    }
}
