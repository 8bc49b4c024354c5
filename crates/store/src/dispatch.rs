#![forbid(unsafe_code)]

//! Request dispatch. Gateway calls run on worker threads; their outcomes come back over
//! a channel and are applied to the store by whoever owns it, one at a time, in the
//! order they arrive.

use crate::app::{AppStore, Stored};
use crate::error::{GatewayError, StoreError};
use crate::gateway::Gateway;
use crate::slice::{Operation, Outcome};
use fm_core::{EntityId, EntityKind};
use std::collections::HashSet;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What applying one outcome did to the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Applied {
    pub ticket: Ticket,
    pub kind: EntityKind,
    pub operation: Operation,
    /// Id the result concerned (created, updated or deleted item).
    pub entity: Option<EntityId>,
    /// Slice error message when the request was rejected.
    pub error: Option<String>,
}

impl Applied {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

type Completion = Box<dyn FnOnce(&mut AppStore) -> Applied + Send>;

fn completion<E: Stored>(
    ticket: Ticket,
    operation: Operation,
    result: Result<Outcome<E>, GatewayError>,
) -> Completion {
    Box::new(move |store: &mut AppStore| {
        let settled = store.slice_mut::<E>().settle(&operation, result);
        let (entity, error) = match settled {
            Ok(entity) => (entity, None),
            Err(message) => (operation.target().cloned(), Some(message)),
        };
        match &error {
            Some(message) if operation.is_mutation() => {
                tracing::warn!(%ticket, kind = %E::KIND, %operation, error = %message, "request rejected");
                store.notices_mut().failure(message.clone());
            }
            Some(message) => {
                tracing::warn!(%ticket, kind = %E::KIND, %operation, error = %message, "fetch failed");
            }
            None => {
                tracing::debug!(%ticket, kind = %E::KIND, %operation, "applied");
            }
        }
        Applied {
            ticket,
            kind: E::KIND,
            operation,
            entity,
            error,
        }
    })
}

pub struct Dispatcher<B> {
    backend: Arc<B>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    next_ticket: u64,
    in_flight: HashSet<Ticket>,
    unclaimed: Vec<Applied>,
}

impl<B> fmt::Debug for Dispatcher<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("next_ticket", &self.next_ticket)
            .field("in_flight", &self.in_flight.len())
            .field("unclaimed", &self.unclaimed.len())
            .finish_non_exhaustive()
    }
}

impl<B: Send + Sync + 'static> Dispatcher<B> {
    pub fn new(backend: B) -> Self {
        Self::shared(Arc::new(backend))
    }

    pub fn shared(backend: Arc<B>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            backend,
            tx,
            rx,
            next_ticket: 1,
            in_flight: HashSet::new(),
            unclaimed: Vec::new(),
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_pending(&self, ticket: Ticket) -> bool {
        self.in_flight.contains(&ticket)
    }

    pub fn fetch_all<E: Stored>(&mut self, store: &mut AppStore) -> Ticket
    where
        B: Gateway<E>,
    {
        self.submit::<E>(store, Operation::FetchAll, |backend: &B| {
            backend.list().map(Outcome::Fetched)
        })
    }

    pub fn create<E: Stored>(&mut self, store: &mut AppStore, draft: E::Draft) -> Ticket
    where
        B: Gateway<E>,
    {
        self.submit::<E>(store, Operation::Create, move |backend: &B| {
            backend.create(&draft).map(Outcome::Created)
        })
    }

    pub fn update<E: Stored>(&mut self, store: &mut AppStore, id: EntityId, patch: E::Patch) -> Ticket
    where
        B: Gateway<E>,
    {
        let target = id.clone();
        self.submit::<E>(store, Operation::Update(target), move |backend: &B| {
            backend.update(&id, &patch).map(Outcome::Updated)
        })
    }

    pub fn delete<E: Stored>(&mut self, store: &mut AppStore, id: EntityId) -> Ticket
    where
        B: Gateway<E>,
    {
        let target = id.clone();
        self.submit::<E>(store, Operation::Delete(target), move |backend: &B| {
            Gateway::<E>::delete(backend, &id).map(Outcome::Deleted)
        })
    }

    fn submit<E: Stored>(
        &mut self,
        store: &mut AppStore,
        operation: Operation,
        call: impl FnOnce(&B) -> Result<Outcome<E>, GatewayError> + Send + 'static,
    ) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        store.slice_mut::<E>().pending(&operation);
        self.in_flight.insert(ticket);
        tracing::debug!(%ticket, kind = %E::KIND, %operation, "dispatch");

        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let worker_op = operation.clone();
        let spawned = thread::Builder::new()
            .name(format!("fm-{}-{}", E::KIND.collection(), ticket.0))
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| call(&backend)))
                    .unwrap_or_else(|_| Err(GatewayError::Transport("request worker panicked".to_string())));
                // The receiver only goes away with the dispatcher itself.
                let _ = tx.send(completion::<E>(ticket, worker_op, result));
            });
        if let Err(err) = spawned {
            let result = Err(GatewayError::Transport(format!("spawn request worker: {err}")));
            let _ = self.tx.send(completion::<E>(ticket, operation, result));
        }
        ticket
    }

    fn apply(&mut self, store: &mut AppStore, done: Completion) -> Applied {
        let applied = done(store);
        self.in_flight.remove(&applied.ticket);
        applied
    }

    /// Apply every outcome that has already arrived, without blocking.
    pub fn pump(&mut self, store: &mut AppStore) -> Vec<Applied> {
        let mut out = std::mem::take(&mut self.unclaimed);
        while let Ok(done) = self.rx.try_recv() {
            let applied = self.apply(store, done);
            out.push(applied);
        }
        out
    }

    /// Block until `ticket` has been applied. Outcomes of other requests that arrive first
    /// are applied too and handed out by the next `pump` or `wait_idle`.
    pub fn wait_for(&mut self, store: &mut AppStore, ticket: Ticket) -> Result<Applied, StoreError> {
        if let Some(index) = self.unclaimed.iter().position(|a| a.ticket == ticket) {
            return Ok(self.unclaimed.remove(index));
        }
        if !self.in_flight.contains(&ticket) {
            return Err(StoreError::UnknownTicket(ticket));
        }
        loop {
            let done = self.rx.recv().map_err(|_| StoreError::Disconnected)?;
            let applied = self.apply(store, done);
            if applied.ticket == ticket {
                return Ok(applied);
            }
            self.unclaimed.push(applied);
        }
    }

    /// Block until nothing is in flight.
    pub fn wait_idle(&mut self, store: &mut AppStore) -> Vec<Applied> {
        let mut out = std::mem::take(&mut self.unclaimed);
        while !self.in_flight.is_empty() {
            match self.rx.recv() {
                Ok(done) => {
                    let applied = self.apply(store, done);
                    out.push(applied);
                }
                Err(_) => break,
            }
        }
        out
    }
}
