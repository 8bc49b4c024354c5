#![forbid(unsafe_code)]

use crate::app::{AppStore, Stored};
use crate::dispatch::{Applied, Dispatcher, Ticket};
use crate::error::StoreError;
use crate::gateway::Gateway;
use fm_core::EntityId;
use fm_core::validate::Validate;
use std::sync::Arc;

/// The store together with the dispatcher feeding it. This is the value the console
/// threads through its pages and confirmation actions.
#[derive(Debug)]
pub struct Session<B> {
    store: AppStore,
    dispatcher: Dispatcher<B>,
}

impl<B: Send + Sync + 'static> Session<B> {
    pub fn new(backend: B) -> Self {
        Self {
            store: AppStore::new(),
            dispatcher: Dispatcher::new(backend),
        }
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut AppStore {
        &mut self.store
    }

    pub fn backend(&self) -> &Arc<B> {
        self.dispatcher.backend()
    }

    pub fn in_flight(&self) -> usize {
        self.dispatcher.in_flight()
    }

    pub fn fetch_all<E: Stored>(&mut self) -> Ticket
    where
        B: Gateway<E>,
    {
        self.dispatcher.fetch_all::<E>(&mut self.store)
    }

    /// Validate, then dispatch. Invalid drafts never reach the slice or the network.
    pub fn create<E: Stored>(&mut self, draft: E::Draft) -> Result<Ticket, StoreError>
    where
        B: Gateway<E>,
    {
        draft.validate()?;
        Ok(self.dispatcher.create::<E>(&mut self.store, draft))
    }

    pub fn update<E: Stored>(&mut self, id: EntityId, patch: E::Patch) -> Result<Ticket, StoreError>
    where
        B: Gateway<E>,
    {
        patch.validate()?;
        Ok(self.dispatcher.update::<E>(&mut self.store, id, patch))
    }

    pub fn delete<E: Stored>(&mut self, id: EntityId) -> Ticket
    where
        B: Gateway<E>,
    {
        self.dispatcher.delete::<E>(&mut self.store, id)
    }

    pub fn pump(&mut self) -> Vec<Applied> {
        self.dispatcher.pump(&mut self.store)
    }

    pub fn wait_for(&mut self, ticket: Ticket) -> Result<Applied, StoreError> {
        self.dispatcher.wait_for(&mut self.store, ticket)
    }

    /// Wait for `ticket` and turn a rejection into an error carrying the slice message.
    pub fn settle(&mut self, ticket: Ticket) -> Result<Applied, StoreError> {
        let applied = self.wait_for(ticket)?;
        match &applied.error {
            Some(message) => Err(StoreError::Rejected(message.clone())),
            None => Ok(applied),
        }
    }

    pub fn wait_idle(&mut self) -> Vec<Applied> {
        self.dispatcher.wait_idle(&mut self.store)
    }

    /// Refetch a collection and wait for it; the refresh step after every mutation.
    pub fn invalidate<E: Stored>(&mut self) -> Result<Applied, StoreError>
    where
        B: Gateway<E>,
    {
        let ticket = self.fetch_all::<E>();
        self.settle(ticket)
    }
}
