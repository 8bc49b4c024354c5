#![forbid(unsafe_code)]

mod http;
mod memory;

pub use http::HttpGateway;
pub use memory::MemoryGateway;

use crate::error::GatewayError;
use fm_core::model::{Branch, Building, Floor, Space};
use fm_core::{Entity, EntityId};

/// Blocking remote access to one entity collection. Implementations are shared with
/// worker threads, so every call takes `&self`.
pub trait Gateway<E: Entity>: Send + Sync {
    fn list(&self) -> Result<Vec<E>, GatewayError>;

    fn create(&self, draft: &E::Draft) -> Result<E, GatewayError>;

    fn update(&self, id: &EntityId, patch: &E::Patch) -> Result<E, GatewayError>;

    /// Returns the id that was asked for; the response body is ignored.
    fn delete(&self, id: &EntityId) -> Result<EntityId, GatewayError>;
}

/// A gateway covering every collection the console works with.
pub trait Backend:
    Gateway<Branch> + Gateway<Building> + Gateway<Floor> + Gateway<Space> + 'static
{
}

impl<T> Backend for T where
    T: Gateway<Branch> + Gateway<Building> + Gateway<Floor> + Gateway<Space> + 'static
{
}
