#![forbid(unsafe_code)]

mod branch;
mod building;
mod floor;
mod space;

pub use branch::*;
pub use building::*;
pub use floor::*;
pub use space::*;

use crate::ids::EntityId;
use crate::kind::EntityKind;
use crate::validate::Validate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

/// One row of domain data, owned by exactly one store slice on the client.
pub trait Entity:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: EntityKind;

    /// Create payload; the server assigns the id.
    type Draft: Clone + Debug + Serialize + Validate + Send + Sync + 'static;

    /// Update payload. Partial for PATCH collections, a full draft for PUT ones.
    type Patch: Clone + Debug + Serialize + Validate + Send + Sync + 'static;

    fn id(&self) -> &EntityId;

    /// Human-facing name used in lists, prompts and lookups.
    fn label(&self) -> &str;
}

#[cfg(test)]
mod tests;
