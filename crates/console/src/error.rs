#![forbid(unsafe_code)]

use fm_core::search::SearchError;
use fm_core::{EntityId, EntityIdError, EntityKind};
use fm_store::{GatewayError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("{field}: {source}")]
    Choice {
        field: &'static str,
        #[source]
        source: SearchError,
    },
    #[error("{} {id} is not loaded", .kind.title())]
    Unknown { kind: EntityKind, id: EntityId },
    #[error("no fields given to change")]
    NothingToChange,
    #[error("invalid id: {0}")]
    InvalidId(#[from] EntityIdError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConsoleError {
    pub fn choice(field: &'static str) -> impl FnOnce(SearchError) -> Self {
        move |source| Self::Choice { field, source }
    }
}
