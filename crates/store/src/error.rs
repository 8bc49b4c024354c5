#![forbid(unsafe_code)]

use crate::dispatch::Ticket;
use fm_core::validate::FieldErrors;

/// Failure of one remote call. Slices flatten it to a message at their boundary.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("not found")]
    NotFound,
    #[error("request failed with status code {status}")]
    Status { status: u16 },
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("invalid base url {0:?}")]
    InvalidBaseUrl(String),
}

impl GatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl From<ureq::Error> for GatewayError {
    fn from(value: ureq::Error) -> Self {
        match value {
            ureq::Error::Status(404, _) => Self::NotFound,
            ureq::Error::Status(status, _) => Self::Status { status },
            ureq::Error::Transport(transport) => Self::Transport(transport.to_string()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    Invalid(#[from] FieldErrors),
    #[error("{0}")]
    Rejected(String),
    #[error("unknown ticket {0}")]
    UnknownTicket(Ticket),
    #[error("dispatcher channel closed")]
    Disconnected,
}
