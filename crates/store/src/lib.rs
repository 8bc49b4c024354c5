#![forbid(unsafe_code)]

mod app;
mod config;
mod dispatch;
mod error;
mod gateway;
mod notice;
mod selectors;
mod session;
mod slice;

pub use app::{AppStore, Stored};
pub use config::{ApiConfig, DEFAULT_API_BASE, DEFAULT_TIMEOUT_MS, env_var};
pub use dispatch::{Applied, Dispatcher, Ticket};
pub use error::{GatewayError, StoreError};
pub use gateway::{Backend, Gateway, HttpGateway, MemoryGateway};
pub use notice::{Notice, NoticeLevel, Notices};
pub use selectors::*;
pub use session::Session;
pub use slice::{Items, Operation, Outcome, Slice, failure_message};
