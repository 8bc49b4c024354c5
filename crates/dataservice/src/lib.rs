#![forbid(unsafe_code)]

//! In-memory REST data service for the facilities console. Serves
//! `/{collection}` and `/{collection}/{id}` over loopback HTTP from a JSON document.

mod db;
mod server;

pub use db::{DataError, Database, Record};
pub use server::{DataService, Reply, route};
