//! Groups and their members: contract types, domain service, SeaORM
//! storage, Argon2 secret hashing and the REST surface.

// Stable surface for other crates
pub mod contract;
pub use contract::{client, error, model};

pub mod errors;

pub mod module;
pub use config::RosterConfig;
pub use module::Roster;

// Internals, public so the integration tests and the server binary can
// reach them. Consumers should stick to `contract`.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;
