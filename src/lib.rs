//! Change detection and typed notifications over relation data bags.
//!
//! Two applications joined by a relation each publish a flat string mapping
//! that the other side can read. This crate turns changes of the remote
//! mapping into named events:
//!
//! - [`DiffEngine`] compares the remote mapping with the last one reported
//! - [`classify`] maps a diff to at most one [`EventKind`]
//! - [`AliasAllocator`] tells concurrent relation instances apart
//! - [`EventRouter`] delivers events to listeners, unqualified then aliased
//! - [`RequirerManager`] / [`ProviderManager`] drive the cycle per trigger
//!
//! Storage is abstracted behind [`RelationBackend`]; an in-memory and a
//! sled backed implementation are provided.

mod adapters;
mod config;
pub mod constants;
mod core;
mod errors;
mod interface;
mod metrics;
mod storage;

pub use adapters::*;
pub use config::*;
pub use core::*;
pub use errors::*;
pub use interface::*;
pub use metrics::*;
pub use storage::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
