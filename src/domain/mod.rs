//! Domain layer of the bilan engine
//!
//! Models, collaborator ports and errors. Nothing in here performs I/O.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
