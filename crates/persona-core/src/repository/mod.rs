//! Store trait definitions (ports).
//!
//! The infrastructure layer (persona-infra) implements these; the core crate
//! never depends on a specific storage technology.

pub mod registry;
