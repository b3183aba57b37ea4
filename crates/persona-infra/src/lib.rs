//! Infrastructure layer for Persona.
//!
//! Implements the `RegistryStore` port from `persona-core` on top of a JSON
//! file in the data directory, and loads `config.toml`.

pub mod config;
pub mod filesystem;
pub mod store;
