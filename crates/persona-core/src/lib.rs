//! Business logic and store trait definitions for Persona.
//!
//! This crate defines the "port" (the `RegistryStore` trait) that the
//! infrastructure layer implements, plus the registry/editor services and the
//! personality model logic. It depends only on `persona-types` -- never on
//! `persona-infra` or any filesystem crate.

pub mod personality;
pub mod repository;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;
