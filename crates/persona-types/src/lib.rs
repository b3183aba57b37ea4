//! Shared domain types for Persona.
//!
//! This crate contains the core domain types used across the workspace:
//! Bot, Personality (the 16 Cattell factors), Registry, configuration, and
//! their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod bot;
pub mod config;
pub mod error;
pub mod personality;
pub mod registry;
