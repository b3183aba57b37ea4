//! File-backed registry storage.

pub mod backup;
pub mod json;

pub use json::JsonRegistryStore;
