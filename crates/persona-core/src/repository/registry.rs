//! Registry store trait definition.

use persona_types::error::StoreError;
use persona_types::registry::Registry;

/// Durable storage for the whole bot registry.
///
/// Implementations live in persona-infra (e.g., `JsonRegistryStore`).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait RegistryStore: Send + Sync {
    /// Load the persisted registry.
    ///
    /// Returns an empty registry when nothing has been saved yet, and
    /// `StoreError::Unavailable` / `StoreError::Corrupt` when the store exists
    /// but cannot be used.
    fn load(&self) -> impl std::future::Future<Output = Result<Registry, StoreError>> + Send;

    /// Replace the persisted registry with `registry`.
    ///
    /// On `Err`, the previously persisted state must be left intact.
    fn save(
        &self,
        registry: &Registry,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
