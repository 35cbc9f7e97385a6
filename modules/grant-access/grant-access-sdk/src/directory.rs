//! Contracts of the collaborators consumed by the grant access engine.
//!
//! Implementations live outside the engine; the module ships static
//! in-process implementations for development and tests.

use async_trait::async_trait;

use crate::error::CollaboratorError;
use crate::models::{App, Resource, ResourceType, Role};

/// Keyed lookup of protected resources, one keyspace per [`ResourceType`].
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Returns `Ok(None)` when no resource of `resource_type` has `id`.
    ///
    /// # Errors
    ///
    /// - `Unavailable` / `Internal` when the store itself fails
    async fn get(
        &self,
        resource_type: ResourceType,
        id: i64,
    ) -> Result<Option<Resource>, CollaboratorError>;
}

/// Role membership and role metadata.
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    /// Roles currently assigned to `user_id`; empty when the user has none.
    ///
    /// # Errors
    ///
    /// - `Unavailable` / `Internal` when the directory fails
    async fn roles_of(&self, user_id: &str) -> Result<Vec<Role>, CollaboratorError>;

    /// # Errors
    ///
    /// - `Unavailable` / `Internal` when the directory fails
    async fn role_by_id(&self, role_id: &str) -> Result<Option<Role>, CollaboratorError>;
}

/// Lookup of client applications owning `APP` grants.
#[async_trait]
pub trait AppDirectory: Send + Sync {
    /// # Errors
    ///
    /// - `Unavailable` / `Internal` when the directory fails
    async fn app_by_id(&self, app_id: &str) -> Result<Option<App>, CollaboratorError>;
}

/// Refresh trigger of the enforcement gateway.
///
/// Best-effort: the engine logs failures and never retries them.
#[async_trait]
pub trait GatewayNotifier: Send + Sync {
    /// # Errors
    ///
    /// - Any failure to deliver the refresh signal
    async fn refresh(&self) -> Result<(), CollaboratorError>;
}
