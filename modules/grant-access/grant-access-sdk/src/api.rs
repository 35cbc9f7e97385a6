//! Public API trait for the grant access module.

use async_trait::async_trait;

use crate::error::GrantAccessError;
use crate::models::GrantRecord;

/// Public API of the grant access engine.
///
/// Owner kinds (`ROLE`, `USER`, `APP`) and resource types (`MENU`, `ACTION`,
/// `API`) are passed as received from the management layer and validated here.
///
/// Every mutating call triggers exactly one gateway refresh after the change
/// is committed.
#[async_trait]
pub trait GrantAccessClientV1: Send + Sync {
    /// Replace the grant batch of `(owner_id, owner_kind, resource_type)` with
    /// grants for `resource_ids`.
    ///
    /// Ids that do not resolve to a resource are skipped. Returns the
    /// synthesized authorities in input order.
    ///
    /// # Errors
    ///
    /// - `UnsupportedAuthorityKind` / `UnsupportedResourceType` for unknown kinds
    /// - `UnknownRole` if a `ROLE` owner does not resolve
    /// - `Internal` for storage or collaborator failures
    async fn add_grants(
        &self,
        owner_id: &str,
        owner_kind: &str,
        resource_type: &str,
        resource_ids: &[i64],
    ) -> Result<Vec<String>, GrantAccessError>;

    /// Delete every grant of `(owner_id, owner_kind, resource_type)`.
    ///
    /// # Errors
    ///
    /// - `UnsupportedAuthorityKind` / `UnsupportedResourceType` for unknown kinds
    /// - `Internal` for storage failures
    async fn remove_grants(
        &self,
        owner_id: &str,
        owner_kind: &str,
        resource_type: &str,
    ) -> Result<(), GrantAccessError>;

    /// Propagate a changed resource into every grant that references it.
    ///
    /// # Errors
    ///
    /// - `UnsupportedResourceType` for an unknown resource type
    /// - `Internal` for storage or collaborator failures
    async fn sync_resource_change(
        &self,
        resource_type: &str,
        resource_id: i64,
    ) -> Result<(), GrantAccessError>;

    /// Whether any grant, of any owner and status, references the resource.
    ///
    /// # Errors
    ///
    /// - `UnsupportedResourceType` for an unknown resource type
    /// - `Internal` for storage failures
    async fn has_grant(&self, resource_id: i64, resource_type: &str)
    -> Result<bool, GrantAccessError>;

    /// Deletion guard for resource management.
    ///
    /// # Errors
    ///
    /// - `ResourceInUse` if any grant references the resource
    /// - `UnsupportedResourceType` for an unknown resource type
    /// - `Internal` for storage failures
    async fn ensure_resource_removable(
        &self,
        resource_id: i64,
        resource_type: &str,
    ) -> Result<(), GrantAccessError>;

    /// Enabled private grants of the user merged with the enabled grants of
    /// the user's roles, one per resource, ordered by grant id.
    ///
    /// # Errors
    ///
    /// - `UnsupportedResourceType` for an unknown resource type
    /// - `Internal` for storage or role directory failures
    async fn effective_permissions(
        &self,
        user_id: &str,
        resource_type: &str,
    ) -> Result<Vec<GrantRecord>, GrantAccessError>;

    /// Enabled private grants of the user across all resource types.
    ///
    /// # Errors
    ///
    /// - `Internal` for storage failures
    async fn private_permissions(&self, user_id: &str)
    -> Result<Vec<GrantRecord>, GrantAccessError>;

    /// All enabled grants, optionally restricted to one resource type.
    ///
    /// # Errors
    ///
    /// - `UnsupportedResourceType` for an unknown resource type
    /// - `Internal` for storage failures
    async fn list_enabled(
        &self,
        resource_type: Option<&str>,
    ) -> Result<Vec<GrantRecord>, GrantAccessError>;

    /// The current grant batch of `(owner_id, owner_kind, resource_type)`.
    ///
    /// # Errors
    ///
    /// - `UnsupportedAuthorityKind` / `UnsupportedResourceType` for unknown kinds
    /// - `Internal` for storage failures
    async fn list_by_owner(
        &self,
        owner_id: &str,
        owner_kind: &str,
        resource_type: &str,
    ) -> Result<Vec<GrantRecord>, GrantAccessError>;
}
