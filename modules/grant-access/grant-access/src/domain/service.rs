//! Grant access engine.
//!
//! Owns the replace-by-owner protocol, the resource synchronization path and
//! the effective-permission merge. Every mutation is followed by exactly one
//! gateway refresh, issued after the repository has committed.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use grant_access_sdk::{
    AppDirectory, AuthorityPrefix, GatewayNotifier, GrantRecord, ResourceStore, ResourceType,
    RoleDirectory,
};
use tracing::{debug, info, instrument, warn};

use super::builder::{GrantBuilder, GrantOwner};
use super::error::DomainError;
use super::repo::{GrantFilter, GrantRepository, OwnerBatchKey, ResourceKey};

pub const DEFAULT_SERVICE_ID: &str = "base-provider";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Issuing application id stamped on menu and action grants.
    pub service_id: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_id: DEFAULT_SERVICE_ID.to_owned(),
        }
    }
}

/// External collaborators of the engine, passed in at construction.
#[derive(Clone)]
pub struct Collaborators {
    pub resources: Arc<dyn ResourceStore>,
    pub roles: Arc<dyn RoleDirectory>,
    pub apps: Arc<dyn AppDirectory>,
    pub notifier: Arc<dyn GatewayNotifier>,
}

pub struct Service<R: GrantRepository + ?Sized> {
    repo: Arc<R>,
    builder: GrantBuilder,
    resources: Arc<dyn ResourceStore>,
    roles: Arc<dyn RoleDirectory>,
    notifier: Arc<dyn GatewayNotifier>,
}

impl<R: GrantRepository + ?Sized> Service<R> {
    #[must_use]
    pub fn new(repo: Arc<R>, collaborators: Collaborators, config: ServiceConfig) -> Self {
        let Collaborators {
            resources,
            roles,
            apps,
            notifier,
        } = collaborators;
        Self {
            repo,
            builder: GrantBuilder::new(config.service_id, roles.clone(), apps),
            resources,
            roles,
            notifier,
        }
    }

    /// Replace the owner's grant batch for `resource_type` with grants for
    /// `resource_ids` and return their authorities in input order.
    ///
    /// Unresolvable ids are skipped; repeated ids count once. Nothing is
    /// written unless every resolvable id builds.
    ///
    /// # Errors
    ///
    /// - `UnknownRole` if a `ROLE` owner does not resolve
    /// - `Collaborator` / `Database` for infrastructure failures
    #[instrument(
        skip(self, owner_kind, resource_type, resource_ids),
        fields(
            owner_kind = %owner_kind,
            resource_type = %resource_type,
            requested = resource_ids.len()
        )
    )]
    pub async fn add_grants(
        &self,
        owner_id: &str,
        owner_kind: AuthorityPrefix,
        resource_type: ResourceType,
        resource_ids: &[i64],
    ) -> Result<Vec<String>, DomainError> {
        let owner = GrantOwner::new(owner_id, owner_kind);
        let mut seen = HashSet::with_capacity(resource_ids.len());
        let mut batch = Vec::with_capacity(resource_ids.len());

        for &resource_id in resource_ids {
            if !seen.insert(resource_id) {
                continue;
            }
            let resource = self.resources.get(resource_type, resource_id).await?;
            let Some(draft) = self
                .builder
                .build(resource_type, resource.as_ref(), Some(&owner))
                .await?
            else {
                debug!(resource_id, "resource not found, skipping");
                continue;
            };
            let grant = draft
                .into_new_grant()
                .ok_or_else(|| DomainError::internal("grant built without an owner"))?;
            batch.push(grant);
        }

        let authorities = batch.iter().map(|g| g.authority.clone()).collect();
        let key = OwnerBatchKey::new(owner_id, owner_kind, resource_type);
        let inserted = self.repo.replace_owner_batch(&key, batch).await?;
        info!(inserted, "owner grant batch replaced");

        self.refresh_gateway().await;
        Ok(authorities)
    }

    /// Delete the owner's grant batch. The gateway is refreshed even when
    /// nothing was deleted.
    ///
    /// # Errors
    ///
    /// - `Database` for storage failures
    #[instrument(
        skip(self, owner_kind, resource_type),
        fields(owner_kind = %owner_kind, resource_type = %resource_type)
    )]
    pub async fn remove_grants(
        &self,
        owner_id: &str,
        owner_kind: AuthorityPrefix,
        resource_type: ResourceType,
    ) -> Result<(), DomainError> {
        let key = OwnerBatchKey::new(owner_id, owner_kind, resource_type);
        let deleted = self.repo.delete_owner_batch(&key).await?;
        info!(deleted, "owner grant batch removed");

        self.refresh_gateway().await;
        Ok(())
    }

    /// Copy the current status, service, parent, path and snapshot of a
    /// resource into every grant that references it. Authorities and owners
    /// are left as they are; a resource that no longer resolves is a no-op.
    ///
    /// # Errors
    ///
    /// - `Collaborator` / `Database` for infrastructure failures
    #[instrument(skip(self, resource_type), fields(resource_type = %resource_type))]
    pub async fn sync_resource_change(
        &self,
        resource_type: ResourceType,
        resource_id: i64,
    ) -> Result<(), DomainError> {
        let resource = self.resources.get(resource_type, resource_id).await?;
        let draft = self
            .builder
            .build(resource_type, resource.as_ref(), None)
            .await?;

        if let Some(draft) = draft {
            let key = ResourceKey::new(resource_id, resource_type);
            let updated = self
                .repo
                .update_selective_by_resource(key, &draft.into_patch())
                .await?;
            info!(updated, "grants synchronized with resource");
        } else {
            debug!("resource not found, nothing to synchronize");
        }

        self.refresh_gateway().await;
        Ok(())
    }

    /// # Errors
    ///
    /// - `Database` for storage failures
    #[instrument(skip(self, resource_type), fields(resource_type = %resource_type))]
    pub async fn has_grant(
        &self,
        resource_id: i64,
        resource_type: ResourceType,
    ) -> Result<bool, DomainError> {
        let count = self
            .repo
            .count_by_resource(ResourceKey::new(resource_id, resource_type))
            .await?;
        Ok(count > 0)
    }

    /// # Errors
    ///
    /// - `ResourceInUse` if any grant references the resource
    /// - `Database` for storage failures
    #[instrument(skip(self, resource_type), fields(resource_type = %resource_type))]
    pub async fn ensure_resource_removable(
        &self,
        resource_id: i64,
        resource_type: ResourceType,
    ) -> Result<(), DomainError> {
        if self.has_grant(resource_id, resource_type).await? {
            return Err(DomainError::ResourceInUse {
                resource_id,
                resource_type,
            });
        }
        Ok(())
    }

    /// Enabled private grants of the user merged with the enabled grants of
    /// every role assigned to the user, one grant per resource.
    ///
    /// # Errors
    ///
    /// - `Collaborator` / `Database` for infrastructure failures
    #[instrument(skip(self, resource_type), fields(resource_type = %resource_type))]
    pub async fn effective_permissions(
        &self,
        user_id: &str,
        resource_type: ResourceType,
    ) -> Result<Vec<GrantRecord>, DomainError> {
        let private = self
            .repo
            .find(
                GrantFilter::new()
                    .owner_kind(AuthorityPrefix::User)
                    .owners([user_id])
                    .resource_type(resource_type)
                    .enabled(),
            )
            .await?;

        let roles = self.roles.roles_of(user_id).await?;
        let inherited = if roles.is_empty() {
            Vec::new()
        } else {
            self.repo
                .find(
                    GrantFilter::new()
                        .owner_kind(AuthorityPrefix::Role)
                        .owners(roles.into_iter().map(|role| role.role_id))
                        .resource_type(resource_type)
                        .enabled(),
                )
                .await?
        };

        debug!(
            private = private.len(),
            inherited = inherited.len(),
            "merging user permissions"
        );
        Ok(merge_permissions(private, inherited))
    }

    /// # Errors
    ///
    /// - `Database` for storage failures
    #[instrument(skip(self))]
    pub async fn private_permissions(&self, user_id: &str)
    -> Result<Vec<GrantRecord>, DomainError> {
        self.repo
            .find(
                GrantFilter::new()
                    .owner_kind(AuthorityPrefix::User)
                    .owners([user_id])
                    .enabled(),
            )
            .await
    }

    /// # Errors
    ///
    /// - `Database` for storage failures
    #[instrument(skip(self))]
    pub async fn list_enabled(
        &self,
        resource_type: Option<ResourceType>,
    ) -> Result<Vec<GrantRecord>, DomainError> {
        self.repo.list_enabled(resource_type).await
    }

    /// # Errors
    ///
    /// - `Database` for storage failures
    #[instrument(
        skip(self, owner_kind, resource_type),
        fields(owner_kind = %owner_kind, resource_type = %resource_type)
    )]
    pub async fn list_by_owner(
        &self,
        owner_id: &str,
        owner_kind: AuthorityPrefix,
        resource_type: ResourceType,
    ) -> Result<Vec<GrantRecord>, DomainError> {
        self.repo
            .find_by_owner(&OwnerBatchKey::new(owner_id, owner_kind, resource_type))
            .await
    }

    async fn refresh_gateway(&self) {
        if let Err(e) = self.notifier.refresh().await {
            warn!(error = %e, "gateway refresh failed, grants stay committed");
        }
    }
}

/// Union of `private` and `inherited`, keeping the first grant seen for each
/// `(resource_id, resource_type)`, ordered by grant id.
#[must_use]
pub fn merge_permissions(
    private: Vec<GrantRecord>,
    inherited: Vec<GrantRecord>,
) -> Vec<GrantRecord> {
    let mut by_resource: HashMap<(i64, ResourceType), GrantRecord> =
        HashMap::with_capacity(private.len() + inherited.len());
    for grant in private.into_iter().chain(inherited) {
        by_resource
            .entry((grant.resource_id, grant.resource_type))
            .or_insert(grant);
    }

    let mut merged: Vec<GrantRecord> = by_resource.into_values().collect();
    merged.sort_by_key(|grant| grant.id);
    merged
}
