//! Local (in-process) client for the grant access engine.

use std::sync::Arc;

use async_trait::async_trait;
use grant_access_sdk::{GrantAccessClientV1, GrantAccessError, GrantRecord};

use super::error::{DomainError, parse_owner_kind, parse_resource_type};
use super::repo::GrantRepository;
use super::service::Service;

/// Local client wrapping the service.
pub struct GrantAccessLocalClient<R: GrantRepository + ?Sized> {
    svc: Arc<Service<R>>,
}

impl<R: GrantRepository + ?Sized> GrantAccessLocalClient<R> {
    #[must_use]
    pub fn new(svc: Arc<Service<R>>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> GrantAccessError {
    match &e {
        DomainError::Collaborator(_) | DomainError::Database(_) | DomainError::Internal(_) => {
            tracing::error!(operation = op, error = ?e, "grant_access call failed");
        }
        _ => tracing::debug!(operation = op, error = %e, "grant_access call rejected"),
    }
    e.into()
}

#[async_trait]
impl<R: GrantRepository + ?Sized + 'static> GrantAccessClientV1 for GrantAccessLocalClient<R> {
    async fn add_grants(
        &self,
        owner_id: &str,
        owner_kind: &str,
        resource_type: &str,
        resource_ids: &[i64],
    ) -> Result<Vec<String>, GrantAccessError> {
        async {
            let owner_kind = parse_owner_kind(owner_kind)?;
            let resource_type = parse_resource_type(resource_type)?;
            self.svc
                .add_grants(owner_id, owner_kind, resource_type, resource_ids)
                .await
        }
        .await
        .map_err(|e| log_and_convert("add_grants", e))
    }

    async fn remove_grants(
        &self,
        owner_id: &str,
        owner_kind: &str,
        resource_type: &str,
    ) -> Result<(), GrantAccessError> {
        async {
            let owner_kind = parse_owner_kind(owner_kind)?;
            let resource_type = parse_resource_type(resource_type)?;
            self.svc
                .remove_grants(owner_id, owner_kind, resource_type)
                .await
        }
        .await
        .map_err(|e| log_and_convert("remove_grants", e))
    }

    async fn sync_resource_change(
        &self,
        resource_type: &str,
        resource_id: i64,
    ) -> Result<(), GrantAccessError> {
        async {
            let resource_type = parse_resource_type(resource_type)?;
            self.svc.sync_resource_change(resource_type, resource_id).await
        }
        .await
        .map_err(|e| log_and_convert("sync_resource_change", e))
    }

    async fn has_grant(
        &self,
        resource_id: i64,
        resource_type: &str,
    ) -> Result<bool, GrantAccessError> {
        async {
            let resource_type = parse_resource_type(resource_type)?;
            self.svc.has_grant(resource_id, resource_type).await
        }
        .await
        .map_err(|e| log_and_convert("has_grant", e))
    }

    async fn ensure_resource_removable(
        &self,
        resource_id: i64,
        resource_type: &str,
    ) -> Result<(), GrantAccessError> {
        async {
            let resource_type = parse_resource_type(resource_type)?;
            self.svc
                .ensure_resource_removable(resource_id, resource_type)
                .await
        }
        .await
        .map_err(|e| log_and_convert("ensure_resource_removable", e))
    }

    async fn effective_permissions(
        &self,
        user_id: &str,
        resource_type: &str,
    ) -> Result<Vec<GrantRecord>, GrantAccessError> {
        async {
            let resource_type = parse_resource_type(resource_type)?;
            self.svc.effective_permissions(user_id, resource_type).await
        }
        .await
        .map_err(|e| log_and_convert("effective_permissions", e))
    }

    async fn private_permissions(&self, user_id: &str)
    -> Result<Vec<GrantRecord>, GrantAccessError> {
        self.svc
            .private_permissions(user_id)
            .await
            .map_err(|e| log_and_convert("private_permissions", e))
    }

    async fn list_enabled(
        &self,
        resource_type: Option<&str>,
    ) -> Result<Vec<GrantRecord>, GrantAccessError> {
        async {
            let resource_type = resource_type.map(parse_resource_type).transpose()?;
            self.svc.list_enabled(resource_type).await
        }
        .await
        .map_err(|e| log_and_convert("list_enabled", e))
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        owner_kind: &str,
        resource_type: &str,
    ) -> Result<Vec<GrantRecord>, GrantAccessError> {
        async {
            let owner_kind = parse_owner_kind(owner_kind)?;
            let resource_type = parse_resource_type(resource_type)?;
            self.svc
                .list_by_owner(owner_id, owner_kind, resource_type)
                .await
        }
        .await
        .map_err(|e| log_and_convert("list_by_owner", e))
    }
}
