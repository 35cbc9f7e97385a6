use async_trait::async_trait;
use grant_access_sdk::{AuthorityPrefix, GrantRecord, ResourceType, Status};

use super::error::DomainError;

/// Identifies one owner's grant batch for one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnerBatchKey {
    pub owner_id: String,
    pub owner_kind: AuthorityPrefix,
    pub resource_type: ResourceType,
}

impl OwnerBatchKey {
    #[must_use]
    pub fn new(
        owner_id: impl Into<String>,
        owner_kind: AuthorityPrefix,
        resource_type: ResourceType,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            owner_kind,
            resource_type,
        }
    }

    #[must_use]
    pub fn matches(&self, grant: &GrantRecord) -> bool {
        grant.authority_owner == self.owner_id
            && grant.authority_prefix == self.owner_kind
            && grant.resource_type == self.resource_type
    }
}

/// Identifies a governed resource across all owners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub resource_id: i64,
    pub resource_type: ResourceType,
}

impl ResourceKey {
    #[must_use]
    pub const fn new(resource_id: i64, resource_type: ResourceType) -> Self {
        Self {
            resource_id,
            resource_type,
        }
    }

    #[must_use]
    pub fn matches(&self, grant: &GrantRecord) -> bool {
        grant.resource_id == self.resource_id && grant.resource_type == self.resource_type
    }
}

/// Grant ready to be inserted; the repository assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGrant {
    pub resource_id: i64,
    pub resource_parent_id: i64,
    pub resource_type: ResourceType,
    pub service_id: String,
    pub path: Option<String>,
    pub status: Status,
    pub authority: String,
    pub authority_owner: String,
    pub authority_prefix: AuthorityPrefix,
    pub resource_info: serde_json::Value,
}

impl NewGrant {
    #[must_use]
    pub fn into_record(self, id: i64) -> GrantRecord {
        GrantRecord {
            id,
            resource_id: self.resource_id,
            resource_parent_id: self.resource_parent_id,
            resource_type: self.resource_type,
            service_id: self.service_id,
            path: self.path,
            status: self.status,
            authority: self.authority,
            authority_owner: self.authority_owner,
            authority_prefix: self.authority_prefix,
            resource_info: self.resource_info,
        }
    }
}

/// Resource-derived fields refreshed on every grant of a resource.
///
/// Ownership fields are never part of a patch. A `None` path leaves the
/// stored path untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct GrantPatch {
    pub status: Status,
    pub service_id: String,
    pub resource_parent_id: i64,
    pub path: Option<String>,
    pub resource_info: serde_json::Value,
}

impl GrantPatch {
    pub fn apply(&self, grant: &mut GrantRecord) {
        grant.status = self.status;
        grant.service_id.clone_from(&self.service_id);
        grant.resource_parent_id = self.resource_parent_id;
        if let Some(path) = &self.path {
            grant.path = Some(path.clone());
        }
        grant.resource_info.clone_from(&self.resource_info);
    }
}

/// Query over grant records. Built fresh for every call; unset fields do
/// not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantFilter {
    pub owner_kind: Option<AuthorityPrefix>,
    pub owners: Option<Vec<String>>,
    pub resource_type: Option<ResourceType>,
    pub status: Option<Status>,
}

impl GrantFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn owner_kind(mut self, owner_kind: AuthorityPrefix) -> Self {
        self.owner_kind = Some(owner_kind);
        self
    }

    #[must_use]
    pub fn owners<I, S>(mut self, owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.owners = Some(owners.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn resource_type(mut self, resource_type: ResourceType) -> Self {
        self.resource_type = Some(resource_type);
        self
    }

    #[must_use]
    pub fn enabled(mut self) -> Self {
        self.status = Some(Status::Enabled);
        self
    }

    #[must_use]
    pub fn matches(&self, grant: &GrantRecord) -> bool {
        self.owner_kind.is_none_or(|kind| grant.authority_prefix == kind)
            && self
                .owners
                .as_ref()
                .is_none_or(|owners| owners.contains(&grant.authority_owner))
            && self
                .resource_type
                .is_none_or(|kind| grant.resource_type == kind)
            && self.status.is_none_or(|status| grant.status == status)
    }
}

/// Persistence port for grant records.
///
/// Every mutating method is one atomic unit: concurrent readers observe
/// either the state before or after it, never an intermediate one.
/// Query results are ordered by ascending grant id.
#[async_trait]
pub trait GrantRepository: Send + Sync {
    async fn find_by_owner(&self, key: &OwnerBatchKey) -> Result<Vec<GrantRecord>, DomainError>;

    async fn find_by_resource(&self, key: ResourceKey) -> Result<Vec<GrantRecord>, DomainError>;

    async fn find(&self, filter: GrantFilter) -> Result<Vec<GrantRecord>, DomainError>;

    /// Delete the owner's batch and insert `grants` in its place.
    /// Returns the number of inserted grants.
    async fn replace_owner_batch(
        &self,
        key: &OwnerBatchKey,
        grants: Vec<NewGrant>,
    ) -> Result<u64, DomainError>;

    /// Returns the number of deleted grants.
    async fn delete_owner_batch(&self, key: &OwnerBatchKey) -> Result<u64, DomainError>;

    /// Returns the number of updated grants.
    async fn update_selective_by_resource(
        &self,
        key: ResourceKey,
        patch: &GrantPatch,
    ) -> Result<u64, DomainError>;

    async fn count_by_resource(&self, key: ResourceKey) -> Result<u64, DomainError>;

    async fn list_enabled(
        &self,
        resource_type: Option<ResourceType>,
    ) -> Result<Vec<GrantRecord>, DomainError> {
        let mut filter = GrantFilter::new().enabled();
        filter.resource_type = resource_type;
        self.find(filter).await
    }
}
