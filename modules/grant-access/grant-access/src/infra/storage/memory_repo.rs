//! In-memory grant repository.
//!
//! Rows live in a `BTreeMap` keyed by grant id behind a `tokio::sync::RwLock`.
//! Each mutation holds the write lock for its whole duration, so readers see
//! either the state before or after a batch replace, never a half-written
//! batch. State is lost on restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use grant_access_sdk::GrantRecord;
use tokio::sync::RwLock;

use crate::domain::error::DomainError;
use crate::domain::repo::{
    GrantFilter, GrantPatch, GrantRepository, NewGrant, OwnerBatchKey, ResourceKey,
};

#[derive(Debug)]
struct GrantTable {
    next_id: i64,
    rows: BTreeMap<i64, GrantRecord>,
}

impl Default for GrantTable {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl GrantTable {
    fn select(&self, pred: impl Fn(&GrantRecord) -> bool) -> Vec<GrantRecord> {
        self.rows.values().filter(|g| pred(g)).cloned().collect()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryGrantRepository {
    table: RwLock<GrantTable>,
}

impl InMemoryGrantRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GrantRepository for InMemoryGrantRepository {
    async fn find_by_owner(&self, key: &OwnerBatchKey) -> Result<Vec<GrantRecord>, DomainError> {
        Ok(self.table.read().await.select(|g| key.matches(g)))
    }

    async fn find_by_resource(&self, key: ResourceKey) -> Result<Vec<GrantRecord>, DomainError> {
        Ok(self.table.read().await.select(|g| key.matches(g)))
    }

    async fn find(&self, filter: GrantFilter) -> Result<Vec<GrantRecord>, DomainError> {
        Ok(self.table.read().await.select(|g| filter.matches(g)))
    }

    async fn replace_owner_batch(
        &self,
        key: &OwnerBatchKey,
        grants: Vec<NewGrant>,
    ) -> Result<u64, DomainError> {
        let mut table = self.table.write().await;
        table.rows.retain(|_, g| !key.matches(g));

        let inserted = grants.len() as u64;
        for grant in grants {
            let id = table.next_id;
            table.next_id += 1;
            table.rows.insert(id, grant.into_record(id));
        }
        Ok(inserted)
    }

    async fn delete_owner_batch(&self, key: &OwnerBatchKey) -> Result<u64, DomainError> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|_, g| !key.matches(g));
        Ok((before - table.rows.len()) as u64)
    }

    async fn update_selective_by_resource(
        &self,
        key: ResourceKey,
        patch: &GrantPatch,
    ) -> Result<u64, DomainError> {
        let mut table = self.table.write().await;
        let mut updated = 0;
        for grant in table.rows.values_mut().filter(|g| key.matches(g)) {
            patch.apply(grant);
            updated += 1;
        }
        Ok(updated)
    }

    async fn count_by_resource(&self, key: ResourceKey) -> Result<u64, DomainError> {
        let table = self.table.read().await;
        Ok(table.rows.values().filter(|g| key.matches(g)).count() as u64)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::sync::Arc;

    use grant_access_sdk::{AuthorityPrefix, ResourceType, Status};
    use serde_json::json;

    fn new_grant(owner: &str, kind: AuthorityPrefix, resource_id: i64) -> NewGrant {
        NewGrant {
            resource_id,
            resource_parent_id: 0,
            resource_type: ResourceType::Api,
            service_id: "order-service".to_owned(),
            path: Some("order/list".to_owned()),
            status: Status::Enabled,
            authority: format!("{}API:order.query", kind.prefix()),
            authority_owner: owner.to_owned(),
            authority_prefix: kind,
            resource_info: json!({"api_id": resource_id}),
        }
    }

    #[tokio::test]
    async fn replace_only_touches_target_batch() {
        let repo = InMemoryGrantRepository::new();
        let user = OwnerBatchKey::new("3", AuthorityPrefix::User, ResourceType::Api);
        let role = OwnerBatchKey::new("3", AuthorityPrefix::Role, ResourceType::Api);

        repo.replace_owner_batch(&user, vec![new_grant("3", AuthorityPrefix::User, 42)])
            .await
            .unwrap();
        repo.replace_owner_batch(&role, vec![new_grant("3", AuthorityPrefix::Role, 42)])
            .await
            .unwrap();
        repo.replace_owner_batch(&user, vec![new_grant("3", AuthorityPrefix::User, 43)])
            .await
            .unwrap();

        let users = repo.find_by_owner(&user).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].resource_id, 43);
        assert_eq!(repo.find_by_owner(&role).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn ids_are_never_reused() {
        let repo = InMemoryGrantRepository::new();
        let key = OwnerBatchKey::new("3", AuthorityPrefix::User, ResourceType::Api);

        repo.replace_owner_batch(&key, vec![new_grant("3", AuthorityPrefix::User, 42)])
            .await
            .unwrap();
        repo.replace_owner_batch(&key, vec![new_grant("3", AuthorityPrefix::User, 42)])
            .await
            .unwrap();

        let grants = repo.find_by_owner(&key).await.unwrap();
        assert_eq!(grants[0].id, 2);
    }

    #[tokio::test]
    async fn selective_update_keeps_path_when_absent() {
        let repo = InMemoryGrantRepository::new();
        let key = OwnerBatchKey::new("3", AuthorityPrefix::User, ResourceType::Api);
        repo.replace_owner_batch(&key, vec![new_grant("3", AuthorityPrefix::User, 42)])
            .await
            .unwrap();

        let patch = GrantPatch {
            status: Status::Disabled,
            service_id: "billing".to_owned(),
            resource_parent_id: 0,
            path: None,
            resource_info: json!({"api_id": 42, "renamed": true}),
        };
        let updated = repo
            .update_selective_by_resource(ResourceKey::new(42, ResourceType::Api), &patch)
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let grant = &repo.find_by_owner(&key).await.unwrap()[0];
        assert_eq!(grant.status, Status::Disabled);
        assert_eq!(grant.service_id, "billing");
        assert_eq!(grant.path.as_deref(), Some("order/list"));
        assert_eq!(grant.authority, "USER_API:order.query");
    }

    #[tokio::test]
    async fn delete_and_count() {
        let repo = InMemoryGrantRepository::new();
        let key = OwnerBatchKey::new("3", AuthorityPrefix::User, ResourceType::Api);
        repo.replace_owner_batch(
            &key,
            vec![
                new_grant("3", AuthorityPrefix::User, 42),
                new_grant("3", AuthorityPrefix::User, 43),
            ],
        )
        .await
        .unwrap();

        let resource = ResourceKey::new(42, ResourceType::Api);
        assert_eq!(repo.count_by_resource(resource).await.unwrap(), 1);
        assert_eq!(repo.delete_owner_batch(&key).await.unwrap(), 2);
        assert_eq!(repo.count_by_resource(resource).await.unwrap(), 0);
        assert_eq!(repo.delete_owner_batch(&key).await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn readers_never_see_partial_batch() {
        let repo = Arc::new(InMemoryGrantRepository::new());
        let key = OwnerBatchKey::new("3", AuthorityPrefix::User, ResourceType::Api);
        let batch = |base: i64| {
            (base..base + 3)
                .map(|id| new_grant("3", AuthorityPrefix::User, id))
                .collect::<Vec<_>>()
        };
        repo.replace_owner_batch(&key, batch(0)).await.unwrap();

        let writer = {
            let repo = repo.clone();
            let key = key.clone();
            tokio::spawn(async move {
                for round in 0..300 {
                    repo.replace_owner_batch(&key, batch(round * 10))
                        .await
                        .unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };
        let reader = {
            let repo = repo.clone();
            tokio::spawn(async move {
                let filter = GrantFilter::new()
                    .owner_kind(AuthorityPrefix::User)
                    .owners(["3"])
                    .resource_type(ResourceType::Api);
                for _ in 0..300 {
                    let seen = repo.find(filter.clone()).await.unwrap();
                    assert_eq!(seen.len(), 3);
                    tokio::task::yield_now().await;
                }
            })
        };

        writer.await.unwrap();
        reader.await.unwrap();
        assert_eq!(repo.find_by_owner(&key).await.unwrap().len(), 3);
    }
}
