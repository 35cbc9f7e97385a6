#![allow(clippy::unwrap_used, clippy::expect_used)]

//! `SeaORM` repository against in-memory `SQLite`.

use std::sync::Arc;

use grant_access::domain::repo::{
    GrantFilter, GrantPatch, GrantRepository, NewGrant, OwnerBatchKey, ResourceKey,
};
use grant_access::infra::storage::SeaOrmGrantRepository;
use grant_access::infra::storage::migrations::Migrator;
use grant_access_sdk::{AuthorityPrefix, ResourceType, Status};
use sea_orm_migration::MigratorTrait;
use serde_json::json;

async fn setup() -> SeaOrmGrantRepository {
    let repo = SeaOrmGrantRepository::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to database");
    Migrator::up(repo.connection(), None).await.expect("migrate");
    repo
}

fn grant(
    owner: &str,
    kind: AuthorityPrefix,
    resource_type: ResourceType,
    resource_id: i64,
) -> NewGrant {
    NewGrant {
        resource_id,
        resource_parent_id: 0,
        resource_type,
        service_id: "order-service".to_owned(),
        path: Some(format!("order/{resource_id}")),
        status: Status::Enabled,
        authority: format!("{}{resource_type}:code{resource_id}", kind.prefix()),
        authority_owner: owner.to_owned(),
        authority_prefix: kind,
        resource_info: json!({"api_id": resource_id, "tags": ["a", "b"]}),
    }
}

#[tokio::test]
async fn sqlite_replace_batch_round_trips_records() {
    let repo = setup().await;
    let key = OwnerBatchKey::new("3", AuthorityPrefix::User, ResourceType::Api);

    let inserted = repo
        .replace_owner_batch(
            &key,
            vec![
                grant("3", AuthorityPrefix::User, ResourceType::Api, 43),
                grant("3", AuthorityPrefix::User, ResourceType::Api, 42),
            ],
        )
        .await
        .unwrap();
    assert_eq!(inserted, 2);

    let batch = repo.find_by_owner(&key).await.unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0].resource_id, 43);
    assert_eq!(batch[1].resource_id, 42);
    assert!(batch[0].id < batch[1].id);
    assert_eq!(batch[0].authority_prefix, AuthorityPrefix::User);
    assert_eq!(batch[0].resource_type, ResourceType::Api);
    assert_eq!(batch[0].authority, "USER_API:code43");
    assert_eq!(batch[0].resource_info["tags"][1], "b");
}

#[tokio::test]
async fn sqlite_replace_batch_leaves_other_batches() {
    let repo = setup().await;
    let user_api = OwnerBatchKey::new("3", AuthorityPrefix::User, ResourceType::Api);
    let user_menu = OwnerBatchKey::new("3", AuthorityPrefix::User, ResourceType::Menu);
    let role_api = OwnerBatchKey::new("3", AuthorityPrefix::Role, ResourceType::Api);

    repo.replace_owner_batch(
        &user_api,
        vec![grant("3", AuthorityPrefix::User, ResourceType::Api, 42)],
    )
    .await
    .unwrap();
    repo.replace_owner_batch(
        &user_menu,
        vec![grant("3", AuthorityPrefix::User, ResourceType::Menu, 10)],
    )
    .await
    .unwrap();
    repo.replace_owner_batch(
        &role_api,
        vec![grant("3", AuthorityPrefix::Role, ResourceType::Api, 42)],
    )
    .await
    .unwrap();

    let inserted = repo.replace_owner_batch(&user_api, Vec::new()).await.unwrap();
    assert_eq!(inserted, 0);

    assert!(repo.find_by_owner(&user_api).await.unwrap().is_empty());
    assert_eq!(repo.find_by_owner(&user_menu).await.unwrap().len(), 1);
    assert_eq!(repo.find_by_owner(&role_api).await.unwrap().len(), 1);
}

#[tokio::test]
async fn sqlite_delete_and_count_by_resource() {
    let repo = setup().await;
    let user = OwnerBatchKey::new("3", AuthorityPrefix::User, ResourceType::Api);
    let role = OwnerBatchKey::new("7", AuthorityPrefix::Role, ResourceType::Api);
    repo.replace_owner_batch(&user, vec![grant("3", AuthorityPrefix::User, ResourceType::Api, 42)])
        .await
        .unwrap();
    repo.replace_owner_batch(&role, vec![grant("7", AuthorityPrefix::Role, ResourceType::Api, 42)])
        .await
        .unwrap();

    let resource = ResourceKey::new(42, ResourceType::Api);
    assert_eq!(repo.count_by_resource(resource).await.unwrap(), 2);
    assert_eq!(
        repo.count_by_resource(ResourceKey::new(42, ResourceType::Menu))
            .await
            .unwrap(),
        0
    );

    assert_eq!(repo.delete_owner_batch(&user).await.unwrap(), 1);
    assert_eq!(repo.delete_owner_batch(&user).await.unwrap(), 0);
    assert_eq!(repo.count_by_resource(resource).await.unwrap(), 1);
    assert_eq!(repo.find_by_resource(resource).await.unwrap()[0].authority_owner, "7");
}

#[tokio::test]
async fn sqlite_selective_update_touches_resource_fields_only() {
    let repo = setup().await;
    let user = OwnerBatchKey::new("3", AuthorityPrefix::User, ResourceType::Api);
    repo.replace_owner_batch(
        &user,
        vec![
            grant("3", AuthorityPrefix::User, ResourceType::Api, 42),
            grant("3", AuthorityPrefix::User, ResourceType::Api, 43),
        ],
    )
    .await
    .unwrap();

    let patch = GrantPatch {
        status: Status::Disabled,
        service_id: "search-service".to_owned(),
        resource_parent_id: 0,
        path: None,
        resource_info: json!({"api_id": 42, "renamed": true}),
    };
    let updated = repo
        .update_selective_by_resource(ResourceKey::new(42, ResourceType::Api), &patch)
        .await
        .unwrap();
    assert_eq!(updated, 1);

    let batch = repo.find_by_owner(&user).await.unwrap();
    let changed = &batch[0];
    assert_eq!(changed.status, Status::Disabled);
    assert_eq!(changed.service_id, "search-service");
    assert_eq!(changed.path.as_deref(), Some("order/42"));
    assert_eq!(changed.authority, "USER_API:code42");
    assert_eq!(changed.resource_info["renamed"], true);

    let untouched = &batch[1];
    assert_eq!(untouched.status, Status::Enabled);
    assert_eq!(untouched.service_id, "order-service");

    let with_path = GrantPatch {
        path: Some("order/v2".to_owned()),
        ..patch
    };
    repo.update_selective_by_resource(ResourceKey::new(42, ResourceType::Api), &with_path)
        .await
        .unwrap();
    let changed = &repo.find_by_owner(&user).await.unwrap()[0];
    assert_eq!(changed.path.as_deref(), Some("order/v2"));
}

#[tokio::test]
async fn sqlite_filter_by_owners_kind_and_status() {
    let repo = setup().await;
    for (owner, kind) in [
        ("3", AuthorityPrefix::User),
        ("7", AuthorityPrefix::Role),
        ("8", AuthorityPrefix::Role),
    ] {
        let key = OwnerBatchKey::new(owner, kind, ResourceType::Api);
        let mut disabled = grant(owner, kind, ResourceType::Api, 99);
        disabled.status = Status::Disabled;
        repo.replace_owner_batch(&key, vec![grant(owner, kind, ResourceType::Api, 42), disabled])
            .await
            .unwrap();
    }

    let roles = repo
        .find(
            GrantFilter::new()
                .owner_kind(AuthorityPrefix::Role)
                .owners(["7", "8"])
                .resource_type(ResourceType::Api)
                .enabled(),
        )
        .await
        .unwrap();
    let owners: Vec<_> = roles.iter().map(|g| g.authority_owner.as_str()).collect();
    assert_eq!(owners, vec!["7", "8"]);

    let none = repo
        .find(GrantFilter::new().owners(Vec::<String>::new()))
        .await
        .unwrap();
    assert!(none.is_empty());

    assert_eq!(repo.list_enabled(None).await.unwrap().len(), 3);
    assert!(
        repo.list_enabled(Some(ResourceType::Menu))
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(repo.find(GrantFilter::new()).await.unwrap().len(), 6);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_readers_never_see_partial_batch() {
    let repo = Arc::new(setup().await);
    let key = OwnerBatchKey::new("3", AuthorityPrefix::User, ResourceType::Api);
    let batch = |base: i64| {
        (base..base + 3)
            .map(|id| grant("3", AuthorityPrefix::User, ResourceType::Api, id))
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
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();
    assert_eq!(repo.find_by_owner(&key).await.unwrap().len(), 3);
}
