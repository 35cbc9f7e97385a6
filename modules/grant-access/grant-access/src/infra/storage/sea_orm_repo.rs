//! `SeaORM` grant repository.
//!
//! Batch replacement runs inside one database transaction; the remaining
//! mutations are single statements.

use async_trait::async_trait;
use grant_access_sdk::GrantRecord;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue, ColumnTrait, Condition, ConnectOptions, Database, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::debug;

use crate::domain::error::DomainError;
use crate::domain::repo::{
    GrantFilter, GrantPatch, GrantRepository, NewGrant, OwnerBatchKey, ResourceKey,
};

use super::entity::{self, Column, Entity as GrantEntity};

pub struct SeaOrmGrantRepository {
    db: DatabaseConnection,
}

impl SeaOrmGrantRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open a single-connection pool. `SQLite` serializes writers, and an
    /// in-memory database only lives as long as its one connection.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the database cannot be opened.
    pub async fn connect(dsn: &str) -> Result<Self, DbErr> {
        let mut opts = ConnectOptions::new(dsn.to_owned());
        opts.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(opts).await?;
        debug!("grant database connected");
        Ok(Self::new(db))
    }

    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn select(&self, cond: Condition) -> Result<Vec<GrantRecord>, DomainError> {
        GrantEntity::find()
            .filter(cond)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(GrantRecord::try_from)
            .collect()
    }
}

fn owner_condition(key: &OwnerBatchKey) -> Condition {
    Condition::all()
        .add(Column::AuthorityOwner.eq(key.owner_id.as_str()))
        .add(Column::AuthorityPrefix.eq(key.owner_kind.prefix()))
        .add(Column::ResourceType.eq(key.resource_type.as_str()))
}

fn resource_condition(key: ResourceKey) -> Condition {
    Condition::all()
        .add(Column::ResourceId.eq(key.resource_id))
        .add(Column::ResourceType.eq(key.resource_type.as_str()))
}

fn filter_condition(filter: &GrantFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(kind) = filter.owner_kind {
        cond = cond.add(Column::AuthorityPrefix.eq(kind.prefix()));
    }
    if let Some(owners) = &filter.owners {
        cond = cond.add(Column::AuthorityOwner.is_in(owners.iter().map(String::as_str)));
    }
    if let Some(resource_type) = filter.resource_type {
        cond = cond.add(Column::ResourceType.eq(resource_type.as_str()));
    }
    if let Some(status) = filter.status {
        cond = cond.add(Column::Status.eq(status.code()));
    }
    cond
}

fn to_active_model(grant: NewGrant) -> Result<entity::ActiveModel, DomainError> {
    Ok(entity::ActiveModel {
        id: ActiveValue::NotSet,
        resource_id: ActiveValue::Set(grant.resource_id),
        resource_parent_id: ActiveValue::Set(grant.resource_parent_id),
        resource_type: ActiveValue::Set(grant.resource_type.as_str().to_owned()),
        service_id: ActiveValue::Set(grant.service_id),
        path: ActiveValue::Set(grant.path),
        status: ActiveValue::Set(grant.status.code()),
        authority: ActiveValue::Set(grant.authority),
        authority_owner: ActiveValue::Set(grant.authority_owner),
        authority_prefix: ActiveValue::Set(grant.authority_prefix.prefix().to_owned()),
        resource_info: ActiveValue::Set(serde_json::to_string(&grant.resource_info)?),
    })
}

#[async_trait]
impl GrantRepository for SeaOrmGrantRepository {
    async fn find_by_owner(&self, key: &OwnerBatchKey) -> Result<Vec<GrantRecord>, DomainError> {
        self.select(owner_condition(key)).await
    }

    async fn find_by_resource(&self, key: ResourceKey) -> Result<Vec<GrantRecord>, DomainError> {
        self.select(resource_condition(key)).await
    }

    async fn find(&self, filter: GrantFilter) -> Result<Vec<GrantRecord>, DomainError> {
        // An empty owner set matches nothing; skip the round trip.
        if filter.owners.as_ref().is_some_and(Vec::is_empty) {
            return Ok(Vec::new());
        }
        self.select(filter_condition(&filter)).await
    }

    async fn replace_owner_batch(
        &self,
        key: &OwnerBatchKey,
        grants: Vec<NewGrant>,
    ) -> Result<u64, DomainError> {
        let models = grants
            .into_iter()
            .map(to_active_model)
            .collect::<Result<Vec<_>, _>>()?;
        let inserted = models.len() as u64;

        let txn = self.db.begin().await?;
        let deleted = GrantEntity::delete_many()
            .filter(owner_condition(key))
            .exec(&txn)
            .await?
            .rows_affected;
        if !models.is_empty() {
            GrantEntity::insert_many(models).exec(&txn).await?;
        }
        txn.commit().await?;

        debug!(deleted, inserted, "owner batch replaced in database");
        Ok(inserted)
    }

    async fn delete_owner_batch(&self, key: &OwnerBatchKey) -> Result<u64, DomainError> {
        let res = GrantEntity::delete_many()
            .filter(owner_condition(key))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected)
    }

    async fn update_selective_by_resource(
        &self,
        key: ResourceKey,
        patch: &GrantPatch,
    ) -> Result<u64, DomainError> {
        let mut update = GrantEntity::update_many()
            .col_expr(Column::Status, Expr::value(patch.status.code()))
            .col_expr(Column::ServiceId, Expr::value(patch.service_id.clone()))
            .col_expr(
                Column::ResourceParentId,
                Expr::value(patch.resource_parent_id),
            )
            .col_expr(
                Column::ResourceInfo,
                Expr::value(serde_json::to_string(&patch.resource_info)?),
            );
        if let Some(path) = &patch.path {
            update = update.col_expr(Column::Path, Expr::value(path.clone()));
        }

        let res = update
            .filter(resource_condition(key))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected)
    }

    async fn count_by_resource(&self, key: ResourceKey) -> Result<u64, DomainError> {
        let count = GrantEntity::find()
            .filter(resource_condition(key))
            .count(&self.db)
            .await?;
        Ok(count)
    }
}
