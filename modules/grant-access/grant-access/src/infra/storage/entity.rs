use grant_access_sdk::{AuthorityPrefix, GrantRecord, ResourceType, Status};
use sea_orm::entity::prelude::*;

use crate::domain::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "grant_access")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub resource_id: i64,
    pub resource_parent_id: i64,
    /// `MENU`, `ACTION` or `API`.
    pub resource_type: String,
    pub service_id: String,
    pub path: Option<String>,
    pub status: i16,
    pub authority: String,
    pub authority_owner: String,
    /// Stored with its trailing separator, e.g. `ROLE_`.
    pub authority_prefix: String,
    /// JSON snapshot of the source resource.
    #[sea_orm(column_type = "Text")]
    pub resource_info: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for GrantRecord {
    type Error = DomainError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let resource_type = m.resource_type.parse::<ResourceType>().map_err(|e| {
            DomainError::internal(format!("grant {}: stored resource type: {e}", m.id))
        })?;
        let authority_prefix = m.authority_prefix.parse::<AuthorityPrefix>().map_err(|e| {
            DomainError::internal(format!("grant {}: stored authority prefix: {e}", m.id))
        })?;
        Ok(Self {
            id: m.id,
            resource_id: m.resource_id,
            resource_parent_id: m.resource_parent_id,
            resource_type,
            service_id: m.service_id,
            path: m.path,
            status: Status::from_code(m.status),
            authority: m.authority,
            authority_owner: m.authority_owner,
            authority_prefix,
            resource_info: serde_json::from_str(&m.resource_info)?,
        })
    }
}
