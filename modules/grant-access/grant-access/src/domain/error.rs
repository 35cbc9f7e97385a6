//! Domain errors for the grant access engine.

use grant_access_sdk::{AuthorityPrefix, CollaboratorError, GrantAccessError, ResourceType};

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("unsupported authority kind '{0}'")]
    UnsupportedAuthorityKind(String),

    #[error("unsupported resource type '{0}'")]
    UnsupportedResourceType(String),

    #[error("unknown role '{0}'")]
    UnknownRole(String),

    #[error("resource {resource_type} {resource_id} is referenced by existing grants")]
    ResourceInUse {
        resource_id: i64,
        resource_type: ResourceType,
    },

    #[error("collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

/// Parse an owner kind received from the management layer.
///
/// # Errors
///
/// - `UnsupportedAuthorityKind` if `raw` names no known owner kind
pub fn parse_owner_kind(raw: &str) -> Result<AuthorityPrefix, DomainError> {
    raw.parse().map_err(|_| DomainError::UnsupportedAuthorityKind(raw.to_owned()))
}

/// Parse a resource type received from the management layer.
///
/// # Errors
///
/// - `UnsupportedResourceType` if `raw` names no known resource type
pub fn parse_resource_type(raw: &str) -> Result<ResourceType, DomainError> {
    raw.parse().map_err(|_| DomainError::UnsupportedResourceType(raw.to_owned()))
}

impl From<DomainError> for GrantAccessError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::UnsupportedAuthorityKind(kind) => Self::UnsupportedAuthorityKind(kind),
            DomainError::UnsupportedResourceType(kind) => Self::UnsupportedResourceType(kind),
            DomainError::UnknownRole(role_id) => Self::UnknownRole(role_id),
            DomainError::ResourceInUse {
                resource_id,
                resource_type,
            } => Self::ResourceInUse {
                resource_id,
                resource_type: resource_type.to_string(),
            },
            DomainError::Collaborator(e) => Self::Internal(e.to_string()),
            DomainError::Database(e) => Self::Internal(e.to_string()),
            DomainError::Internal(msg) => Self::Internal(msg),
        }
    }
}
