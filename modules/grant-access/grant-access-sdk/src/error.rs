//! Error types for the grant access module.

use thiserror::Error;

/// Errors returned by the public grant access API.
///
/// Input errors are reported as dedicated variants; storage and collaborator
/// failures collapse into `Internal`.
#[derive(Debug, Error)]
pub enum GrantAccessError {
    /// Owner kind outside `ROLE`, `USER`, `APP`.
    #[error("unsupported authority kind: {0}")]
    UnsupportedAuthorityKind(String),

    /// Resource kind outside `MENU`, `ACTION`, `API`.
    #[error("unsupported resource type: {0}")]
    UnsupportedResourceType(String),

    /// Role owner that the role directory does not know.
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// Resource still referenced by at least one grant.
    #[error("resource {resource_type} {resource_id} is still granted")]
    ResourceInUse {
        resource_id: i64,
        resource_type: String,
    },

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Failure reported by an external collaborator (resource store, role or
/// application directory, gateway notifier).
#[derive(Debug, Clone, Error)]
pub enum CollaboratorError {
    /// The collaborator could not be reached.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    /// The collaborator failed while serving the call.
    #[error("collaborator failed: {0}")]
    Internal(String),
}
