//! Grant construction.
//!
//! Resolves the governed fields of a resource and, when an owner is given,
//! synthesizes the authority string the gateway enforces:
//!
//! | owner  | authority                              | status            |
//! |--------|----------------------------------------|-------------------|
//! | `ROLE` | `ROLE_` + role code                    | resource status   |
//! | `USER` | `USER_` + type + `:` + code, or `USER_all` | resource status |
//! | `APP`  | `APP_` + type + `:` + code, or `APP_all`   | application status |

use std::sync::Arc;

use grant_access_sdk::{
    AUTHORITY_ALL, AUTHORITY_SEPARATOR, AppDirectory, AuthorityPrefix, PATH_SEPARATOR, Resource,
    ResourceType, RoleDirectory, Status,
};
use tracing::debug;

use super::error::DomainError;
use super::repo::{GrantPatch, NewGrant};

/// Holder of a grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantOwner {
    pub owner_id: String,
    pub kind: AuthorityPrefix,
}

impl GrantOwner {
    #[must_use]
    pub fn new(owner_id: impl Into<String>, kind: AuthorityPrefix) -> Self {
        Self {
            owner_id: owner_id.into(),
            kind,
        }
    }
}

/// Authority assigned to an owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedAuthority {
    pub owner: GrantOwner,
    pub authority: String,
}

/// Output of [`GrantBuilder::build`]: the resource-derived fields of a grant
/// plus its authority when built for an owner.
#[derive(Debug, Clone, PartialEq)]
pub struct GrantDraft {
    pub resource_id: i64,
    pub resource_parent_id: i64,
    pub resource_type: ResourceType,
    pub service_id: String,
    pub path: Option<String>,
    pub status: Status,
    pub resource_info: serde_json::Value,
    pub authority: Option<OwnedAuthority>,
}

impl GrantDraft {
    /// `None` for drafts built without an owner.
    #[must_use]
    pub fn into_new_grant(self) -> Option<NewGrant> {
        let OwnedAuthority { owner, authority } = self.authority?;
        Some(NewGrant {
            resource_id: self.resource_id,
            resource_parent_id: self.resource_parent_id,
            resource_type: self.resource_type,
            service_id: self.service_id,
            path: self.path,
            status: self.status,
            authority,
            authority_owner: owner.owner_id,
            authority_prefix: owner.kind,
            resource_info: self.resource_info,
        })
    }

    #[must_use]
    pub fn into_patch(self) -> GrantPatch {
        GrantPatch {
            status: self.status,
            service_id: self.service_id,
            resource_parent_id: self.resource_parent_id,
            path: self.path,
            resource_info: self.resource_info,
        }
    }
}

struct ResolvedResource<'a> {
    resource_id: i64,
    parent_id: i64,
    service_id: &'a str,
    path: Option<&'a str>,
    status: Status,
    code: &'a str,
}

/// Strip one leading path separator; nothing else changes.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    path.strip_prefix(PATH_SEPARATOR).unwrap_or(path).to_owned()
}

/// Authority of `USER` and `APP` owners.
#[must_use]
pub fn code_authority(kind: AuthorityPrefix, resource_type: ResourceType, code: &str) -> String {
    if code == AUTHORITY_ALL {
        format!("{}{AUTHORITY_ALL}", kind.prefix())
    } else {
        format!("{}{resource_type}{AUTHORITY_SEPARATOR}{code}", kind.prefix())
    }
}

pub struct GrantBuilder {
    service_id: String,
    roles: Arc<dyn RoleDirectory>,
    apps: Arc<dyn AppDirectory>,
}

impl GrantBuilder {
    /// `service_id` identifies the issuing application and is stamped on
    /// menu and action grants.
    pub fn new(
        service_id: impl Into<String>,
        roles: Arc<dyn RoleDirectory>,
        apps: Arc<dyn AppDirectory>,
    ) -> Self {
        Self {
            service_id: service_id.into(),
            roles,
            apps,
        }
    }

    /// Build a grant for `resource`, or `Ok(None)` when the resource is absent.
    ///
    /// # Errors
    ///
    /// - `UnsupportedResourceType` if `resource` is not of `resource_type`
    /// - `UnknownRole` if a `ROLE` owner does not resolve
    /// - `Collaborator` if the role or application directory fails
    pub async fn build(
        &self,
        resource_type: ResourceType,
        resource: Option<&Resource>,
        owner: Option<&GrantOwner>,
    ) -> Result<Option<GrantDraft>, DomainError> {
        let Some(resource) = resource else {
            return Ok(None);
        };
        if resource.resource_type() != resource_type {
            return Err(DomainError::UnsupportedResourceType(format!(
                "{} record supplied for {resource_type}",
                resource.resource_type()
            )));
        }

        let resolved = self.resolve(resource);
        let mut status = resolved.status;

        let authority = match owner {
            None => None,
            Some(owner) => {
                let authority = match owner.kind {
                    AuthorityPrefix::Role => {
                        let role = self
                            .roles
                            .role_by_id(&owner.owner_id)
                            .await?
                            .ok_or_else(|| DomainError::UnknownRole(owner.owner_id.clone()))?;
                        format!("{}{}", owner.kind.prefix(), role.role_code)
                    }
                    AuthorityPrefix::App => {
                        // A suspended application disables all of its grants.
                        if let Some(app) = self.apps.app_by_id(&owner.owner_id).await? {
                            status = app.status;
                        } else {
                            debug!(
                                app_id = %owner.owner_id,
                                "application not found, keeping resource status"
                            );
                        }
                        code_authority(owner.kind, resource_type, resolved.code)
                    }
                    AuthorityPrefix::User => {
                        code_authority(owner.kind, resource_type, resolved.code)
                    }
                };
                Some(OwnedAuthority {
                    owner: owner.clone(),
                    authority,
                })
            }
        };

        Ok(Some(GrantDraft {
            resource_id: resolved.resource_id,
            resource_parent_id: resolved.parent_id,
            resource_type,
            service_id: resolved.service_id.to_owned(),
            path: resolved.path.map(normalize_path),
            status,
            resource_info: serde_json::to_value(resource)?,
            authority,
        }))
    }

    fn resolve<'a>(&'a self, resource: &'a Resource) -> ResolvedResource<'a> {
        match resource {
            Resource::Menu(menu) => ResolvedResource {
                resource_id: menu.menu_id,
                parent_id: menu.parent_id,
                service_id: &self.service_id,
                path: menu.path.as_deref(),
                status: menu.status,
                code: &menu.menu_code,
            },
            Resource::Action(action) => ResolvedResource {
                resource_id: action.action_id,
                parent_id: action.menu_id,
                service_id: &self.service_id,
                path: action.path.as_deref(),
                status: action.status,
                code: &action.action_code,
            },
            Resource::Api(api) => ResolvedResource {
                resource_id: api.api_id,
                parent_id: 0,
                service_id: &api.service_id,
                path: api.path.as_deref(),
                status: api.status,
                code: &api.api_code,
            },
        }
    }
}
