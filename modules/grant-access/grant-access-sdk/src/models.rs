//! Domain models for the grant access module.
//!
//! A grant binds an authority owner (role, user or application) to one
//! protected resource (menu entry, UI action or backend API endpoint).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Separator between the resource type and the resource code in an authority.
pub const AUTHORITY_SEPARATOR: &str = ":";

/// Resource code that grants every resource of the owner's kind.
pub const AUTHORITY_ALL: &str = "all";

/// Request path separator stripped from the front of grant paths.
pub const PATH_SEPARATOR: char = '/';

/// A kind string that does not name a known owner kind or resource type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {what} '{value}'")]
pub struct ParseKindError {
    pub what: &'static str,
    pub value: String,
}

/// Kind of protected resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    Menu,
    Action,
    Api,
}

impl ResourceType {
    pub const ALL: [Self; 3] = [Self::Menu, Self::Action, Self::Api];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Menu => "MENU",
            Self::Action => "ACTION",
            Self::Api => "API",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseKindError {
                what: "resource type",
                value: s.to_owned(),
            })
    }
}

/// Kind of authority owner.
///
/// The owner kind doubles as the prefix of the synthesized authority string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorityPrefix {
    Role,
    User,
    App,
}

impl AuthorityPrefix {
    pub const ALL: [Self; 3] = [Self::Role, Self::User, Self::App];

    /// Owner kind name as accepted from the management layer.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Role => "ROLE",
            Self::User => "USER",
            Self::App => "APP",
        }
    }

    /// Prefix prepended to every authority held by this owner kind.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Role => "ROLE_",
            Self::User => "USER_",
            Self::App => "APP_",
        }
    }
}

impl fmt::Display for AuthorityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthorityPrefix {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Both the bare kind ("ROLE") and its prefix form ("ROLE_") are accepted.
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s || kind.prefix() == s)
            .ok_or_else(|| ParseKindError {
                what: "authority kind",
                value: s.to_owned(),
            })
    }
}

/// Enabled/disabled flag shared by resources, applications and grants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Disabled,
    #[default]
    Enabled,
}

impl Status {
    /// Storage code: `0` disabled, `1` enabled.
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::Disabled => 0,
            Self::Enabled => 1,
        }
    }

    #[must_use]
    pub const fn from_code(code: i16) -> Self {
        if code == 0 {
            Self::Disabled
        } else {
            Self::Enabled
        }
    }

    #[must_use]
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

/// Menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub menu_id: i64,
    #[serde(default)]
    pub parent_id: i64,
    pub menu_code: String,
    #[serde(default)]
    pub menu_name: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub status: Status,
}

/// UI action attached to a menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub action_id: i64,
    pub menu_id: i64,
    pub action_code: String,
    #[serde(default)]
    pub action_name: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub status: Status,
}

/// Backend API endpoint owned by a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Api {
    pub api_id: i64,
    pub api_code: String,
    #[serde(default)]
    pub api_name: String,
    pub service_id: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub status: Status,
}

/// A protected resource, one variant per [`ResourceType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resource {
    Menu(Menu),
    Action(Action),
    Api(Api),
}

impl Resource {
    #[must_use]
    pub const fn resource_type(&self) -> ResourceType {
        match self {
            Self::Menu(_) => ResourceType::Menu,
            Self::Action(_) => ResourceType::Action,
            Self::Api(_) => ResourceType::Api,
        }
    }

    #[must_use]
    pub const fn id(&self) -> i64 {
        match self {
            Self::Menu(menu) => menu.menu_id,
            Self::Action(action) => action.action_id,
            Self::Api(api) => api.api_id,
        }
    }
}

impl From<Menu> for Resource {
    fn from(menu: Menu) -> Self {
        Self::Menu(menu)
    }
}

impl From<Action> for Resource {
    fn from(action: Action) -> Self {
        Self::Action(action)
    }
}

impl From<Api> for Resource {
    fn from(api: Api) -> Self {
        Self::Api(api)
    }
}

/// Role as known to the role directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    pub role_id: String,
    pub role_code: String,
}

/// Client application that may own grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    pub app_id: String,
    #[serde(default)]
    pub status: Status,
}

/// Persisted access grant.
///
/// `id` is assigned by the repository and only orders result sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantRecord {
    pub id: i64,
    pub resource_id: i64,
    /// Parent of the governed resource; `0` for flat resources such as APIs.
    pub resource_parent_id: i64,
    pub resource_type: ResourceType,
    pub service_id: String,
    /// Request path without its leading separator.
    pub path: Option<String>,
    pub status: Status,
    pub authority: String,
    pub authority_owner: String,
    pub authority_prefix: AuthorityPrefix,
    /// Snapshot of the source resource taken when the grant was last built.
    pub resource_info: serde_json::Value,
}
