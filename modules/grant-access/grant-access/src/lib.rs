//! Grant Access Module
//!
//! Binds authority owners (roles, users, applications) to protected
//! resources (menu entries, UI actions, backend API endpoints) and keeps the
//! resulting grant set queryable for the enforcement gateway.
//!
//! ## Architecture
//!
//! ### Contract Layer (`grant-access-sdk`)
//! - `GrantAccessClientV1` trait, grant and resource models, collaborator
//!   contracts (`ResourceStore`, `RoleDirectory`, `AppDirectory`,
//!   `GatewayNotifier`) and `GrantAccessError`.
//!
//! ### Domain Layer (`grant_access::domain`)
//! - `builder` - grant construction and authority synthesis
//! - `service` - the engine: replace-by-owner, resource sync, permission merge
//! - `repo` - the `GrantRepository` port
//! - `local_client` - in-process `GrantAccessClientV1` implementation
//!
//! ### Infrastructure Layer (`grant_access::infra`)
//! - `storage` - in-memory and `SeaORM` repositories, migrations
//! - `directory` - static collaborators seeded from configuration
//! - `notifier` - watch-channel gateway notifier
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

// === PUBLIC API (from SDK) ===
pub use grant_access_sdk::{
    GrantAccessClientV1, GrantAccessError, GrantRecord, Resource, ResourceType,
};

pub mod config;
pub mod module;
pub use module::{Collaborators, GrantAccessModule, StandaloneCollaborators};

// === INTERNAL MODULES ===
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
