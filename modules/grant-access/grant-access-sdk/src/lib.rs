#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Grant Access SDK
//!
//! This crate provides the public contract of the `grant_access` module:
//!
//! - [`GrantAccessClientV1`] - Public API trait for the management layer
//! - [`GrantRecord`], [`Resource`], [`Role`], [`App`] - Grant and resource models
//! - [`ResourceStore`], [`RoleDirectory`], [`AppDirectory`], [`GatewayNotifier`] -
//!   contracts of the collaborators the engine consumes
//! - [`GrantAccessError`], [`CollaboratorError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use grant_access_sdk::GrantAccessClientV1;
//!
//! // Replace the API batch of role 7 with two endpoints
//! let authorities = client.add_grants("7", "ROLE", "API", &[101, 102]).await?;
//!
//! // Effective permissions of a user: private grants plus role-inherited ones
//! let grants = client.effective_permissions("3", "MENU").await?;
//! ```

pub mod api;
pub mod directory;
pub mod error;
pub mod models;

// Re-export main types at crate root
pub use api::GrantAccessClientV1;
pub use directory::{AppDirectory, GatewayNotifier, ResourceStore, RoleDirectory};
pub use error::{CollaboratorError, GrantAccessError};
pub use models::{
    AUTHORITY_ALL, AUTHORITY_SEPARATOR, Action, Api, App, AuthorityPrefix, GrantRecord, Menu,
    PATH_SEPARATOR, ParseKindError, Resource, ResourceType, Role, Status,
};
