//! Domain layer for the grant access module.

pub mod builder;
pub mod error;
pub mod local_client;
pub mod repo;
pub mod service;


pub use builder::{GrantBuilder, GrantDraft, GrantOwner};
pub use error::DomainError;
pub use local_client::GrantAccessLocalClient;
pub use repo::GrantRepository;
pub use service::{Service, ServiceConfig};
