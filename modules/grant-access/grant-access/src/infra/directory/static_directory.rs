//! In-process resource store, role directory and application directory.
//!
//! Seeded from configuration and mutable at runtime, so a host without a
//! resource management backend (or a test) can drive the engine end to end.

use std::collections::HashMap;

use async_trait::async_trait;
use grant_access_sdk::{
    Action, Api, App, AppDirectory, CollaboratorError, Menu, Resource, ResourceStore,
    ResourceType, Role, RoleDirectory,
};
use parking_lot::RwLock;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticDirectoryConfig {
    pub menus: Vec<Menu>,
    pub actions: Vec<Action>,
    pub apis: Vec<Api>,
    pub roles: Vec<Role>,
    /// User id to assigned role ids.
    pub user_roles: HashMap<String, Vec<String>>,
    pub apps: Vec<App>,
}

#[derive(Debug, Default)]
pub struct StaticDirectory {
    resources: RwLock<HashMap<(ResourceType, i64), Resource>>,
    roles: RwLock<HashMap<String, Role>>,
    user_roles: RwLock<HashMap<String, Vec<String>>>,
    apps: RwLock<HashMap<String, App>>,
}

impl StaticDirectory {
    #[must_use]
    pub fn new(cfg: StaticDirectoryConfig) -> Self {
        let resources = cfg
            .menus
            .into_iter()
            .map(Resource::from)
            .chain(cfg.actions.into_iter().map(Resource::from))
            .chain(cfg.apis.into_iter().map(Resource::from))
            .map(|r| ((r.resource_type(), r.id()), r))
            .collect();
        let roles = cfg
            .roles
            .into_iter()
            .map(|role| (role.role_id.clone(), role))
            .collect();
        let apps = cfg
            .apps
            .into_iter()
            .map(|app| (app.app_id.clone(), app))
            .collect();

        Self {
            resources: RwLock::new(resources),
            roles: RwLock::new(roles),
            user_roles: RwLock::new(cfg.user_roles),
            apps: RwLock::new(apps),
        }
    }

    /// Insert or replace a resource. Returns the previous version.
    pub fn put_resource(&self, resource: impl Into<Resource>) -> Option<Resource> {
        let resource = resource.into();
        self.resources
            .write()
            .insert((resource.resource_type(), resource.id()), resource)
    }

    pub fn remove_resource(&self, resource_type: ResourceType, id: i64) -> Option<Resource> {
        self.resources.write().remove(&(resource_type, id))
    }

    pub fn put_role(&self, role: Role) {
        self.roles.write().insert(role.role_id.clone(), role);
    }

    /// Replace the roles assigned to `user_id`.
    pub fn assign_roles<I, S>(&self, user_id: impl Into<String>, role_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_roles.write().insert(
            user_id.into(),
            role_ids.into_iter().map(Into::into).collect(),
        );
    }

    pub fn put_app(&self, app: App) {
        self.apps.write().insert(app.app_id.clone(), app);
    }
}

#[async_trait]
impl ResourceStore for StaticDirectory {
    async fn get(
        &self,
        resource_type: ResourceType,
        id: i64,
    ) -> Result<Option<Resource>, CollaboratorError> {
        Ok(self.resources.read().get(&(resource_type, id)).cloned())
    }
}

#[async_trait]
impl RoleDirectory for StaticDirectory {
    async fn roles_of(&self, user_id: &str) -> Result<Vec<Role>, CollaboratorError> {
        let user_roles = self.user_roles.read();
        let Some(role_ids) = user_roles.get(user_id) else {
            return Ok(Vec::new());
        };

        let roles = self.roles.read();
        let assigned = role_ids
            .iter()
            .filter_map(|role_id| {
                let role = roles.get(role_id).cloned();
                if role.is_none() {
                    debug!(user_id, role_id, "assigned role is not defined, ignoring");
                }
                role
            })
            .collect();
        Ok(assigned)
    }

    async fn role_by_id(&self, role_id: &str) -> Result<Option<Role>, CollaboratorError> {
        Ok(self.roles.read().get(role_id).cloned())
    }
}

#[async_trait]
impl AppDirectory for StaticDirectory {
    async fn app_by_id(&self, app_id: &str) -> Result<Option<App>, CollaboratorError> {
        Ok(self.apps.read().get(app_id).cloned())
    }
}
