use std::sync::Arc;

use grant_access_sdk::GrantAccessClientV1;
use tracing::info;

use crate::config::{GrantAccessConfig, StorageConfig};
use crate::domain::local_client::GrantAccessLocalClient;
use crate::domain::repo::GrantRepository;
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::directory::StaticDirectory;
use crate::infra::notifier::ChannelGatewayNotifier;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{InMemoryGrantRepository, SeaOrmGrantRepository};

pub use crate::domain::service::Collaborators;

/// Storage is chosen from configuration at init time.
type ConcreteService = Service<dyn GrantRepository>;

pub struct GrantAccessModule {
    service: arc_swap::ArcSwapOption<ConcreteService>,
}

impl Default for GrantAccessModule {
    fn default() -> Self {
        Self {
            service: arc_swap::ArcSwapOption::from(None),
        }
    }
}

impl Clone for GrantAccessModule {
    fn clone(&self) -> Self {
        Self {
            service: arc_swap::ArcSwapOption::new(self.service.load().as_ref().map(Clone::clone)),
        }
    }
}

/// Handles to the built-in collaborators created by
/// [`GrantAccessModule::init_standalone`].
#[derive(Clone)]
pub struct StandaloneCollaborators {
    pub directory: Arc<StaticDirectory>,
    pub notifier: Arc<ChannelGatewayNotifier>,
}

impl GrantAccessModule {
    /// Open storage, run migrations and install the service. Calling it again
    /// replaces the running service.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub async fn init(
        &self,
        cfg: &GrantAccessConfig,
        collaborators: Collaborators,
    ) -> anyhow::Result<()> {
        info!("Initializing grant access module");

        let repo: Arc<dyn GrantRepository> = match &cfg.storage {
            StorageConfig::Memory => {
                info!("Using in-memory grant storage");
                Arc::new(InMemoryGrantRepository::new())
            }
            StorageConfig::Sqlite { dsn } => {
                let repo = SeaOrmGrantRepository::connect(dsn).await?;
                Self::run_migrations(&repo).await?;
                Arc::new(repo)
            }
        };

        let service_config = ServiceConfig {
            service_id: cfg.service_id.clone(),
        };
        let service = Arc::new(Service::new(repo, collaborators, service_config));
        self.service.store(Some(service));

        info!(service_id = %cfg.service_id, "Grant access module initialized");
        Ok(())
    }

    /// Initialize with the static directory seeded from `cfg.directory` and a
    /// watch-channel notifier.
    ///
    /// # Errors
    ///
    /// Same as [`GrantAccessModule::init`].
    pub async fn init_standalone(
        &self,
        cfg: &GrantAccessConfig,
    ) -> anyhow::Result<StandaloneCollaborators> {
        let directory = Arc::new(StaticDirectory::new(cfg.directory.clone()));
        let notifier = Arc::new(ChannelGatewayNotifier::new());
        let collaborators = Collaborators {
            resources: directory.clone(),
            roles: directory.clone(),
            apps: directory.clone(),
            notifier: notifier.clone(),
        };
        self.init(cfg, collaborators).await?;
        Ok(StandaloneCollaborators {
            directory,
            notifier,
        })
    }

    /// # Errors
    ///
    /// Returns an error if the module has not been initialized.
    pub fn client(&self) -> anyhow::Result<Arc<dyn GrantAccessClientV1>> {
        let service = self
            .service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))?;
        Ok(Arc::new(GrantAccessLocalClient::new(service)))
    }

    #[must_use]
    pub fn migrations(&self) -> Vec<Box<dyn sea_orm_migration::MigrationTrait>> {
        use sea_orm_migration::MigratorTrait;
        info!("Providing grant access database migrations");
        Migrator::migrations()
    }

    async fn run_migrations(repo: &SeaOrmGrantRepository) -> anyhow::Result<()> {
        use sea_orm_migration::MigratorTrait;
        Migrator::up(repo.connection(), None).await?;
        info!("Grant access migrations applied");
        Ok(())
    }
}
