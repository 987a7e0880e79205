use std::sync::Arc;

use anyhow::Context;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::RosterConfig;
use crate::contract::client::RosterApi;
use crate::domain::service::Service;
use crate::gateways::local::RosterLocalClient;
use crate::infra::hashing::Argon2CredentialHasher;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::sea_orm_repo::SeaOrmUnitOfWork;

/// The roster module: migrated schema plus a wired domain service.
#[derive(Clone)]
pub struct Roster {
    service: Arc<Service>,
}

impl Roster {
    /// Apply migrations on `db` and wire storage and hashing into the service.
    pub async fn init(db: DatabaseConnection, cfg: &RosterConfig) -> anyhow::Result<Self> {
        info!("Initializing roster module");
        debug!(
            "Loaded roster config: groups={}/{}, members={}/{}, argon2 m={} t={} p={}",
            cfg.group_default_page_size,
            cfg.group_max_page_size,
            cfg.member_default_page_size,
            cfg.member_max_page_size,
            cfg.hashing.memory_kib,
            cfg.hashing.iterations,
            cfg.hashing.parallelism,
        );

        Self::migrate(&db).await?;

        let hasher = Argon2CredentialHasher::from_config(&cfg.hashing)
            .context("invalid hashing configuration")?;
        let uow = SeaOrmUnitOfWork::new(db);
        let service = Service::new(Arc::new(uow), Arc::new(hasher), cfg.service_config());

        Ok(Self {
            service: Arc::new(service),
        })
    }

    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running roster database migrations");
        Migrator::up(db, None)
            .await
            .context("roster migrations failed")?;
        info!("Roster database migrations completed successfully");
        Ok(())
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// In-process client over the same service the REST routes use.
    pub fn client(&self) -> Arc<dyn RosterApi> {
        Arc::new(RosterLocalClient::new(self.service.clone()))
    }

    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        info!("Registering roster REST routes");
        routes::register_routes(router, self.service.clone())
    }
}
