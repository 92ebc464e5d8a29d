use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use modkit::api::OpenApiRegistry;
use modkit::registry::{ModuleDescriptor, RegistryBuilder};
use modkit::{DbModule, Module, ModuleCtx, RestfulModule};
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::HealthProfileConfig;
use crate::contract::client::HealthProfileApi;
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::HealthProfileLocalClient;
use crate::infra::storage::{SeaOrmAssessmentsRepository, SeaOrmUsersRepository};

pub const MODULE_NAME: &str = "health_profile";

/// Adds the module to a registry. Needs a database and the REST host.
pub fn register(b: &mut RegistryBuilder) {
    let m = Arc::new(HealthProfile::default());
    b.add(
        ModuleDescriptor::new(MODULE_NAME, &["api_ingress"], m.clone())
            .with_db(m.clone())
            .with_rest(m),
    );
}

/// Users and their risk assessments.
#[derive(Default)]
pub struct HealthProfile {
    // Keep the domain service behind ArcSwap for cheap read-mostly access.
    service: ArcSwapOption<Service>,
}

impl HealthProfile {
    /// In-process client, available once `init` has run.
    pub fn client(&self) -> Option<Arc<dyn HealthProfileApi>> {
        self.service
            .load_full()
            .map(|svc| Arc::new(HealthProfileLocalClient::new(svc)) as Arc<dyn HealthProfileApi>)
    }
}

#[async_trait]
impl Module for HealthProfile {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing health_profile module");

        let cfg: HealthProfileConfig = ctx.module_config();
        debug!(
            "Loaded health_profile config: enforce_user_reference={}, max_full_name_length={}",
            cfg.enforce_user_reference, cfg.max_full_name_length
        );

        let db = ctx.db_required()?;
        let conn = db.sea();

        let service = Service::new(
            Arc::new(SeaOrmUsersRepository::new(conn.clone())),
            Arc::new(SeaOrmAssessmentsRepository::new(conn)),
            ServiceConfig {
                max_full_name_length: cfg.max_full_name_length,
                enforce_user_reference: cfg.enforce_user_reference,
            },
        );
        self.service.store(Some(Arc::new(service)));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[async_trait]
impl DbModule for HealthProfile {
    async fn migrate(&self, db: &modkit_db::DbHandle) -> anyhow::Result<()> {
        info!("Running health_profile database migrations");
        let conn = db.sea();
        crate::infra::storage::migrations::Migrator::up(&conn, None).await?;
        info!("health_profile migrations completed successfully");
        Ok(())
    }
}

impl RestfulModule for HealthProfile {
    fn register_rest(
        &self,
        _ctx: &ModuleCtx,
        router: axum::Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<axum::Router> {
        info!("Registering health_profile REST routes");

        let service = self
            .service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))?;

        let router = routes::register_routes(router, openapi, service)?;
        info!("health_profile REST routes registered successfully");
        Ok(router)
    }
}
