use std::sync::Arc;

use async_trait::async_trait;
use modkit::api::OpenApiRegistry;
use modkit::registry::{ModuleDescriptor, RegistryBuilder};
use modkit::{Module, ModuleCtx, RestfulModule};
use tracing::info;

use crate::api::rest::routes;

pub const MODULE_NAME: &str = "care_guidance";

/// Adds the module to a registry. Stateless; needs only the REST host.
pub fn register(b: &mut RegistryBuilder) {
    let m = Arc::new(CareGuidance);
    b.add(ModuleDescriptor::new(MODULE_NAME, &["api_ingress"], m.clone()).with_rest(m));
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CareGuidance;

#[async_trait]
impl Module for CareGuidance {
    async fn init(&self, _ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing care_guidance module");
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl RestfulModule for CareGuidance {
    fn register_rest(
        &self,
        _ctx: &ModuleCtx,
        router: axum::Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<axum::Router> {
        info!("Registering care_guidance REST routes");
        Ok(routes::register_routes(router, openapi))
    }
}
