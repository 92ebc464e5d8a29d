use utoipa::OpenApi;

use crate::web::{HealthDto, WelcomeDto};

/// Ingress-owned part of the document; modules merge theirs on top.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CareLens API",
        description = "Preventive-care health profiles, risk assessments and care guidance"
    ),
    paths(crate::web::root, crate::web::health_check),
    components(schemas(WelcomeDto, HealthDto, modkit::Problem, modkit::ValidationError)),
    tags((name = "service", description = "Service banner and liveness"))
)]
pub struct IngressApi;

pub fn base_document() -> utoipa::openapi::OpenApi {
    IngressApi::openapi()
}
