use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Extension, Router,
};
use modkit::api::OpenApiRegistry;
use utoipa::OpenApi;

use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_user,
        handlers::get_user,
        handlers::update_user,
        handlers::update_user_base,
        handlers::update_user_health,
        handlers::update_user_lifestyle,
        handlers::update_user_emergency,
        handlers::update_user_security,
        handlers::create_assessment,
        handlers::list_assessments,
    ),
    components(schemas(
        dto::UserDto,
        dto::CreateUserReq,
        dto::UpdateUserReq,
        dto::UserBaseReq,
        dto::BasePatchReq,
        dto::UserHealthReq,
        dto::UserLifestyleReq,
        dto::UserEmergencyReq,
        dto::UserSecurityReq,
        dto::CreateAssessmentReq,
        dto::AssessmentDto,
    )),
    tags(
        (name = "users", description = "Health profiles"),
        (name = "assessments", description = "Risk assessments"),
    )
)]
pub struct HealthProfileApiDoc;

pub fn register_routes(
    router: Router,
    openapi: &dyn OpenApiRegistry,
    service: Arc<Service>,
) -> anyhow::Result<Router> {
    openapi.register_document(HealthProfileApiDoc::openapi());

    // Collection routes answer with and without the trailing slash.
    let router = router
        .route("/api/users", post(handlers::create_user))
        .route("/api/users/", post(handlers::create_user))
        .route(
            "/api/users/{id}",
            get(handlers::get_user).patch(handlers::update_user),
        )
        .route("/api/users/{id}/base", patch(handlers::update_user_base))
        .route("/api/users/{id}/health", patch(handlers::update_user_health))
        .route(
            "/api/users/{id}/lifestyle",
            patch(handlers::update_user_lifestyle),
        )
        .route(
            "/api/users/{id}/emergency",
            patch(handlers::update_user_emergency),
        )
        .route(
            "/api/users/{id}/security",
            patch(handlers::update_user_security),
        )
        .route("/api/assessments", post(handlers::create_assessment))
        .route("/api/assessments/", post(handlers::create_assessment))
        .route(
            "/api/assessments/user/{user_id}",
            get(handlers::list_assessments),
        )
        .layer(Extension(service));

    Ok(router)
}
