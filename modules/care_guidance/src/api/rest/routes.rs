use axum::{
    routing::{get, post},
    Router,
};
use modkit::api::OpenApiRegistry;
use utoipa::OpenApi;

use crate::api::rest::{dto, handlers};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_resources,
        handlers::check_symptoms,
        handlers::log_lifestyle,
        handlers::lifestyle_progress,
        handlers::prevention_plan,
    ),
    components(schemas(
        dto::ResourceCatalogDto,
        dto::ResourceLinkDto,
        dto::SymptomCheckReq,
        dto::SymptomCheckDto,
        dto::LifestyleEntry,
        dto::LifestyleLogAckDto,
        dto::ProgressDto,
        dto::PreventionPlanDto,
        dto::ReminderDto,
    )),
    tags(
        (name = "resources", description = "Educational resources"),
        (name = "symptom-checker", description = "Keyword symptom triage"),
        (name = "lifestyle", description = "Lifestyle logging and progress"),
        (name = "prevention", description = "Prevention recommendations"),
    )
)]
pub struct CareGuidanceApiDoc;

pub fn register_routes(router: Router, openapi: &dyn OpenApiRegistry) -> Router {
    openapi.register_document(CareGuidanceApiDoc::openapi());

    // Collection routes answer with and without the trailing slash.
    router
        .route("/api/resources", get(handlers::list_resources))
        .route("/api/resources/", get(handlers::list_resources))
        .route("/api/symptom-checker", post(handlers::check_symptoms))
        .route("/api/symptom-checker/", post(handlers::check_symptoms))
        .route("/api/lifestyle/log", post(handlers::log_lifestyle))
        .route("/api/lifestyle/progress", get(handlers::lifestyle_progress))
        .route("/api/prevention", get(handlers::prevention_plan))
        .route("/api/prevention/", get(handlers::prevention_plan))
}
