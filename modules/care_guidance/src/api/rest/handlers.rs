use axum::response::Json;
use modkit::{JsonBody, QueryParams};
use tracing::{debug, info};

use crate::api::rest::dto::{
    JsonObject, LifestyleEntry, LifestyleLogAckDto, PreventionPlanDto, ProgressDto,
    ResourceCatalogDto, SymptomCheckDto, SymptomCheckReq, UserQuery,
};
use crate::domain;

/// Educational resources
#[utoipa::path(
    get,
    path = "/api/resources/",
    tag = "resources",
    operation_id = "care_guidance.list_resources",
    responses((status = 200, description = "Resource catalog", body = ResourceCatalogDto))
)]
pub async fn list_resources() -> Json<ResourceCatalogDto> {
    debug!("Listing resources");
    Json(domain::resource_catalog().into())
}

/// Guess likely conditions from a free-text symptom description
#[utoipa::path(
    post,
    path = "/api/symptom-checker/",
    tag = "symptom-checker",
    operation_id = "care_guidance.check_symptoms",
    request_body(content = SymptomCheckReq, description = "JSON object; a missing or non-string `symptoms` counts as empty"),
    responses(
        (status = 200, description = "Triage result", body = SymptomCheckDto),
        (status = 422, description = "Body is not a JSON object", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn check_symptoms(JsonBody(body): JsonBody<JsonObject>) -> Json<SymptomCheckDto> {
    let symptoms = body
        .get("symptoms")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();
    let triage = domain::triage(symptoms);
    info!(conditions = ?triage.potential_conditions, "Symptom check");
    Json(triage.into())
}

/// Record a lifestyle entry (echoed back, not stored)
#[utoipa::path(
    post,
    path = "/api/lifestyle/log",
    tag = "lifestyle",
    operation_id = "care_guidance.log_lifestyle",
    request_body = LifestyleEntry,
    responses(
        (status = 200, description = "Acknowledgement with the submitted data", body = LifestyleLogAckDto),
        (status = 422, description = "Body is not a JSON object", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn log_lifestyle(
    JsonBody(LifestyleEntry(data)): JsonBody<LifestyleEntry>,
) -> Json<LifestyleLogAckDto> {
    info!(keys = data.len(), "Lifestyle data logged");
    Json(LifestyleLogAckDto {
        message: domain::LIFESTYLE_LOGGED.to_string(),
        data,
    })
}

/// Lifestyle progress report
#[utoipa::path(
    get,
    path = "/api/lifestyle/progress",
    tag = "lifestyle",
    operation_id = "care_guidance.lifestyle_progress",
    params(UserQuery),
    responses(
        (status = 200, description = "Progress summary", body = ProgressDto),
        (status = 422, description = "Missing or non-integer user_id", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn lifestyle_progress(QueryParams(q): QueryParams<UserQuery>) -> Json<ProgressDto> {
    debug!(user_id = q.user_id, "Lifestyle progress");
    Json(ProgressDto {
        user_id: q.user_id,
        progress: domain::PROGRESS_SUMMARY.to_string(),
    })
}

/// Prevention recommendations and reminders
#[utoipa::path(
    get,
    path = "/api/prevention/",
    tag = "prevention",
    operation_id = "care_guidance.prevention_plan",
    params(UserQuery),
    responses(
        (status = 200, description = "Prevention plan", body = PreventionPlanDto),
        (status = 422, description = "Missing or non-integer user_id", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn prevention_plan(QueryParams(q): QueryParams<UserQuery>) -> Json<PreventionPlanDto> {
    debug!(user_id = q.user_id, "Prevention plan");
    Json(domain::prevention_plan(q.user_id).into())
}
