use std::sync::Arc;

use axum::{
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use modkit::api::problem::ProblemResponse;
use modkit::{JsonBody, PathParams};
use tracing::{error, info};

use crate::api::rest::dto::{
    AssessmentDto, BasePatchReq, CreateAssessmentReq, CreateUserReq, UpdateUserReq, UserDto,
    UserEmergencyReq, UserHealthReq, UserLifestyleReq, UserSecurityReq,
};
use crate::api::rest::error::map_domain_error;
use crate::contract::model::{
    BasePatch, ProfilePatch, UserEmergency, UserHealth, UserLifestyle, UserSecurity,
};
use crate::domain::service::Service;

/// Create a new user profile
#[utoipa::path(
    post,
    path = "/api/users/",
    tag = "users",
    operation_id = "health_profile.create_user",
    request_body = CreateUserReq,
    responses(
        (status = 201, description = "Created user", body = UserDto),
        (status = 409, description = "Email already registered", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 422, description = "Invalid profile", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn create_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    JsonBody(req_body): JsonBody<CreateUserReq>,
) -> Result<(StatusCode, Json<UserDto>), ProblemResponse> {
    info!("Creating user with email: {}", req_body.base.email);

    match svc.create_user(req_body.into()).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(UserDto::from(user)))),
        Err(e) => {
            error!("Failed to create user: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get a user profile by id
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    operation_id = "health_profile.get_user",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 404, description = "Not Found", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn get_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    PathParams(id): PathParams<i32>,
) -> Result<Json<UserDto>, ProblemResponse> {
    info!("Getting user with id: {}", id);

    match svc.get_user(id).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => {
            error!("Failed to get user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

async fn apply_patch(
    svc: &Service,
    id: i32,
    patch: ProfilePatch,
    uri: &Uri,
) -> Result<Json<UserDto>, ProblemResponse> {
    match svc.update_user(id, patch).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => {
            error!("Failed to update user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Update any subset of profile fields
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    tag = "users",
    operation_id = "health_profile.update_user",
    params(("id" = i32, Path, description = "User id")),
    request_body = UpdateUserReq,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 404, description = "Not Found", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 409, description = "Email already registered", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 422, description = "Invalid update", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn update_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    PathParams(id): PathParams<i32>,
    JsonBody(req_body): JsonBody<UpdateUserReq>,
) -> Result<Json<UserDto>, ProblemResponse> {
    info!("Updating user {}", id);
    apply_patch(&svc, id, req_body.into(), &uri).await
}

/// Update the identity and contact fields
#[utoipa::path(
    patch,
    path = "/api/users/{id}/base",
    tag = "users",
    operation_id = "health_profile.update_user_base",
    params(("id" = i32, Path, description = "User id")),
    request_body = BasePatchReq,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 404, description = "Not Found", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 409, description = "Email already registered", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 422, description = "Invalid update", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn update_user_base(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    PathParams(id): PathParams<i32>,
    JsonBody(req_body): JsonBody<BasePatchReq>,
) -> Result<Json<UserDto>, ProblemResponse> {
    info!("Updating base profile of user {}", id);
    let patch = ProfilePatch::from(BasePatch::from(req_body));
    apply_patch(&svc, id, patch, &uri).await
}

/// Update the health background
#[utoipa::path(
    patch,
    path = "/api/users/{id}/health",
    tag = "users",
    operation_id = "health_profile.update_user_health",
    params(("id" = i32, Path, description = "User id")),
    request_body = UserHealthReq,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 404, description = "Not Found", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 422, description = "Invalid update", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn update_user_health(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    PathParams(id): PathParams<i32>,
    JsonBody(req_body): JsonBody<UserHealthReq>,
) -> Result<Json<UserDto>, ProblemResponse> {
    info!("Updating health background of user {}", id);
    let patch = ProfilePatch::from(UserHealth::from(req_body));
    apply_patch(&svc, id, patch, &uri).await
}

/// Update lifestyle info
#[utoipa::path(
    patch,
    path = "/api/users/{id}/lifestyle",
    tag = "users",
    operation_id = "health_profile.update_user_lifestyle",
    params(("id" = i32, Path, description = "User id")),
    request_body = UserLifestyleReq,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 404, description = "Not Found", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 422, description = "Invalid update", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn update_user_lifestyle(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    PathParams(id): PathParams<i32>,
    JsonBody(req_body): JsonBody<UserLifestyleReq>,
) -> Result<Json<UserDto>, ProblemResponse> {
    info!("Updating lifestyle info of user {}", id);
    let patch = ProfilePatch::from(UserLifestyle::from(req_body));
    apply_patch(&svc, id, patch, &uri).await
}

/// Update emergency information
#[utoipa::path(
    patch,
    path = "/api/users/{id}/emergency",
    tag = "users",
    operation_id = "health_profile.update_user_emergency",
    params(("id" = i32, Path, description = "User id")),
    request_body = UserEmergencyReq,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 404, description = "Not Found", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 422, description = "Invalid update", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn update_user_emergency(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    PathParams(id): PathParams<i32>,
    JsonBody(req_body): JsonBody<UserEmergencyReq>,
) -> Result<Json<UserDto>, ProblemResponse> {
    info!("Updating emergency info of user {}", id);
    let patch = ProfilePatch::from(UserEmergency::from(req_body));
    apply_patch(&svc, id, patch, &uri).await
}

/// Update privacy and security settings
#[utoipa::path(
    patch,
    path = "/api/users/{id}/security",
    tag = "users",
    operation_id = "health_profile.update_user_security",
    params(("id" = i32, Path, description = "User id")),
    request_body = UserSecurityReq,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 404, description = "Not Found", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 422, description = "Invalid update", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn update_user_security(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    PathParams(id): PathParams<i32>,
    JsonBody(req_body): JsonBody<UserSecurityReq>,
) -> Result<Json<UserDto>, ProblemResponse> {
    info!("Updating security settings of user {}", id);
    let patch = ProfilePatch::from(UserSecurity::from(req_body));
    apply_patch(&svc, id, patch, &uri).await
}

/// Submit a risk assessment
#[utoipa::path(
    post,
    path = "/api/assessments/",
    tag = "assessments",
    operation_id = "health_profile.create_assessment",
    request_body = CreateAssessmentReq,
    responses(
        (status = 200, description = "Stored assessment", body = AssessmentDto),
        (status = 404, description = "Unknown user (only when user references are enforced)", body = modkit::Problem, content_type = "application/problem+json"),
        (status = 422, description = "Invalid assessment", body = modkit::Problem, content_type = "application/problem+json"),
    )
)]
pub async fn create_assessment(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    JsonBody(req_body): JsonBody<CreateAssessmentReq>,
) -> Result<Json<AssessmentDto>, ProblemResponse> {
    info!("Creating assessment for user {}", req_body.user_id);

    match svc.create_assessment(req_body.into()).await {
        Ok(a) => Ok(Json(AssessmentDto::from(a))),
        Err(e) => {
            error!("Failed to create assessment: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// List a user's assessments, oldest first
#[utoipa::path(
    get,
    path = "/api/assessments/user/{user_id}",
    tag = "assessments",
    operation_id = "health_profile.list_assessments",
    params(("user_id" = i32, Path, description = "Owning user id")),
    responses(
        (status = 200, description = "Assessments of the user", body = Vec<AssessmentDto>),
    )
)]
pub async fn list_assessments(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    PathParams(user_id): PathParams<i32>,
) -> Result<Json<Vec<AssessmentDto>>, ProblemResponse> {
    info!("Listing assessments for user {}", user_id);

    match svc.list_assessments(user_id).await {
        Ok(items) => Ok(Json(items.into_iter().map(AssessmentDto::from).collect())),
        Err(e) => {
            error!("Failed to list assessments for user {}: {}", user_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
