//! Request extractors whose rejections render as 422 Problem Details instead
//! of axum's plain-text 400/415 bodies.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use super::problem::{unprocessable, Problem, ProblemResponse};

/// JSON request body. Malformed JSON, a missing content type and shape
/// mismatches all map to 422.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let instance = req.uri().path().to_owned();
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection_to_problem(rejection, instance)),
        }
    }
}

fn json_rejection_to_problem(rejection: JsonRejection, instance: String) -> ProblemResponse {
    tracing::debug!(%instance, error = %rejection.body_text(), "rejected JSON body");
    match rejection {
        // Transport-level failures (e.g. body over the size limit) keep their status.
        JsonRejection::BytesRejection(inner) => Problem::new(
            inner.status(),
            inner
                .status()
                .canonical_reason()
                .unwrap_or("Bad Request"),
            inner.body_text(),
        )
        .with_instance(instance)
        .into(),
        other => {
            let mut p = unprocessable(other.body_text());
            p.0.instance = instance;
            p
        }
    }
}

/// Query string parameters; missing or mistyped parameters map to 422.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => {
                let mut p = unprocessable(rejection.body_text());
                p.0.instance = parts.uri.path().to_owned();
                Err(p)
            }
        }
    }
}

/// Path segments; a segment that does not parse into `T` maps to 422.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathParams<T>(pub T);

impl<T, S> FromRequestParts<S> for PathParams<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => {
                let mut p = unprocessable(rejection.body_text());
                p.0.instance = parts.uri.path().to_owned();
                Err(p)
            }
        }
    }
}
