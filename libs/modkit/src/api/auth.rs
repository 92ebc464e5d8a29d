//! Bearer token extraction. Only pulls the credential out of the
//! `Authorization` header; no verification is performed here.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use thiserror::Error;

use super::problem::{unauthorized, ProblemResponse};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization header expected")]
    MissingHeader,
    #[error("Invalid authorization header")]
    InvalidHeader,
}

impl From<AuthError> for ProblemResponse {
    fn from(e: AuthError) -> Self {
        unauthorized(e.to_string())
    }
}

/// Returns the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively and exactly two whitespace
/// separated parts are required.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let raw = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidHeader)?;
    if raw.is_empty() {
        return Err(AuthError::MissingHeader);
    }

    let mut parts = raw.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => {
            Ok(token.to_owned())
        }
        _ => Err(AuthError::InvalidHeader),
    }
}

/// Extractor form of [`bearer_token`]; rejects with a 401 Problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_token(&parts.headers)
            .map(BearerToken)
            .map_err(|e| {
                let mut p = ProblemResponse::from(e);
                p.0.instance = parts.uri.path().to_owned();
                p
            })
    }
}
