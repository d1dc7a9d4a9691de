//! API error types and responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::GuideError;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// Session, guide or section not found
    NotFound(String),
    /// Malformed identifier or inconsistent guide content
    BadRequest(String),
    /// Adaptation precondition does not hold
    Conflict(String),
    /// A storage collaborator failed or timed out
    Unavailable(String),
}

/// Error response body
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg)
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

impl From<GuideError> for ApiError {
    fn from(err: GuideError) -> Self {
        let message = err.to_string();
        match err {
            GuideError::MalformedIdentifier { .. }
            | GuideError::DuplicateIdentifier(_)
            | GuideError::InconsistentStep { .. } => ApiError::BadRequest(message),
            GuideError::SectionNotFound(_) | GuideError::SessionNotFound(_) => {
                ApiError::NotFound(message)
            }
            _ if err.is_missing_guide() => ApiError::NotFound(message),
            GuideError::GuideUnavailable { .. }
            | GuideError::SessionUnavailable { .. }
            | GuideError::StorageUnavailable(_) => ApiError::Unavailable(message),
            GuideError::AdaptationPreconditionViolation(_) => ApiError::Conflict(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_not_found_response() {
        let error = ApiError::NotFound("Session 's1' not found".to_string());
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.error, "not_found");
    }

    #[test]
    fn test_guide_error_status_mapping() {
        let cases = [
            (
                GuideError::malformed("01", "leading zero"),
                StatusCode::BAD_REQUEST,
            ),
            (
                GuideError::SectionNotFound("deploy".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                GuideError::SessionNotFound("s1".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                GuideError::guide_missing("g1"),
                StatusCode::NOT_FOUND,
            ),
            (
                GuideError::guide_unavailable("g1", "content backend timed out"),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                GuideError::session_unavailable("s1", "session backend is unreachable"),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                GuideError::AdaptationPreconditionViolation("step '2' is blocked".into()),
                StatusCode::CONFLICT,
            ),
        ];

        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
