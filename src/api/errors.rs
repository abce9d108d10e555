use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::errors::ServiceError;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    code: &'static str,
    detail: String,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(&'static str),
    Internal(String),
    Service(ServiceError),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self::Service(err)
    }
}

pub(crate) fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::Forbidden => StatusCode::FORBIDDEN,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::DuplicateApplication
        | ServiceError::DuplicateAttempt
        | ServiceError::InvalidTransition { .. }
        | ServiceError::OpportunityClosed
        | ServiceError::QuizInactive
        | ServiceError::AttemptAlreadySubmitted => StatusCode::CONFLICT,
        ServiceError::AttemptExpired => StatusCode::GONE,
        ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn respond(status: StatusCode, code: &'static str, detail: String) -> Response {
    (status, Json(ErrorResponse { status: status.as_u16(), code, detail })).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(message) => {
                let mut response =
                    respond(StatusCode::UNAUTHORIZED, "unauthorized", message.to_string());
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                respond(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
            ApiError::Service(ServiceError::Database(err)) => {
                tracing::error!(error = %err, "Database error");
                respond(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
            ApiError::Service(err) => respond(status_for(&err), err.code(), err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    #[tokio::test]
    async fn expired_attempt_maps_to_gone_with_code() {
        let response = ApiError::from(ServiceError::AttemptExpired).into_response();
        assert_eq!(response.status(), StatusCode::GONE);

        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["code"], "attempt_expired");
        assert_eq!(json["status"], 410);
    }

    #[tokio::test]
    async fn database_errors_are_not_leaked() {
        let response =
            ApiError::from(ServiceError::Database(sqlx::Error::PoolTimedOut)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["detail"], "Internal server error");
    }

    #[test]
    fn conflicts_share_409() {
        for err in [
            ServiceError::DuplicateApplication,
            ServiceError::DuplicateAttempt,
            ServiceError::OpportunityClosed,
            ServiceError::QuizInactive,
            ServiceError::AttemptAlreadySubmitted,
        ] {
            assert_eq!(status_for(&err), StatusCode::CONFLICT, "{err}");
        }
    }
}
