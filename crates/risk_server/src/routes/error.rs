//! Mapping of engine errors and malformed bodies to HTTP responses

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use risk_engine::EngineError;
use serde::{Deserialize, Serialize};

/// Error body returned by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Machine-readable error kind
    pub error: String,
    /// Human-readable description
    pub message: String,
}

/// JSON body extractor whose rejections use the [`ErrorResponse`] shape
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Handler error
#[derive(Debug)]
pub enum ApiError {
    /// Engine failure
    Engine(EngineError),
    /// Body that is not valid JSON for the endpoint
    Body(JsonRejection),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Body(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            ApiError::Engine(err) => match err {
                EngineError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                EngineError::InvalidScenario(_) => (StatusCode::BAD_REQUEST, "invalid_scenario"),
                EngineError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
                EngineError::Computation(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "computation_error")
                }
                EngineError::Config(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
                }
            },
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Engine(err) => err.to_string(),
            ApiError::Body(rejection) => rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!(error = %message, "request failed");
        }
        let body = ErrorResponse {
            error: kind.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_core::ValidationError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                EngineError::Validation(ValidationError::InvalidPathCount(0)),
                StatusCode::BAD_REQUEST,
            ),
            (
                EngineError::InvalidScenario("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                EngineError::Timeout { timeout_ms: 10 },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                EngineError::Computation("overflow".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), expected);
        }
    }
}
