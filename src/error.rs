use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::payments::GatewayError;
use crate::receipt::ReceiptError;
use crate::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("payment gateway: {0}")]
    Gateway(#[from] GatewayError),
    #[error("receipt: {0}")]
    Receipt(#[from] ReceiptError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("not found")]
    NotFound,
    #[error("upstream: {0}")]
    Upstream(String),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_failed"),
            ApiError::Gateway(GatewayError::Rejected { .. }) => {
                (StatusCode::BAD_GATEWAY, "gateway_rejected")
            }
            ApiError::Gateway(_) => (StatusCode::BAD_GATEWAY, "gateway_unavailable"),
            ApiError::Receipt(_) => (StatusCode::INTERNAL_SERVER_ERROR, "receipt_failed"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_failed"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
        }
        let mut body = json!({
            "success": false,
            "error": code,
            "message": self.to_string(),
        });
        if let ApiError::Validation(errors) = &self {
            body["fields"] = json!(errors.0);
        }
        (status, Json(body)).into_response()
    }
}
