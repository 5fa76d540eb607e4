use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
///
/// Client-facing messages are fixed, localized literals; any internal detail
/// carried by a variant is logged server-side only.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Bad request: missing or blank required fields, or a malformed body.
    BadRequest,
    /// Required server configuration is missing. The response never reveals
    /// which setting.
    ServerConfig(String),
    /// The CRM rejected the primary contact operation (non-duplicate).
    /// Carries the raw upstream response for operators.
    UpstreamError(String),
    /// Any unexpected fault (transport failures, unparseable upstream
    /// responses, and anything else without a more specific variant).
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest => write!(f, "Bad request: missing required fields"),
            AppError::ServerConfig(msg) => write!(f, "Server configuration error: {}", msg),
            AppError::UpstreamError(msg) => write!(f, "Upstream CRM error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Maps each variant to its status code and fixed Spanish client message.
    /// Internal detail is logged here, never serialized into the body.
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::BadRequest => (StatusCode::BAD_REQUEST, "Nombre y teléfono son requeridos"),
            AppError::ServerConfig(msg) => {
                tracing::error!("Server configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error de configuración del servidor",
                )
            }
            AppError::UpstreamError(msg) => {
                tracing::error!("GHL API error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error al procesar la solicitud",
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error interno del servidor",
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    /// Transport-level failures (connect, timeout, body read) have no
    /// upstream response to classify, so they surface as internal errors.
    fn from(err: reqwest::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}
