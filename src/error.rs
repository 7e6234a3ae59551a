//! Error types for the conversion layer
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Convert Error Enum ==
/// Unified error type for conversion calls and the HTTP surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// Input is neither a single formula nor a sequence of formulas
    #[error("Expected str or list, got {found}")]
    TypeMismatch { found: String },

    /// The engine rejected the formula under the active options
    #[error("Conversion failed: {0}")]
    Conversion(String),

    /// Malformed request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// Builds a TypeMismatch naming the offending type.
    pub fn type_mismatch(found: impl Into<String>) -> Self {
        ConvertError::TypeMismatch {
            found: found.into(),
        }
    }

    /// Builds a ConversionError from an engine diagnostic.
    pub fn conversion(message: impl Into<String>) -> Self {
        ConvertError::Conversion(message.into())
    }

    /// Short machine-readable tag used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ConvertError::TypeMismatch { .. } => "type_mismatch",
            ConvertError::Conversion(_) => "conversion",
            ConvertError::InvalidRequest(_) => "invalid_request",
            ConvertError::Internal(_) => "internal",
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ConvertError {
    fn into_response(self) -> Response {
        let status = match &self {
            ConvertError::TypeMismatch { .. } => StatusCode::BAD_REQUEST,
            ConvertError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ConvertError::Conversion(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ConvertError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the conversion layer.
pub type Result<T> = std::result::Result<T, ConvertError>;
