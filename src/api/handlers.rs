//! API Handlers
//!
//! HTTP request handlers for each conversion service endpoint.

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::config::Config;
use crate::error::{ConvertError, Result};
use crate::facade::Converter;
use crate::models::{
    ClearResponse, ConvertResponse, HealthResponse, StatsResponse, Tex2TypstRequest,
    Typst2TexRequest,
};

/// Application state shared across all handlers.
///
/// The converter synchronizes its own caches, so no outer lock is needed.
#[derive(Clone)]
pub struct AppState {
    pub converter: Arc<Converter>,
}

impl AppState {
    /// Creates a new AppState around the given converter.
    pub fn new(converter: Converter) -> Self {
        Self {
            converter: Arc::new(converter),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Converter::from_config(config))
    }
}

/// Turns axum's body rejection into our error shape.
fn parse_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ConvertError::InvalidRequest(rejection.body_text()))
}

/// Handler for POST /convert/tex2typst
pub async fn tex2typst_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Tex2TypstRequest>, JsonRejection>,
) -> Result<Json<ConvertResponse>> {
    let (input, options) = parse_body(payload)?.into_parts()?;
    let output = state.converter.convert_forward(input, &options)?;

    Ok(Json(ConvertResponse::new(output)))
}

/// Handler for POST /convert/typst2tex
pub async fn typst2tex_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Typst2TexRequest>, JsonRejection>,
) -> Result<Json<ConvertResponse>> {
    let (input, options) = parse_body(payload)?.into_parts()?;
    let output = state.converter.convert_backward(input, &options)?;

    Ok(Json(ConvertResponse::new(output)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(state.converter.cache_stats()))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.converter.clear_cache();
    Json(ClearResponse::cleared())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
