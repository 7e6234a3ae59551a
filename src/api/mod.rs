//! API Module
//!
//! HTTP handlers and routing for the conversion service.
//!
//! # Endpoints
//! - `POST /convert/tex2typst` - Convert TeX to Typst
//! - `POST /convert/typst2tex` - Convert Typst to TeX
//! - `GET /stats` - Per-direction cache statistics
//! - `DELETE /cache` - Clear both caches
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
