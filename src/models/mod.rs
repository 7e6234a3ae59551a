//! Request and Response models for the conversion API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{ConvertRequest, Tex2TypstRequest, Typst2TexRequest};
pub use responses::{ClearResponse, ConvertResponse, DirectionStats, HealthResponse, StatsResponse};
