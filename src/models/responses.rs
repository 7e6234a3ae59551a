//! Response DTOs for the conversion API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::CacheStats;
use crate::dispatch::FormulaOutput;
use crate::engine::Direction;

/// Response body for both conversion endpoints.
///
/// `output` is a string or an array, matching the request's `input`.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertResponse {
    pub output: FormulaOutput,
}

impl ConvertResponse {
    pub fn new(output: FormulaOutput) -> Self {
        Self { output }
    }
}

/// Statistics of one direction's cache.
#[derive(Debug, Clone, Serialize)]
pub struct DirectionStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Current number of cached conversions
    pub size: usize,
    /// Maximum number of cached conversions
    pub capacity: usize,
    /// Number of LRU evictions
    pub evictions: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for DirectionStats {
    fn from(stats: CacheStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            size: stats.size,
            capacity: stats.capacity,
            evictions: stats.evictions,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
///
/// Serializes as `{"tex2typst": {...}, "typst2tex": {...}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct StatsResponse {
    pub directions: BTreeMap<Direction, DirectionStats>,
}

impl StatsResponse {
    /// Creates a new StatsResponse from per-direction cache statistics
    pub fn new(stats: BTreeMap<Direction, CacheStats>) -> Self {
        Self {
            directions: stats
                .into_iter()
                .map(|(direction, stats)| (direction, stats.into()))
                .collect(),
        }
    }
}

/// Response body for the clear endpoint (DELETE /cache)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

impl ClearResponse {
    pub fn cleared() -> Self {
        Self {
            message: "Conversion caches cleared".to_string(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
