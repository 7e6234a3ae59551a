//! Formula Cache - cached TeX <-> Typst math conversion
//!
//! A memoizing dispatch layer over a formula translation engine: single
//! formulas are served through a per-direction LRU cache, batches go straight
//! to the engine.

pub mod api;
pub mod cache;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod facade;
pub mod models;

pub use api::AppState;
pub use cache::CacheStats;
pub use config::Config;
pub use dispatch::{FormulaInput, FormulaOutput, IntoFormulaInput};
pub use engine::{BackwardOptions, Direction, EngineAdapter, ForwardOptions, MathEngine};
pub use error::{ConvertError, Result};
pub use facade::{cache_stats, clear_cache, convert_backward, convert_forward, Converter};
