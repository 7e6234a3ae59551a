//! Conversion Facade
//!
//! [`Converter`] owns the engine and one cached router per direction. The
//! free functions at the bottom of this module serve a process-wide instance
//! created on first use.

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::info;

use crate::cache::CacheStats;
use crate::config::Config;
use crate::dispatch::{Backward, DispatchRouter, Forward, FormulaOutput, IntoFormulaInput};
use crate::engine::{BackwardOptions, Direction, EngineAdapter, ForwardOptions, MathEngine};
use crate::error::Result;

// == Converter ==
/// Both conversion directions behind one value.
///
/// Safe to share between threads; see [`DispatchRouter`] for the cache
/// locking contract.
pub struct Converter {
    forward: DispatchRouter<Forward>,
    backward: DispatchRouter<Backward>,
}

impl Converter {
    /// Creates a converter whose two caches each hold up to `capacity` entries.
    ///
    /// # Arguments
    /// * `engine` - Translator shared by both directions
    /// * `capacity` - Entries per direction, clamped to at least 1
    pub fn new(engine: Arc<dyn EngineAdapter>, capacity: usize) -> Self {
        Self {
            forward: DispatchRouter::new(Arc::clone(&engine), capacity),
            backward: DispatchRouter::new(engine, capacity),
        }
    }

    /// Creates a converter over the built-in [`MathEngine`].
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(Arc::new(MathEngine::new()), capacity)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_capacity(config.cache_capacity)
    }

    /// TeX -> Typst. A scalar answers a scalar, a batch answers a batch.
    pub fn convert_forward<I>(&self, input: I, options: &ForwardOptions) -> Result<FormulaOutput>
    where
        I: IntoFormulaInput,
    {
        let input = input.into_formula_input()?;
        self.forward.convert(input, options)
    }

    /// Typst -> TeX.
    pub fn convert_backward<I>(
        &self,
        input: I,
        options: &BackwardOptions,
    ) -> Result<FormulaOutput>
    where
        I: IntoFormulaInput,
    {
        let input = input.into_formula_input()?;
        self.backward.convert(input, options)
    }

    /// Snapshot of both caches, keyed by direction.
    pub fn cache_stats(&self) -> BTreeMap<Direction, CacheStats> {
        BTreeMap::from([
            (Direction::Forward, self.forward.stats()),
            (Direction::Backward, self.backward.stats()),
        ])
    }

    /// Empties both caches and zeroes their counters.
    pub fn clear_cache(&self) {
        self.forward.clear();
        self.backward.clear();
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::from_config(&Config::from_env())
    }
}

// == Process-wide Instance ==
static GLOBAL: Lazy<Converter> = Lazy::new(|| {
    let config = Config::from_env();
    info!(capacity = config.cache_capacity, "Initializing process-wide converter");
    Converter::from_config(&config)
});

/// The process-wide converter, created on first use.
pub fn global() -> &'static Converter {
    &GLOBAL
}

pub fn convert_forward<I: IntoFormulaInput>(
    input: I,
    options: &ForwardOptions,
) -> Result<FormulaOutput> {
    global().convert_forward(input, options)
}

pub fn convert_backward<I: IntoFormulaInput>(
    input: I,
    options: &BackwardOptions,
) -> Result<FormulaOutput> {
    global().convert_backward(input, options)
}

pub fn cache_stats() -> BTreeMap<Direction, CacheStats> {
    global().cache_stats()
}

pub fn clear_cache() {
    global().clear_cache()
}
