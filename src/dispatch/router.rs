//! Dispatch Router
//!
//! Per-direction routing: scalars go through the cache, batches go straight
//! to the engine's batch entry point.

use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cache::{CacheStats, ConversionCache, Normalize};
use crate::dispatch::{FormulaInput, FormulaOutput};
use crate::engine::{BackwardOptions, Direction, EngineAdapter, ForwardOptions};
use crate::error::{ConvertError, Result};

// == Route ==
/// Binds a direction to its option type and engine entry points.
pub trait Route: Send + Sync + 'static {
    const DIRECTION: Direction;

    type Options: Normalize;

    fn scalar(engine: &dyn EngineAdapter, text: &str, options: &Self::Options) -> Result<String>;

    fn batch(
        engine: &dyn EngineAdapter,
        texts: &[String],
        options: &Self::Options,
    ) -> Result<Vec<String>>;
}

/// TeX -> Typst.
#[derive(Debug)]
pub struct Forward;

/// Typst -> TeX.
#[derive(Debug)]
pub struct Backward;

impl Route for Forward {
    const DIRECTION: Direction = Direction::Forward;

    type Options = ForwardOptions;

    fn scalar(engine: &dyn EngineAdapter, text: &str, options: &ForwardOptions) -> Result<String> {
        engine.tex_to_typst(text, options)
    }

    fn batch(
        engine: &dyn EngineAdapter,
        texts: &[String],
        options: &ForwardOptions,
    ) -> Result<Vec<String>> {
        engine.tex_to_typst_batch(texts, options)
    }
}

impl Route for Backward {
    const DIRECTION: Direction = Direction::Backward;

    type Options = BackwardOptions;

    fn scalar(engine: &dyn EngineAdapter, text: &str, options: &BackwardOptions) -> Result<String> {
        engine.typst_to_tex(text, options)
    }

    fn batch(
        engine: &dyn EngineAdapter,
        texts: &[String],
        options: &BackwardOptions,
    ) -> Result<Vec<String>> {
        engine.typst_to_tex_batch(texts, options)
    }
}

type KeyOf<R> = <<R as Route>::Options as Normalize>::Key;

// == Dispatch Router ==
/// Routes one direction's conversions.
///
/// The cache lock is held only inside `lookup` and `store`, never across
/// the engine call. Two concurrent misses on the same key may both reach
/// the engine; the second store overwrites with an equal value.
pub struct DispatchRouter<R: Route> {
    engine: Arc<dyn EngineAdapter>,
    cache: Mutex<ConversionCache<KeyOf<R>>>,
    _route: PhantomData<R>,
}

impl<R: Route> DispatchRouter<R> {
    // == Constructor ==
    /// Creates a router with its own empty cache.
    ///
    /// # Arguments
    /// * `engine` - Engine shared with the other direction
    /// * `capacity` - Cache capacity, clamped to at least 1
    pub fn new(engine: Arc<dyn EngineAdapter>, capacity: usize) -> Self {
        Self {
            engine,
            cache: Mutex::new(ConversionCache::new(R::DIRECTION, capacity)),
            _route: PhantomData,
        }
    }

    // == Convert ==
    /// Converts `input`, answering in the same shape.
    pub fn convert(&self, input: FormulaInput, options: &R::Options) -> Result<FormulaOutput> {
        match input {
            FormulaInput::Scalar(text) => self
                .convert_scalar(&text, options)
                .map(FormulaOutput::Scalar),
            FormulaInput::Batch(texts) => self
                .convert_batch(&texts, options)
                .map(FormulaOutput::Batch),
        }
    }

    /// Cached single-formula conversion. Failures are never stored.
    pub fn convert_scalar(&self, text: &str, options: &R::Options) -> Result<String> {
        let key = options.normalize();

        if let Some(output) = self.cache.lock().lookup(text, &key) {
            return Ok(output);
        }

        match R::scalar(self.engine.as_ref(), text, options) {
            Ok(output) => {
                self.cache.lock().store(text, key, output.clone());
                Ok(output)
            }
            Err(err) => {
                warn!(direction = %R::DIRECTION, error = %err, "Engine rejected formula");
                Err(err)
            }
        }
    }

    /// Uncached batch conversion. The cache is neither read nor written.
    pub fn convert_batch(&self, texts: &[String], options: &R::Options) -> Result<Vec<String>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(direction = %R::DIRECTION, count = texts.len(), "Batch conversion");
        let outputs = R::batch(self.engine.as_ref(), texts, options).inspect_err(|err| {
            warn!(direction = %R::DIRECTION, error = %err, "Engine rejected batch");
        })?;

        if outputs.len() != texts.len() {
            return Err(ConvertError::Internal(format!(
                "engine returned {} results for {} formulas",
                outputs.len(),
                texts.len()
            )));
        }
        Ok(outputs)
    }

    // == Introspection ==
    pub fn stats(&self) -> CacheStats {
        self.cache.lock().stats()
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    pub fn direction(&self) -> Direction {
        R::DIRECTION
    }
}
