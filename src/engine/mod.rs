//! Conversion Engine
//!
//! The [`EngineAdapter`] trait is the boundary the cache layer calls through:
//! a scalar and a batch entry point per direction. [`MathEngine`] is the
//! built-in implementation.

pub mod layout;
pub mod options;
pub mod symbols;
pub mod tex;
pub mod typst;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

pub use options::{BackwardOptions, ForwardOptions};

/// Deepest group, argument or delimiter nesting either parser accepts.
pub const MAX_NESTING_DEPTH: usize = 128;

pub(crate) fn nesting_too_deep() -> ConvertError {
    ConvertError::conversion(format!("nesting too deep (limit {})", MAX_NESTING_DEPTH))
}

// == Direction ==
/// Which grammar is the source of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// TeX -> Typst
    #[serde(rename = "tex2typst")]
    Forward,
    /// Typst -> TeX
    #[serde(rename = "typst2tex")]
    Backward,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "tex2typst",
            Direction::Backward => "typst2tex",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Engine Adapter ==
/// Grammar translation entry points consumed by the dispatch layer.
///
/// Implementations must be pure functions of `(text, options)`: the cache
/// never invalidates an entry once written.
pub trait EngineAdapter: Send + Sync {
    /// Converts one TeX formula to Typst.
    fn tex_to_typst(&self, text: &str, options: &ForwardOptions) -> Result<String>;

    /// Converts one Typst formula to TeX.
    fn typst_to_tex(&self, text: &str, options: &BackwardOptions) -> Result<String>;

    /// Converts many TeX formulas in one call.
    ///
    /// All or nothing: the first failing formula aborts the whole batch.
    fn tex_to_typst_batch(&self, texts: &[String], options: &ForwardOptions) -> Result<Vec<String>> {
        convert_all(texts, |text| self.tex_to_typst(text, options))
    }

    /// Converts many Typst formulas in one call, with the same all-or-nothing
    /// contract as [`EngineAdapter::tex_to_typst_batch`].
    fn typst_to_tex_batch(
        &self,
        texts: &[String],
        options: &BackwardOptions,
    ) -> Result<Vec<String>> {
        convert_all(texts, |text| self.typst_to_tex(text, options))
    }
}

fn convert_all<F>(texts: &[String], mut convert: F) -> Result<Vec<String>>
where
    F: FnMut(&str) -> Result<String>,
{
    let mut outputs = Vec::with_capacity(texts.len());
    for text in texts {
        match convert(text) {
            Ok(output) => outputs.push(output),
            Err(ConvertError::Conversion(message)) => {
                return Err(ConvertError::Conversion(format!(
                    "{} (in '{}')",
                    message, text
                )))
            }
            Err(other) => return Err(other),
        }
    }
    Ok(outputs)
}

// == Math Engine ==
/// Built-in TeX <-> Typst translator. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct MathEngine;

impl MathEngine {
    pub fn new() -> Self {
        Self
    }
}

impl EngineAdapter for MathEngine {
    fn tex_to_typst(&self, text: &str, options: &ForwardOptions) -> Result<String> {
        tex::tex_to_typst(text, options)
    }

    fn typst_to_tex(&self, text: &str, options: &BackwardOptions) -> Result<String> {
        typst::typst_to_tex(text, options)
    }
}
