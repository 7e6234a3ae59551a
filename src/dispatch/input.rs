//! Input and output shapes
//!
//! A conversion takes either one formula or an ordered batch of formulas, and
//! answers in the same shape.

use serde::Serialize;
use serde_json::Value;

use crate::error::{ConvertError, Result};

// == Formula Input ==
/// Input to a conversion, classified once at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormulaInput {
    /// One formula; served through the cache
    Scalar(String),
    /// Ordered formulas; sent to the engine's batch entry point
    Batch(Vec<String>),
}

impl FormulaInput {
    /// Classifies a JSON value.
    ///
    /// Strings become [`FormulaInput::Scalar`], arrays of strings become
    /// [`FormulaInput::Batch`]; anything else is a TypeMismatch naming the
    /// offending type.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::String(text) => Ok(FormulaInput::Scalar(text)),
            Value::Array(items) => {
                let mut texts = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(text) => texts.push(text),
                        other => {
                            return Err(ConvertError::type_mismatch(format!(
                                "list containing {}",
                                json_type_name(&other)
                            )))
                        }
                    }
                }
                Ok(FormulaInput::Batch(texts))
            }
            other => Err(ConvertError::type_mismatch(json_type_name(&other))),
        }
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, FormulaInput::Batch(_))
    }
}

impl From<&str> for FormulaInput {
    fn from(text: &str) -> Self {
        FormulaInput::Scalar(text.to_string())
    }
}

impl From<String> for FormulaInput {
    fn from(text: String) -> Self {
        FormulaInput::Scalar(text)
    }
}

impl From<Vec<String>> for FormulaInput {
    fn from(texts: Vec<String>) -> Self {
        FormulaInput::Batch(texts)
    }
}

impl From<Vec<&str>> for FormulaInput {
    fn from(texts: Vec<&str>) -> Self {
        FormulaInput::Batch(texts.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for FormulaInput {
    fn from(texts: &[&str]) -> Self {
        FormulaInput::Batch(texts.iter().map(|t| t.to_string()).collect())
    }
}

// == Into Formula Input ==
/// Anything a conversion can be called with.
///
/// Typed Rust values always classify; a raw JSON value may not.
pub trait IntoFormulaInput {
    fn into_formula_input(self) -> Result<FormulaInput>;
}

impl IntoFormulaInput for FormulaInput {
    fn into_formula_input(self) -> Result<FormulaInput> {
        Ok(self)
    }
}

impl IntoFormulaInput for Value {
    fn into_formula_input(self) -> Result<FormulaInput> {
        FormulaInput::from_json(self)
    }
}

impl IntoFormulaInput for &str {
    fn into_formula_input(self) -> Result<FormulaInput> {
        Ok(self.into())
    }
}

impl IntoFormulaInput for String {
    fn into_formula_input(self) -> Result<FormulaInput> {
        Ok(self.into())
    }
}

impl IntoFormulaInput for Vec<String> {
    fn into_formula_input(self) -> Result<FormulaInput> {
        Ok(self.into())
    }
}

impl IntoFormulaInput for Vec<&str> {
    fn into_formula_input(self) -> Result<FormulaInput> {
        Ok(self.into())
    }
}

impl IntoFormulaInput for &[&str] {
    fn into_formula_input(self) -> Result<FormulaInput> {
        Ok(self.into())
    }
}

/// Type names as a JSON-minded caller would call them.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

// == Formula Output ==
/// Conversion result, shaped like the input that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FormulaOutput {
    Scalar(String),
    Batch(Vec<String>),
}

impl FormulaOutput {
    /// The converted formula of a scalar call.
    pub fn into_scalar(self) -> Option<String> {
        match self {
            FormulaOutput::Scalar(text) => Some(text),
            FormulaOutput::Batch(_) => None,
        }
    }

    /// The converted formulas of a batch call.
    pub fn into_batch(self) -> Option<Vec<String>> {
        match self {
            FormulaOutput::Batch(texts) => Some(texts),
            FormulaOutput::Scalar(_) => None,
        }
    }
}
