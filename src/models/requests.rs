//! Request DTOs for the conversion API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::dispatch::FormulaInput;
use crate::engine::{BackwardOptions, ForwardOptions};
use crate::error::Result;

/// Request body for both conversion endpoints.
///
/// # Fields
/// - `input`: A formula string or an array of formula strings
/// - `options`: Direction options; omitted fields take engine defaults
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertRequest<O> {
    /// Raw input, classified by [`ConvertRequest::into_parts`]
    pub input: Value,
    #[serde(default)]
    pub options: O,
}

/// Body of `POST /convert/tex2typst`
pub type Tex2TypstRequest = ConvertRequest<ForwardOptions>;

/// Body of `POST /convert/typst2tex`
pub type Typst2TexRequest = ConvertRequest<BackwardOptions>;

impl<O> ConvertRequest<O> {
    /// Splits the request into its classified input and its options.
    pub fn into_parts(self) -> Result<(FormulaInput, O)> {
        let input = FormulaInput::from_json(self.input)?;
        Ok((input, self.options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;

    #[test]
    fn test_forward_request_deserialize() {
        let json = r#"{"input": "\\alpha", "options": {"frac_to_slash": false}}"#;
        let req: Tex2TypstRequest = serde_json::from_str(json).unwrap();
        let (input, options) = req.into_parts().unwrap();
        assert_eq!(input, FormulaInput::Scalar("\\alpha".into()));
        assert_eq!(options.frac_to_slash, Some(false));
        assert_eq!(options.non_strict, None);
    }

    #[test]
    fn test_options_default_when_missing() {
        let req: Typst2TexRequest = serde_json::from_str(r#"{"input": ["a", "b"]}"#).unwrap();
        let (input, options) = req.into_parts().unwrap();
        assert!(input.is_batch());
        assert_eq!(options, BackwardOptions::default());
    }

    #[test]
    fn test_wrong_input_type() {
        let req: Tex2TypstRequest = serde_json::from_str(r#"{"input": 123}"#).unwrap();
        let err = req.into_parts().unwrap_err();
        assert_eq!(err, ConvertError::type_mismatch("int"));
    }

    #[test]
    fn test_missing_input_is_rejected() {
        let result: std::result::Result<Tex2TypstRequest, _> = serde_json::from_str("{}");
        assert!(result.is_err());
    }
}
