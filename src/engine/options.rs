//! Conversion Options
//!
//! Sparse option sets accepted by each direction. Every flag is three-valued:
//! `None` lets the engine pick its default.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// == Forward Options ==
/// Options for TeX -> Typst conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardOptions {
    /// Pass unknown commands through instead of failing (default: true)
    pub non_strict: Option<bool>,
    /// Emit shorthands such as `->` instead of named symbols (default: true)
    pub prefer_shorthands: Option<bool>,
    /// Reproduce source whitespace instead of inserted spacing (default: false)
    pub keep_spaces: Option<bool>,
    /// Render `\frac` as `a/b` (default: true)
    pub frac_to_slash: Option<bool>,
    /// Render `\infty` as `oo` (default: false)
    pub infty_to_oo: Option<bool>,
    /// Collapse plain `\left( \right)` pairs into ordinary parens (default: true)
    pub optimize: Option<bool>,
    /// Macro trigger -> expansion, applied before parsing
    #[serde(alias = "custom_tex_macros")]
    pub custom_macros: Option<HashMap<String, String>>,
}

impl ForwardOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn non_strict(mut self, value: bool) -> Self {
        self.non_strict = Some(value);
        self
    }

    pub fn prefer_shorthands(mut self, value: bool) -> Self {
        self.prefer_shorthands = Some(value);
        self
    }

    pub fn keep_spaces(mut self, value: bool) -> Self {
        self.keep_spaces = Some(value);
        self
    }

    pub fn frac_to_slash(mut self, value: bool) -> Self {
        self.frac_to_slash = Some(value);
        self
    }

    pub fn infty_to_oo(mut self, value: bool) -> Self {
        self.infty_to_oo = Some(value);
        self
    }

    pub fn optimize(mut self, value: bool) -> Self {
        self.optimize = Some(value);
        self
    }

    /// Adds one macro definition, creating the mapping if absent.
    pub fn custom_macro(mut self, trigger: impl Into<String>, expansion: impl Into<String>) -> Self {
        self.custom_macros
            .get_or_insert_with(HashMap::new)
            .insert(trigger.into(), expansion.into());
        self
    }

    pub fn custom_macros(mut self, macros: HashMap<String, String>) -> Self {
        self.custom_macros = Some(macros);
        self
    }

    /// Fills unset flags with the engine defaults.
    pub fn resolve(&self) -> ResolvedForward<'_> {
        ResolvedForward {
            non_strict: self.non_strict.unwrap_or(true),
            prefer_shorthands: self.prefer_shorthands.unwrap_or(true),
            keep_spaces: self.keep_spaces.unwrap_or(false),
            frac_to_slash: self.frac_to_slash.unwrap_or(true),
            infty_to_oo: self.infty_to_oo.unwrap_or(false),
            optimize: self.optimize.unwrap_or(true),
            custom_macros: self.custom_macros.as_ref(),
        }
    }
}

/// Forward options with every default applied.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedForward<'a> {
    pub non_strict: bool,
    pub prefer_shorthands: bool,
    pub keep_spaces: bool,
    pub frac_to_slash: bool,
    pub infty_to_oo: bool,
    pub optimize: bool,
    pub custom_macros: Option<&'a HashMap<String, String>>,
}

// == Backward Options ==
/// Options for Typst -> TeX conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BackwardOptions {
    /// Target display (block) math rather than inline math (default: true)
    pub block_math_mode: Option<bool>,
}

impl BackwardOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block_math_mode(mut self, value: bool) -> Self {
        self.block_math_mode = Some(value);
        self
    }

    pub fn resolved_block_math_mode(&self) -> bool {
        self.block_math_mode.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_defaults() {
        let opts = ForwardOptions::new();
        let resolved = opts.resolve();
        assert!(resolved.non_strict);
        assert!(resolved.prefer_shorthands);
        assert!(!resolved.keep_spaces);
        assert!(resolved.frac_to_slash);
        assert!(!resolved.infty_to_oo);
        assert!(resolved.optimize);
        assert!(resolved.custom_macros.is_none());
    }

    #[test]
    fn test_forward_deserialize_null_and_missing() {
        let a: ForwardOptions = serde_json::from_str(r#"{"frac_to_slash": null}"#).unwrap();
        let b: ForwardOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_forward_deserialize_macros_alias() {
        let opts: ForwardOptions =
            serde_json::from_str(r#"{"custom_tex_macros": {"\\RR": "\\mathbb{R}"}}"#).unwrap();
        assert_eq!(
            opts.custom_macros.unwrap().get("\\RR").map(String::as_str),
            Some("\\mathbb{R}")
        );
    }

    #[test]
    fn test_backward_default_block_mode() {
        assert!(BackwardOptions::new().resolved_block_math_mode());
        assert!(!BackwardOptions::new()
            .block_math_mode(false)
            .resolved_block_math_mode());
    }
}
