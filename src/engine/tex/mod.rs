//! TeX -> Typst
//!
//! Tokenizes (expanding custom macros), parses into a small AST, and writes
//! Typst math source.

mod lexer;
mod parser;
mod writer;

use crate::engine::options::ForwardOptions;
use crate::error::Result;

pub use lexer::{MAX_EXPANSION_STEPS, MAX_MACRO_DEPTH};

/// Converts one TeX formula to Typst.
pub fn tex_to_typst(source: &str, options: &ForwardOptions) -> Result<String> {
    let resolved = options.resolve();
    let tokens = lexer::tokenize(source, resolved.custom_macros)?;
    let nodes = parser::Parser::new(tokens, resolved.non_strict, resolved.keep_spaces).parse()?;
    writer::TypstWriter::new(resolved).write(&nodes)
}
