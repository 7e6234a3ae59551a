//! Typst -> TeX

mod lexer;
mod parser;
mod writer;

use crate::engine::options::BackwardOptions;
use crate::error::Result;

/// Converts one Typst math formula to TeX.
pub fn typst_to_tex(source: &str, options: &BackwardOptions) -> Result<String> {
    let tokens = lexer::tokenize(source)?;
    let nodes = parser::Parser::new(tokens).parse()?;
    writer::TexWriter::new(options.resolved_block_math_mode()).write_root(&nodes)
}
