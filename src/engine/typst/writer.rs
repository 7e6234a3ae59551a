//! TeX code generation from the Typst AST.

use crate::engine::layout::{char_kind, join, Kind, Piece};
use crate::engine::symbols::{typst_symbol, Class};
use crate::error::{ConvertError, Result};

use super::parser::{Args, Node};

pub struct TexWriter {
    block_math_mode: bool,
}

impl TexWriter {
    pub fn new(block_math_mode: bool) -> Self {
        Self { block_math_mode }
    }

    /// Renders a top-level sequence, wrapping aligned content.
    pub fn write_root(&self, nodes: &[Node]) -> Result<String> {
        let aligned = nodes
            .iter()
            .any(|node| matches!(node, Node::Align | Node::Linebreak));
        let body = self.write(nodes)?;
        if aligned {
            Ok(format!("\\begin{{aligned}} {} \\end{{aligned}}", body))
        } else {
            Ok(body)
        }
    }

    fn write(&self, nodes: &[Node]) -> Result<String> {
        let mut pieces = Vec::with_capacity(nodes.len());
        for node in nodes {
            self.emit(node, &mut pieces)?;
        }
        Ok(join(&pieces, false))
    }

    fn emit(&self, node: &Node, out: &mut Vec<Piece>) -> Result<()> {
        match node {
            Node::Ident(name) => out.push(ident(name)?),
            Node::Number(n) => out.push(Piece::atom(n.clone())),
            Node::Str(text) => out.push(Piece::atom(format!("\\text{{{}}}", escape_text(text)))),
            Node::Shorthand { tex, class } => out.push(Piece::new(*tex, Kind::from(*class))),
            Node::Punct(c) => out.push(punct(*c)),
            Node::Escaped(c) => out.push(Piece::atom(escaped(*c))),
            Node::None => {}
            Node::Delimited { open, close, body } => {
                out.push(punct(*open));
                for child in body {
                    self.emit(child, out)?;
                }
                out.push(punct(*close));
            }
            Node::Group(children) => {
                for child in children {
                    self.emit(child, out)?;
                }
            }
            Node::Frac(num, den) => out.push(Piece::atom(format!(
                "\\frac{{{}}}{{{}}}",
                self.render(num)?,
                self.render(den)?
            ))),
            Node::Scripts { base, sub, sup } => {
                let mut text = match base {
                    Some(base) => self.render(base)?,
                    None => "{}".to_string(),
                };
                if let Some(sub) = sub {
                    text.push('_');
                    text.push_str(&script(self.render(sub)?));
                }
                if let Some(sup) = sup {
                    text.push('^');
                    text.push_str(&script(self.render(sup)?));
                }
                out.push(Piece::atom(text));
            }
            Node::Call { name, args } => out.push(Piece::atom(self.call(name, args)?)),
            Node::Align => out.push(Piece::atom("&")),
            Node::Linebreak => out.push(Piece::atom("\\\\")),
        }
        Ok(())
    }

    fn render(&self, node: &Node) -> Result<String> {
        self.write(std::slice::from_ref(node))
    }

    fn call(&self, name: &str, args: &Args) -> Result<String> {
        let positional = args.positional();
        let arg = |i: usize| -> Result<String> {
            let nodes = positional.get(i).ok_or_else(|| {
                ConvertError::conversion(format!("{}() is missing an argument", name))
            })?;
            self.write(nodes)
        };

        let text = match name {
            "frac" => format!("\\frac{{{}}}{{{}}}", arg(0)?, arg(1)?),
            "binom" => format!("\\binom{{{}}}{{{}}}", arg(0)?, arg(1)?),
            "sqrt" => format!("\\sqrt{{{}}}", arg(0)?),
            "root" => format!("\\sqrt[{}]{{{}}}", arg(0)?, arg(1)?),
            "abs" => format!("\\left| {} \\right|", arg(0)?),
            "norm" => format!("\\left\\| {} \\right\\|", arg(0)?),
            "floor" => format!("\\left\\lfloor {} \\right\\rfloor", arg(0)?),
            "ceil" => format!("\\left\\lceil {} \\right\\rceil", arg(0)?),
            "op" => match positional.first() {
                Some([Node::Str(text)]) => format!("\\operatorname{{{}}}", escape_text(text)),
                _ => format!("\\operatorname{{{}}}", arg(0)?),
            },
            "lr" => self.left_right(positional.first().copied().unwrap_or(&[]))?,
            "display" if self.block_math_mode => arg(0)?,
            "display" => format!("\\displaystyle {}", arg(0)?),
            "inline" if self.block_math_mode => format!("\\textstyle {}", arg(0)?),
            "inline" => arg(0)?,
            "mat" => {
                let env = matrix_env(args.named("delim"), "pmatrix")?;
                let mut rows = Vec::with_capacity(args.rows.len());
                for row in &args.rows {
                    rows.push(self.cells(row)?.join(" & "));
                }
                environment(env, &rows.join(" \\\\ "))
            }
            "vec" => {
                let env = matrix_env(args.named("delim"), "pmatrix")?;
                environment(env, &self.cells_of(&positional)?.join(" \\\\ "))
            }
            "cases" => environment("cases", &self.cells_of(&positional)?.join(" \\\\ ")),
            _ => match font_function(name).or_else(|| accent_function(name)) {
                Some(command) => format!("\\{}{{{}}}", command, arg(0)?),
                None => {
                    return Err(ConvertError::conversion(format!(
                        "unsupported function {}()",
                        name
                    )))
                }
            },
        };
        Ok(text)
    }

    fn left_right(&self, body: &[Node]) -> Result<String> {
        match body {
            [Node::Delimited { open, close, body }] => Ok(format!(
                "\\left{} {} \\right{}",
                punct(*open).text,
                self.write(body)?,
                punct(*close).text
            )),
            [Node::Ident(open), inner @ .., Node::Ident(close)]
                if is_delimiter(open, Class::Open) && is_delimiter(close, Class::Close) =>
            {
                Ok(format!(
                    "\\left{} {} \\right{}",
                    ident(open)?.text,
                    self.write(inner)?,
                    ident(close)?.text
                ))
            }
            nodes => Ok(format!("\\left. {} \\right.", self.write(nodes)?)),
        }
    }

    fn cells(&self, row: &[Vec<Node>]) -> Result<Vec<String>> {
        row.iter().map(|cell| self.write(cell)).collect()
    }

    fn cells_of(&self, cells: &[&[Node]]) -> Result<Vec<String>> {
        cells.iter().map(|cell| self.write(cell)).collect()
    }
}

fn ident(name: &str) -> Result<Piece> {
    if name.chars().count() == 1 {
        return Ok(Piece::atom(name));
    }
    if let Some((tex, class)) = typst_symbol(name) {
        let text = format!("\\{}", tex);
        // Named delimiters space like identifiers
        let kind = match Kind::from(class) {
            Kind::Open | Kind::Close if tex.chars().any(char::is_alphabetic) => Kind::Atom,
            kind => kind,
        };
        return Ok(Piece::new(text, kind));
    }
    if name.chars().all(|c| c.is_ascii_alphabetic()) {
        return Ok(Piece::atom(format!("\\{}", name)));
    }
    Err(ConvertError::conversion(format!("unknown symbol '{}'", name)))
}

fn is_delimiter(name: &str, class: Class) -> bool {
    typst_symbol(name).is_some_and(|(_, found)| found == class)
}

fn punct(c: char) -> Piece {
    match c {
        '{' => Piece::new("\\{", Kind::Open),
        '}' => Piece::new("\\}", Kind::Close),
        c => Piece::new(escaped(c), char_kind(c)),
    }
}

fn escaped(c: char) -> String {
    match c {
        '#' | '$' | '%' | '&' | '_' | '{' | '}' => format!("\\{}", c),
        '\\' => "\\backslash".to_string(),
        '~' => "\\sim".to_string(),
        '^' => "\\hat{}".to_string(),
        c => c.to_string(),
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '{' | '}' | '#' | '$' | '%' | '&' | '_' => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

/// Single characters need no braces after `_` or `^`.
fn script(text: String) -> String {
    if text.chars().count() == 1 {
        text
    } else {
        format!("{{{}}}", text)
    }
}

fn environment(name: &str, body: &str) -> String {
    format!("\\begin{{{name}}} {body} \\end{{{name}}}")
}

fn matrix_env(delim: Option<&[Node]>, default: &'static str) -> Result<&'static str> {
    let Some(delim) = delim else {
        return Ok(default);
    };
    match delim {
        [Node::None] => Ok("matrix"),
        [Node::Str(d)] => match d.as_str() {
            "(" => Ok("pmatrix"),
            "[" => Ok("bmatrix"),
            "{" => Ok("Bmatrix"),
            "|" => Ok("vmatrix"),
            "||" => Ok("Vmatrix"),
            other => Err(ConvertError::conversion(format!(
                "unsupported matrix delimiter \"{}\"",
                other
            ))),
        },
        _ => Err(ConvertError::conversion("matrix delimiter must be a string")),
    }
}

fn font_function(name: &str) -> Option<&'static str> {
    match name {
        "bold" => Some("mathbf"),
        "upright" => Some("mathrm"),
        "italic" => Some("mathit"),
        "bb" => Some("mathbb"),
        "cal" => Some("mathcal"),
        "frak" => Some("mathfrak"),
        "sans" => Some("mathsf"),
        "mono" => Some("mathtt"),
        _ => None,
    }
}

fn accent_function(name: &str) -> Option<&'static str> {
    match name {
        "hat" => Some("hat"),
        "tilde" => Some("tilde"),
        "macron" => Some("bar"),
        "overline" => Some("overline"),
        "underline" => Some("underline"),
        "arrow" => Some("vec"),
        "dot" => Some("dot"),
        "dot.double" => Some("ddot"),
        "acute" => Some("acute"),
        "grave" => Some("grave"),
        "breve" => Some("breve"),
        "caron" => Some("check"),
        _ => None,
    }
}
