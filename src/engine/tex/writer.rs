//! Typst code generation from the TeX AST.

use crate::engine::layout::{char_kind, join, Kind, Piece};
use crate::engine::options::ResolvedForward;
use crate::engine::symbols::{Class, SHORTHANDS};
use crate::error::Result;

use super::parser::Node;

pub struct TypstWriter<'a> {
    options: ResolvedForward<'a>,
}

impl<'a> TypstWriter<'a> {
    pub fn new(options: ResolvedForward<'a>) -> Self {
        Self { options }
    }

    /// Renders a node sequence as Typst math source.
    pub fn write(&self, nodes: &[Node]) -> Result<String> {
        let mut pieces = Vec::with_capacity(nodes.len());
        for node in nodes {
            self.emit(node, &mut pieces)?;
        }
        Ok(join(&pieces, self.options.keep_spaces))
    }

    fn render(&self, node: &Node) -> Result<String> {
        self.write(std::slice::from_ref(node))
    }

    fn emit(&self, node: &Node, out: &mut Vec<Piece>) -> Result<()> {
        match node {
            Node::Letter(c) => out.push(Piece::atom(c.to_string())),
            Node::Number(n) => out.push(Piece::atom(n.clone())),
            Node::Punct(c) => out.push(Piece::new(escape_char(*c), char_kind(*c))),
            Node::Symbol {
                command,
                typst,
                class,
            } => out.push(self.symbol(command, typst, *class)),
            Node::Unknown(name) => out.push(Piece::atom(name.clone())),
            Node::Group(children) => {
                for child in children {
                    self.emit(child, out)?;
                }
            }
            Node::Frac(num, den) => {
                let text = if self.options.frac_to_slash {
                    format!("{}/{}", self.operand(num)?, self.operand(den)?)
                } else {
                    format!("frac({}, {})", self.render(num)?, self.render(den)?)
                };
                out.push(Piece::atom(text));
            }
            Node::Binom(n, k) => out.push(Piece::atom(format!(
                "binom({}, {})",
                self.render(n)?,
                self.render(k)?
            ))),
            Node::Sqrt { index, radicand } => {
                let text = match index {
                    Some(index) => {
                        format!("root({}, {})", self.render(index)?, self.render(radicand)?)
                    }
                    None => format!("sqrt({})", self.render(radicand)?),
                };
                out.push(Piece::atom(text));
            }
            Node::Scripts { base, sub, sup } => {
                let mut text = match base {
                    Some(base) => self.operand(base)?,
                    None => "\"\"".to_string(),
                };
                if let Some(sub) = sub {
                    text.push('_');
                    text.push_str(&self.operand(sub)?);
                }
                if let Some(sup) = sup {
                    text.push('^');
                    text.push_str(&self.operand(sup)?);
                }
                out.push(Piece::atom(text));
            }
            Node::Font { func, body } | Node::Accent { func, body } => {
                out.push(Piece::atom(format!("{}({})", func, self.render(body)?)))
            }
            Node::Text(text) => out.push(Piece::atom(quote(text))),
            Node::OperatorName(name) => out.push(Piece::atom(format!("op({})", quote(name)))),
            Node::LeftRight { open, close, body } => self.emit_left_right(open, close, body, out)?,
            Node::Matrix { delim, rows } => {
                let mut text = String::from("mat(");
                match delim {
                    Some("(") => {}
                    Some(delim) => text.push_str(&format!("delim: {}, ", quote(delim))),
                    None => text.push_str("delim: #none, "),
                }
                text.push_str(&self.rows(rows, ", ", "; ")?);
                text.push(')');
                out.push(Piece::atom(text));
            }
            Node::Cases(rows) => {
                out.push(Piece::atom(format!("cases({})", self.rows(rows, " & ", ", ")?)))
            }
            Node::Aligned(rows) => out.push(Piece::atom(self.rows(rows, " & ", " \\ ")?)),
            Node::Style { display, body } => {
                let func = if *display { "display" } else { "inline" };
                out.push(Piece::atom(format!("{}({})", func, self.write(body)?)));
            }
            Node::Align => out.push(Piece::atom("&")),
            Node::Linebreak => out.push(Piece::atom("\\")),
            Node::RawSpace => out.push(Piece::raw_space()),
        }
        Ok(())
    }

    fn symbol(&self, command: &str, typst: &str, class: Class) -> Piece {
        if command == "infty" && self.options.infty_to_oo {
            return Piece::atom("oo");
        }
        let text = if self.options.prefer_shorthands {
            SHORTHANDS.get(command).copied().unwrap_or(typst)
        } else {
            typst
        };
        // Named delimiters such as `angle.l` need spacing like any identifier
        let kind = match Kind::from(class) {
            Kind::Open | Kind::Close if text.chars().any(char::is_alphanumeric) => Kind::Atom,
            kind => kind,
        };
        Piece::new(text, kind)
    }

    fn emit_left_right(
        &self,
        open: &str,
        close: &str,
        body: &[Node],
        out: &mut Vec<Piece>,
    ) -> Result<()> {
        let plain = matches!((open, close), ("(", ")") | ("[", "]"));
        let mut pieces = Vec::with_capacity(body.len() + 2);
        if !open.is_empty() {
            pieces.push(delimiter(open, Kind::Open));
        }
        for node in body {
            self.emit(node, &mut pieces)?;
        }
        if !close.is_empty() {
            pieces.push(delimiter(close, Kind::Close));
        }

        if plain && self.options.optimize {
            out.extend(pieces);
        } else {
            out.push(Piece::atom(format!(
                "lr({})",
                join(&pieces, self.options.keep_spaces)
            )));
        }
        Ok(())
    }

    /// Renders a script, fraction side, or base; anything that would not
    /// read as a single unit in Typst gets parenthesised.
    fn operand(&self, node: &Node) -> Result<String> {
        let node = unwrap_group(node);
        let text = self.render(node)?;
        if is_atomic(node, self.options) {
            Ok(text)
        } else {
            Ok(format!("({})", text))
        }
    }

    fn rows(&self, rows: &[Vec<Vec<Node>>], cell_sep: &str, row_sep: &str) -> Result<String> {
        let mut rendered = Vec::with_capacity(rows.len());
        for row in rows {
            let mut cells = Vec::with_capacity(row.len());
            for cell in row {
                cells.push(self.write(cell)?);
            }
            rendered.push(cells.join(cell_sep));
        }
        Ok(rendered.join(row_sep))
    }
}

fn unwrap_group(node: &Node) -> &Node {
    match node {
        Node::Group(children) if children.len() == 1 => unwrap_group(&children[0]),
        other => other,
    }
}

fn is_atomic(node: &Node, options: ResolvedForward<'_>) -> bool {
    match node {
        Node::Letter(_)
        | Node::Number(_)
        | Node::Punct(_)
        | Node::Symbol { .. }
        | Node::Unknown(_)
        | Node::Binom(..)
        | Node::Sqrt { .. }
        | Node::Font { .. }
        | Node::Accent { .. }
        | Node::Text(_)
        | Node::OperatorName(_)
        | Node::Matrix { .. }
        | Node::Cases(_)
        | Node::Style { .. } => true,
        Node::Frac(..) => !options.frac_to_slash,
        Node::LeftRight { open, close, .. } => {
            !(options.optimize && matches!((open.as_str(), close.as_str()), ("(", ")") | ("[", "]")))
        }
        _ => false,
    }
}

fn delimiter(text: &str, kind: Kind) -> Piece {
    if text.chars().any(char::is_alphanumeric) {
        Piece::atom(text)
    } else {
        Piece::new(text, kind)
    }
}

fn escape_char(c: char) -> String {
    match c {
        '/' | '#' | '$' | '"' | '@' | '~' | '_' | '^' | '&' | '\\' => format!("\\{}", c),
        c => c.to_string(),
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}
