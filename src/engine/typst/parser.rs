//! Typst math parser.
//!
//! Scripts bind tighter than `/`, so `a^2/b` is a fraction over `a^2`. A
//! parenthesised fraction side or script loses its parentheses, as in Typst.

use crate::engine::symbols::Class;
use crate::engine::{nesting_too_deep, MAX_NESTING_DEPTH};
use crate::error::{ConvertError, Result};

use super::lexer::Token;

/// Functions recognised as calls when `(` follows the name directly.
const FUNCTIONS: &[&str] = &[
    "frac", "binom", "sqrt", "root", "abs", "norm", "floor", "ceil", "bold", "upright", "italic",
    "bb", "cal", "frak", "sans", "mono", "hat", "tilde", "macron", "overline", "underline",
    "arrow", "dot", "dot.double", "acute", "grave", "breve", "caron", "op", "lr", "display",
    "inline", "mat", "vec", "cases",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Ident(String),
    Number(String),
    Str(String),
    Shorthand {
        tex: &'static str,
        class: Class,
    },
    Punct(char),
    Escaped(char),
    None,
    Delimited {
        open: char,
        close: char,
        body: Vec<Node>,
    },
    Frac(Box<Node>, Box<Node>),
    Scripts {
        base: Option<Box<Node>>,
        sub: Option<Box<Node>>,
        sup: Option<Box<Node>>,
    },
    Call {
        name: String,
        args: Args,
    },
    Align,
    Linebreak,
    Group(Vec<Node>),
}

/// Positional arguments as rows of cells, plus named arguments.
///
/// `f(a, b)` has one row with two cells; `mat(a, b; c, d)` has two rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    pub rows: Vec<Vec<Vec<Node>>>,
    pub named: Vec<(String, Vec<Node>)>,
}

impl Args {
    /// Positional arguments in order, ignoring row boundaries.
    pub fn positional(&self) -> Vec<&[Node]> {
        self.rows
            .iter()
            .flat_map(|row| row.iter().map(Vec::as_slice))
            .collect()
    }

    pub fn named(&self, name: &str) -> Option<&[Node]> {
        self.named
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_slice())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    End,
    Close(char),
    Arg,
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    pub fn parse(mut self) -> Result<Vec<Node>> {
        self.parse_sequence(Stop::End)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn skip_whitespace(&mut self) {
        while self.peek() == Some(&Token::Whitespace) {
            self.pos += 1;
        }
    }

    fn parse_sequence(&mut self, stop: Stop) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();

        loop {
            let Some(token) = self.peek().cloned() else {
                return match stop {
                    Stop::End => Ok(nodes),
                    Stop::Close(c) => Err(ConvertError::conversion(format!("missing '{}'", c))),
                    Stop::Arg => Err(ConvertError::conversion("missing ')' after arguments")),
                };
            };

            match token {
                Token::Punct(c) if stop == Stop::Close(c) => {
                    self.pos += 1;
                    return Ok(nodes);
                }
                Token::Punct(',' | ';' | ')') if stop == Stop::Arg => return Ok(nodes),
                Token::Whitespace => self.pos += 1,
                Token::Caret | Token::Underscore => {
                    self.pos += 1;
                    let arg = self.parse_script_argument()?;
                    attach_script(&mut nodes, token == Token::Caret, arg)?;
                }
                Token::Slash => {
                    self.pos += 1;
                    let num = nodes
                        .pop()
                        .ok_or_else(|| ConvertError::conversion("fraction without numerator"))?;
                    self.skip_whitespace();
                    let den = self.parse_unit()?;
                    nodes.push(Node::Frac(Box::new(strip_parens(num)), Box::new(strip_parens(den))));
                }
                _ => {
                    let node = self.parse_primary()?;
                    nodes.push(node);
                }
            }
        }
    }

    /// A primary followed by any scripts written directly after it.
    fn parse_unit(&mut self) -> Result<Node> {
        let mut nodes = vec![self.parse_primary()?];
        loop {
            match self.peek() {
                Some(Token::Caret) | Some(Token::Underscore) => {
                    let is_sup = self.peek() == Some(&Token::Caret);
                    self.pos += 1;
                    let arg = self.parse_script_argument()?;
                    attach_script(&mut nodes, is_sup, arg)?;
                }
                _ => break,
            }
        }
        nodes
            .pop()
            .ok_or_else(|| ConvertError::conversion("missing operand"))
    }

    fn parse_script_argument(&mut self) -> Result<Node> {
        self.skip_whitespace();
        Ok(strip_parens(self.parse_primary()?))
    }

    /// Every nested construct is entered through a primary.
    fn parse_primary(&mut self) -> Result<Node> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(nesting_too_deep());
        }
        self.depth += 1;
        let result = self.parse_primary_inner();
        self.depth -= 1;
        result
    }

    fn parse_primary_inner(&mut self) -> Result<Node> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| ConvertError::conversion("unexpected end of input"))?;
        self.pos += 1;

        match token {
            Token::Ident(name) => {
                let is_call = self.peek() == Some(&Token::Punct('('))
                    && FUNCTIONS.contains(&name.as_str());
                if is_call {
                    self.pos += 1;
                    let args = self.parse_args()?;
                    Ok(Node::Call { name, args })
                } else {
                    Ok(Node::Ident(name))
                }
            }
            Token::Number(n) => Ok(Node::Number(n)),
            Token::Str(s) => Ok(Node::Str(s)),
            Token::Shorthand { tex, class } => Ok(Node::Shorthand { tex, class }),
            Token::Escaped(c) => Ok(Node::Escaped(c)),
            Token::Hash(name) if name == "none" => Ok(Node::None),
            Token::Hash(name) => Err(ConvertError::conversion(format!(
                "unsupported code expression '#{}'",
                name
            ))),
            Token::Punct(open @ ('(' | '[' | '{')) => {
                let close = match open {
                    '(' => ')',
                    '[' => ']',
                    _ => '}',
                };
                let body = self.parse_sequence(Stop::Close(close))?;
                Ok(Node::Delimited { open, close, body })
            }
            Token::Punct(c) => Ok(Node::Punct(c)),
            Token::Ampersand => Ok(Node::Align),
            Token::Linebreak => Ok(Node::Linebreak),
            Token::Slash | Token::Caret | Token::Underscore => Err(ConvertError::conversion(
                "operator without operand",
            )),
            Token::Whitespace => self.parse_primary(),
        }
    }

    /// Parses call arguments after the opening `(`, consuming the `)`.
    fn parse_args(&mut self) -> Result<Args> {
        let mut args = Args::default();
        let mut row = Vec::new();

        loop {
            self.skip_whitespace();
            let name = self.named_argument();
            let value = self.parse_sequence(Stop::Arg)?;

            match name {
                Some(name) => args.named.push((name, value)),
                None => row.push(value),
            }

            match self.peek() {
                Some(Token::Punct(',')) => self.pos += 1,
                Some(Token::Punct(';')) => {
                    self.pos += 1;
                    args.rows.push(std::mem::take(&mut row));
                }
                // parse_sequence(Stop::Arg) only returns on `,` `;` or `)`
                _ => {
                    self.pos += 1;
                    // `f()`, `f(a, )` and `mat(a;)` leave an empty trailing cell
                    if row.last().is_some_and(Vec::is_empty) {
                        row.pop();
                    }
                    if !row.is_empty() {
                        args.rows.push(row);
                    }
                    return Ok(args);
                }
            }
        }
    }

    /// Consumes `name:` when it opens an argument.
    fn named_argument(&mut self) -> Option<String> {
        match (self.tokens.get(self.pos), self.tokens.get(self.pos + 1)) {
            (Some(Token::Ident(name)), Some(Token::Punct(':'))) => {
                let name = name.clone();
                self.pos += 2;
                self.skip_whitespace();
                Some(name)
            }
            _ => None,
        }
    }
}

/// `(a + b)` used as an operand stands for `a + b`.
fn strip_parens(node: Node) -> Node {
    match node {
        Node::Delimited {
            open: '(',
            close: ')',
            body,
        } => Node::Group(body),
        other => other,
    }
}

fn attach_script(nodes: &mut Vec<Node>, is_sup: bool, arg: Node) -> Result<()> {
    let target = match nodes.pop() {
        Some(Node::Scripts { base, sub, sup }) => match (is_sup, sub, sup) {
            (true, sub, None) => Node::Scripts {
                base,
                sub,
                sup: Some(Box::new(arg)),
            },
            (false, None, sup) => Node::Scripts {
                base,
                sub: Some(Box::new(arg)),
                sup,
            },
            (true, _, Some(_)) => return Err(ConvertError::conversion("double superscript")),
            (false, Some(_), _) => return Err(ConvertError::conversion("double subscript")),
        },
        base => {
            let base = base.map(Box::new);
            let arg = Some(Box::new(arg));
            if is_sup {
                Node::Scripts {
                    base,
                    sub: None,
                    sup: arg,
                }
            } else {
                Node::Scripts {
                    base,
                    sub: arg,
                    sup: None,
                }
            }
        }
    };
    nodes.push(target);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::typst::lexer::tokenize;

    fn parse(source: &str) -> Result<Vec<Node>> {
        Parser::new(tokenize(source)?).parse()
    }

    fn ident(name: &str) -> Node {
        Node::Ident(name.to_string())
    }

    #[test]
    fn test_fraction_strips_parens() {
        let nodes = parse("(a + b)/2").unwrap();
        assert_eq!(
            nodes,
            vec![Node::Frac(
                Box::new(Node::Group(vec![ident("a"), Node::Punct('+'), ident("b")])),
                Box::new(Node::Number("2".into()))
            )]
        );
    }

    #[test]
    fn test_scripts_bind_tighter_than_slash() {
        let nodes = parse("x^2/y").unwrap();
        match &nodes[..] {
            [Node::Frac(num, den)] => {
                assert!(matches!(**num, Node::Scripts { .. }));
                assert_eq!(**den, ident("y"));
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_call_requires_adjacent_paren() {
        let call = parse("sqrt(x)").unwrap();
        assert!(matches!(&call[..], [Node::Call { name, .. }] if name == "sqrt"));

        let spaced = parse("sqrt (x)").unwrap();
        assert_eq!(spaced.len(), 2);
        assert_eq!(spaced[0], ident("sqrt"));

        let variable = parse("f(x)").unwrap();
        assert_eq!(variable[0], ident("f"));
    }

    #[test]
    fn test_matrix_arguments() {
        let nodes = parse(r#"mat(delim: "[", 1, 2; 3, 4)"#).unwrap();
        match &nodes[..] {
            [Node::Call { name, args }] => {
                assert_eq!(name, "mat");
                assert_eq!(args.named("delim"), Some(&[Node::Str("[".into())][..]));
                assert_eq!(args.rows.len(), 2);
                assert_eq!(
                    args.rows[1],
                    vec![vec![Node::Number("3".into())], vec![Node::Number("4".into())]]
                );
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_delimiter_fails() {
        assert!(parse("(a + b").is_err());
        assert!(parse("frac(1, 2").is_err());
    }

    #[test]
    fn test_stray_closer_is_literal() {
        assert_eq!(parse("a)").unwrap(), vec![ident("a"), Node::Punct(')')]);
    }

    #[test]
    fn test_deep_paren_nesting_fails_cleanly() {
        let n = 10_000;
        let source = format!("{}x{}", "(".repeat(n), ")".repeat(n));
        let err = parse(&source).unwrap_err();
        assert!(err.to_string().contains("nesting too deep"));
    }

    #[test]
    fn test_deep_call_nesting_fails_cleanly() {
        let n = 10_000;
        let source = format!("{}x{}", "sqrt(".repeat(n), ")".repeat(n));
        let err = parse(&source).unwrap_err();
        assert!(err.to_string().contains("nesting too deep"));
    }

    #[test]
    fn test_moderate_nesting_is_accepted() {
        let source = format!("{}x{}", "(".repeat(100), ")".repeat(100));
        assert!(parse(&source).is_ok());
    }
}
