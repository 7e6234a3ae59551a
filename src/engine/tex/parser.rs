//! TeX parser producing a small math AST.

use crate::engine::symbols::{tex_symbol, Class};
use crate::engine::{nesting_too_deep, MAX_NESTING_DEPTH};
use crate::error::{ConvertError, Result};

use super::lexer::Token;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Letter(char),
    Number(String),
    Punct(char),
    Symbol {
        command: String,
        typst: &'static str,
        class: Class,
    },
    /// Command with no known meaning, kept by name in non-strict mode
    Unknown(String),
    Group(Vec<Node>),
    Frac(Box<Node>, Box<Node>),
    Binom(Box<Node>, Box<Node>),
    Sqrt {
        index: Option<Box<Node>>,
        radicand: Box<Node>,
    },
    Scripts {
        base: Option<Box<Node>>,
        sub: Option<Box<Node>>,
        sup: Option<Box<Node>>,
    },
    Font {
        func: &'static str,
        body: Box<Node>,
    },
    Accent {
        func: &'static str,
        body: Box<Node>,
    },
    Text(String),
    OperatorName(String),
    LeftRight {
        open: String,
        close: String,
        body: Vec<Node>,
    },
    Matrix {
        delim: Option<&'static str>,
        rows: Vec<Vec<Vec<Node>>>,
    },
    Cases(Vec<Vec<Vec<Node>>>),
    Aligned(Vec<Vec<Vec<Node>>>),
    Style {
        display: bool,
        body: Vec<Node>,
    },
    Align,
    Linebreak,
    RawSpace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    End,
    Brace,
    Bracket,
    Right,
    Env,
}

/// Recursive-descent parser over a token stream.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    non_strict: bool,
    keep_spaces: bool,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, non_strict: bool, keep_spaces: bool) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            non_strict,
            keep_spaces,
        }
    }

    /// Parses the whole input as one sequence.
    pub fn parse(mut self) -> Result<Vec<Node>> {
        let mut nodes = self.parse_sequence(Stop::End)?;
        while nodes.last() == Some(&Node::RawSpace) {
            nodes.pop();
        }
        if nodes.first() == Some(&Node::RawSpace) {
            nodes.remove(0);
        }
        Ok(nodes)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn skip_whitespace(&mut self) {
        while self.peek() == Some(&Token::Whitespace) {
            self.pos += 1;
        }
    }

    /// Runs `f` one nesting level deeper, failing past [`MAX_NESTING_DEPTH`].
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(nesting_too_deep());
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn parse_sequence(&mut self, stop: Stop) -> Result<Vec<Node>> {
        self.nested(|parser| parser.parse_sequence_inner(stop))
    }

    fn parse_sequence_inner(&mut self, stop: Stop) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();

        loop {
            let Some(token) = self.peek().cloned() else {
                return match stop {
                    Stop::End => Ok(nodes),
                    Stop::Brace => Err(ConvertError::conversion("missing '}'")),
                    Stop::Bracket => Err(ConvertError::conversion("missing ']'")),
                    Stop::Right => Err(ConvertError::conversion("missing \\right")),
                    Stop::Env => Err(ConvertError::conversion("missing \\end")),
                };
            };

            match token {
                Token::CloseBrace => {
                    if stop == Stop::Brace {
                        self.pos += 1;
                        return Ok(nodes);
                    }
                    return Err(ConvertError::conversion("unexpected '}'"));
                }
                Token::Punct(']') if stop == Stop::Bracket => {
                    self.pos += 1;
                    return Ok(nodes);
                }
                Token::Ampersand if stop == Stop::Env => return Ok(nodes),
                Token::Command(ref name) if stop == Stop::Env && (name == "\\" || name == "end") => {
                    return Ok(nodes);
                }
                Token::Command(ref name) if name == "right" => {
                    if stop == Stop::Right {
                        return Ok(nodes);
                    }
                    return Err(ConvertError::conversion("\\right without matching \\left"));
                }
                Token::Command(ref name) if name == "end" => {
                    return Err(ConvertError::conversion("\\end without matching \\begin"));
                }
                Token::Whitespace => {
                    self.pos += 1;
                    if self.keep_spaces && !nodes.is_empty() {
                        nodes.push(Node::RawSpace);
                    }
                }
                Token::Caret | Token::Underscore => {
                    self.pos += 1;
                    let is_sup = token == Token::Caret;
                    let arg = self.parse_argument(if is_sup { "^" } else { "_" })?;
                    attach_script(&mut nodes, is_sup, arg)?;
                }
                Token::Command(ref name) => match name.as_str() {
                    "limits" | "nolimits" | "!" => self.pos += 1,
                    "displaystyle" | "textstyle" => {
                        self.pos += 1;
                        let body = self.parse_sequence(stop)?;
                        nodes.push(Node::Style {
                            display: name == "displaystyle",
                            body,
                        });
                        return Ok(nodes);
                    }
                    "rm" | "bf" | "cal" | "it" | "sf" | "tt" => {
                        self.pos += 1;
                        let func = font_switch(name);
                        let body = self.parse_sequence(stop)?;
                        nodes.push(Node::Font {
                            func,
                            body: Box::new(Node::Group(body)),
                        });
                        return Ok(nodes);
                    }
                    _ => {
                        self.pos += 1;
                        let node = self.parse_command(name)?;
                        nodes.push(node);
                    }
                },
                _ => {
                    self.pos += 1;
                    let node = self.parse_atom(token)?;
                    nodes.push(node);
                }
            }
        }
    }

    fn parse_atom(&mut self, token: Token) -> Result<Node> {
        match token {
            Token::Letter(c) => Ok(Node::Letter(c)),
            Token::Digit(c) => Ok(self.parse_number(c)),
            Token::Punct(c) => Ok(Node::Punct(c)),
            Token::OpenBrace => Ok(Node::Group(self.parse_sequence(Stop::Brace)?)),
            Token::Ampersand => Ok(Node::Align),
            Token::Command(name) => self.parse_command(&name),
            Token::CloseBrace | Token::Caret | Token::Underscore | Token::Whitespace => {
                Err(ConvertError::conversion("unexpected token"))
            }
        }
    }

    fn parse_number(&mut self, first: char) -> Node {
        let mut number = String::from(first);
        loop {
            let ahead = (self.peek().cloned(), self.tokens.get(self.pos + 1).cloned());
            match ahead {
                (Some(Token::Digit(d)), _) => {
                    number.push(d);
                    self.pos += 1;
                }
                (Some(Token::Punct('.')), Some(Token::Digit(d))) => {
                    number.push('.');
                    number.push(d);
                    self.pos += 2;
                }
                _ => break,
            }
        }
        Node::Number(number)
    }

    /// Reads one macro argument: a braced group or a single token.
    fn parse_argument(&mut self, command: &str) -> Result<Node> {
        self.skip_whitespace();
        let missing = || ConvertError::conversion(format!("missing argument for {}", command));
        match self.next().ok_or_else(missing)? {
            Token::OpenBrace => Ok(Node::Group(self.parse_sequence(Stop::Brace)?)),
            Token::Letter(c) => Ok(Node::Letter(c)),
            Token::Digit(c) => Ok(Node::Number(c.to_string())),
            Token::Punct(c) => Ok(Node::Punct(c)),
            Token::Command(name) => self.parse_command(&name),
            _ => Err(missing()),
        }
    }

    fn parse_command(&mut self, name: &str) -> Result<Node> {
        self.nested(|parser| parser.parse_command_inner(name))
    }

    fn parse_command_inner(&mut self, name: &str) -> Result<Node> {
        match name {
            "frac" | "dfrac" | "tfrac" | "cfrac" => {
                let num = self.parse_argument("\\frac")?;
                let den = self.parse_argument("\\frac")?;
                Ok(Node::Frac(Box::new(num), Box::new(den)))
            }
            "binom" | "dbinom" | "tbinom" => {
                let n = self.parse_argument("\\binom")?;
                let k = self.parse_argument("\\binom")?;
                Ok(Node::Binom(Box::new(n), Box::new(k)))
            }
            "sqrt" => {
                self.skip_whitespace();
                let index = if self.peek() == Some(&Token::Punct('[')) {
                    self.pos += 1;
                    Some(Box::new(Node::Group(self.parse_sequence(Stop::Bracket)?)))
                } else {
                    None
                };
                let radicand = Box::new(self.parse_argument("\\sqrt")?);
                Ok(Node::Sqrt { index, radicand })
            }
            "text" | "textrm" | "textnormal" | "mbox" | "textit" | "textbf" => {
                Ok(Node::Text(self.read_raw_group(name)?))
            }
            "operatorname" => Ok(Node::OperatorName(self.read_raw_group(name)?)),
            "left" => {
                let open = self.parse_delimiter("\\left")?;
                let body = self.parse_sequence(Stop::Right)?;
                // parse_sequence only returns here when positioned on \right
                self.pos += 1;
                let close = self.parse_delimiter("\\right")?;
                Ok(Node::LeftRight { open, close, body })
            }
            "begin" => self.parse_environment(),
            "\\" => Ok(Node::Linebreak),
            "$" | "%" | "&" | "_" | "#" => Ok(Node::Punct(name.chars().next().unwrap_or('?'))),
            "displaystyle" | "textstyle" | "limits" | "nolimits" | "!" => {
                Ok(Node::Group(Vec::new()))
            }
            _ => {
                if let Some(func) = font_command(name) {
                    let body = self.parse_argument(&format!("\\{}", name))?;
                    return Ok(Node::Font {
                        func,
                        body: Box::new(body),
                    });
                }
                if let Some(func) = accent_command(name) {
                    let body = self.parse_argument(&format!("\\{}", name))?;
                    return Ok(Node::Accent {
                        func,
                        body: Box::new(body),
                    });
                }
                if let Some((typst, class)) = tex_symbol(name) {
                    return Ok(Node::Symbol {
                        command: name.to_string(),
                        typst,
                        class,
                    });
                }
                if self.non_strict {
                    Ok(Node::Unknown(name.to_string()))
                } else {
                    Err(ConvertError::conversion(format!(
                        "unknown command \\{}",
                        name
                    )))
                }
            }
        }
    }

    fn parse_delimiter(&mut self, after: &str) -> Result<String> {
        self.skip_whitespace();
        let missing = || ConvertError::conversion(format!("missing delimiter after {}", after));
        match self.next().ok_or_else(missing)? {
            Token::Punct('.') => Ok(String::new()),
            Token::Punct(c) => Ok(c.to_string()),
            Token::Command(name) => match name.as_str() {
                "lvert" | "rvert" | "vert" => Ok("|".to_string()),
                "lVert" | "rVert" | "Vert" | "|" => Ok("bar.v.double".to_string()),
                _ => match tex_symbol(&name) {
                    Some((typst, _)) => Ok(typst.to_string()),
                    None => Err(missing()),
                },
            },
            _ => Err(missing()),
        }
    }

    /// Reads a braced argument verbatim, as used by `\text`.
    fn read_raw_group(&mut self, command: &str) -> Result<String> {
        self.skip_whitespace();
        if self.next() != Some(Token::OpenBrace) {
            return Err(ConvertError::conversion(format!(
                "missing argument for \\{}",
                command
            )));
        }
        let mut text = String::new();
        let mut depth = 0usize;
        loop {
            match self.next() {
                None => return Err(ConvertError::conversion("missing '}'")),
                Some(Token::CloseBrace) if depth == 0 => return Ok(text),
                Some(Token::CloseBrace) => {
                    depth -= 1;
                    text.push('}');
                }
                Some(Token::OpenBrace) => {
                    depth += 1;
                    text.push('{');
                }
                Some(Token::Letter(c)) | Some(Token::Digit(c)) | Some(Token::Punct(c)) => {
                    text.push(c)
                }
                Some(Token::Whitespace) => text.push(' '),
                Some(Token::Caret) => text.push('^'),
                Some(Token::Underscore) => text.push('_'),
                Some(Token::Ampersand) => text.push('&'),
                Some(Token::Command(name)) => {
                    let mut chars = name.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) if !c.is_ascii_alphabetic() => text.push(c),
                        _ => {
                            text.push('\\');
                            text.push_str(&name);
                        }
                    }
                }
            }
        }
    }

    fn parse_environment(&mut self) -> Result<Node> {
        let name = self.read_raw_group("begin")?;
        let delim = match name.as_str() {
            "matrix" => Some(None),
            "pmatrix" => Some(Some("(")),
            "bmatrix" => Some(Some("[")),
            "Bmatrix" => Some(Some("{")),
            "vmatrix" => Some(Some("|")),
            "Vmatrix" => Some(Some("||")),
            _ => None,
        };

        let known = delim.is_some() || name == "cases" || name == "aligned";
        if !known {
            return Err(ConvertError::conversion(format!(
                "unsupported environment '{}'",
                name
            )));
        }

        let rows = self.parse_rows(&name)?;
        Ok(match (delim, name.as_str()) {
            (Some(delim), _) => Node::Matrix { delim, rows },
            (None, "cases") => Node::Cases(rows),
            _ => Node::Aligned(rows),
        })
    }

    fn parse_rows(&mut self, env: &str) -> Result<Vec<Vec<Vec<Node>>>> {
        let mut rows = Vec::new();
        let mut row = Vec::new();

        loop {
            let cell = trim_spaces(self.parse_sequence(Stop::Env)?);
            match self.next() {
                Some(Token::Ampersand) => row.push(cell),
                Some(Token::Command(name)) if name == "\\" => {
                    row.push(cell);
                    rows.push(std::mem::take(&mut row));
                }
                Some(Token::Command(name)) if name == "end" => {
                    let closing = self.read_raw_group("end")?;
                    if closing != env {
                        return Err(ConvertError::conversion(format!(
                            "\\begin{{{}}} closed by \\end{{{}}}",
                            env, closing
                        )));
                    }
                    // A trailing \\ leaves an empty last row
                    if !(cell.is_empty() && row.is_empty() && !rows.is_empty()) {
                        row.push(cell);
                        rows.push(row);
                    }
                    return Ok(rows);
                }
                _ => return Err(ConvertError::conversion(format!("missing \\end{{{}}}", env))),
            }
        }
    }
}

fn trim_spaces(mut nodes: Vec<Node>) -> Vec<Node> {
    while nodes.last() == Some(&Node::RawSpace) {
        nodes.pop();
    }
    nodes
}

fn attach_script(nodes: &mut Vec<Node>, is_sup: bool, arg: Node) -> Result<()> {
    while nodes.last() == Some(&Node::RawSpace) {
        nodes.pop();
    }

    let target = match nodes.pop() {
        Some(Node::Scripts { base, sub, sup }) => {
            let (sub, sup) = match (is_sup, sub, sup) {
                (true, sub, None) => (sub, Some(Box::new(arg))),
                (false, None, sup) => (Some(Box::new(arg)), sup),
                (true, _, Some(_)) => return Err(ConvertError::conversion("double superscript")),
                (false, Some(_), _) => return Err(ConvertError::conversion("double subscript")),
            };
            Node::Scripts { base, sub, sup }
        }
        base => {
            let base = base.map(Box::new);
            if is_sup {
                Node::Scripts {
                    base,
                    sub: None,
                    sup: Some(Box::new(arg)),
                }
            } else {
                Node::Scripts {
                    base,
                    sub: Some(Box::new(arg)),
                    sup: None,
                }
            }
        }
    };
    nodes.push(target);
    Ok(())
}

fn font_command(name: &str) -> Option<&'static str> {
    match name {
        "mathbf" | "boldsymbol" | "bm" => Some("bold"),
        "mathrm" => Some("upright"),
        "mathit" => Some("italic"),
        "mathbb" => Some("bb"),
        "mathcal" => Some("cal"),
        "mathfrak" => Some("frak"),
        "mathsf" => Some("sans"),
        "mathtt" => Some("mono"),
        _ => None,
    }
}

fn font_switch(name: &str) -> &'static str {
    match name {
        "bf" => "bold",
        "cal" => "cal",
        "it" => "italic",
        "sf" => "sans",
        "tt" => "mono",
        _ => "upright",
    }
}

fn accent_command(name: &str) -> Option<&'static str> {
    match name {
        "hat" | "widehat" => Some("hat"),
        "tilde" | "widetilde" => Some("tilde"),
        "bar" => Some("macron"),
        "overline" => Some("overline"),
        "underline" => Some("underline"),
        "vec" => Some("arrow"),
        "dot" => Some("dot"),
        "ddot" => Some("dot.double"),
        "acute" => Some("acute"),
        "grave" => Some("grave"),
        "breve" => Some("breve"),
        "check" => Some("caron"),
        _ => None,
    }
}
