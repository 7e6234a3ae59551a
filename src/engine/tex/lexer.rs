//! TeX tokenizer with custom macro expansion.

use std::collections::HashMap;

use crate::error::{ConvertError, Result};

/// Deepest nesting of macro expansions before giving up.
pub const MAX_MACRO_DEPTH: usize = 32;

/// Ceiling on tokens emitted plus macro expansions performed for one input.
pub const MAX_EXPANSION_STEPS: usize = 1 << 18;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Control sequence, stored without the backslash
    Command(String),
    Letter(char),
    Digit(char),
    Punct(char),
    OpenBrace,
    CloseBrace,
    Caret,
    Underscore,
    Ampersand,
    Whitespace,
}

/// Splits `source` into tokens, replacing macro triggers with their expansions.
pub fn tokenize(source: &str, macros: Option<&HashMap<String, String>>) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut expansions = 0;
    tokenize_into(source, macros, 0, &mut tokens, &mut expansions)?;
    Ok(tokens)
}

fn tokenize_into(
    source: &str,
    macros: Option<&HashMap<String, String>>,
    depth: usize,
    out: &mut Vec<Token>,
    expansions: &mut usize,
) -> Result<()> {
    if depth > MAX_MACRO_DEPTH {
        return Err(ConvertError::conversion(format!(
            "macro expansion exceeded depth {}",
            MAX_MACRO_DEPTH
        )));
    }

    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let first = chars.next().ok_or_else(|| {
                    ConvertError::conversion("unexpected end of input after '\\'")
                })?;
                let name = if first.is_ascii_alphabetic() {
                    let mut name = String::from(first);
                    while let Some(&next) = chars.peek() {
                        if next.is_ascii_alphabetic() {
                            name.push(next);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    // Spaces after a control word are not significant
                    while chars.peek().is_some_and(|c| c.is_whitespace()) {
                        chars.next();
                    }
                    name
                } else {
                    first.to_string()
                };

                match expansion_for(&name, macros) {
                    Some(body) => {
                        *expansions += 1;
                        check_budget(out.len(), *expansions)?;
                        tokenize_into(body, macros, depth + 1, out, expansions)?;
                    }
                    None => out.push(Token::Command(name)),
                }
            }
            '%' => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        break;
                    }
                }
            }
            '{' => out.push(Token::OpenBrace),
            '}' => out.push(Token::CloseBrace),
            '^' => out.push(Token::Caret),
            '_' => out.push(Token::Underscore),
            '&' => out.push(Token::Ampersand),
            '~' => out.push(Token::Command(" ".to_string())),
            c if c.is_whitespace() => {
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
                if out.last() != Some(&Token::Whitespace) {
                    out.push(Token::Whitespace);
                }
            }
            c if c.is_ascii_digit() => out.push(Token::Digit(c)),
            c if c.is_alphabetic() => out.push(Token::Letter(c)),
            c => out.push(Token::Punct(c)),
        }
        if depth > 0 {
            check_budget(out.len(), *expansions)?;
        }
    }
    Ok(())
}

fn check_budget(tokens: usize, expansions: usize) -> Result<()> {
    if tokens + expansions > MAX_EXPANSION_STEPS {
        return Err(ConvertError::conversion(format!(
            "macro expansion exceeded {} steps",
            MAX_EXPANSION_STEPS
        )));
    }
    Ok(())
}

/// Triggers may be written with or without their leading backslash.
fn expansion_for<'a>(name: &str, macros: Option<&'a HashMap<String, String>>) -> Option<&'a str> {
    let macros = macros?;
    macros
        .get(&format!("\\{}", name))
        .or_else(|| macros.get(name))
        .map(String::as_str)
}
