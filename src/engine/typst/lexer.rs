//! Typst math tokenizer.

use crate::engine::symbols::{Class, TYPST_SHORTHANDS};
use crate::error::{ConvertError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Letter run, possibly with `.modifier` suffixes
    Ident(String),
    Number(String),
    Str(String),
    Shorthand { tex: &'static str, class: Class },
    Punct(char),
    /// `\` followed by a non-space character
    Escaped(char),
    /// `#name`, only `#none` has a meaning
    Hash(String),
    Slash,
    Caret,
    Underscore,
    Ampersand,
    Linebreak,
    Whitespace,
}

/// Splits Typst math source into tokens.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if let Some((len, tex, class)) = match_shorthand(&chars[i..]) {
            tokens.push(Token::Shorthand { tex, class });
            i += len;
            continue;
        }

        match c {
            c if c.is_whitespace() => {
                while i < chars.len() && chars[i].is_whitespace() {
                    i += 1;
                }
                tokens.push(Token::Whitespace);
            }
            c if c.is_alphabetic() => {
                let start = i;
                i = letters_end(&chars, i);
                // Modifiers: `arrow.r.double`
                while i + 1 < chars.len() && chars[i] == '.' && chars[i + 1].is_alphabetic() {
                    i = letters_end(&chars, i + 1);
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                if i + 1 < chars.len() && chars[i] == '.' && chars[i + 1].is_ascii_digit() {
                    i += 1;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                tokens.push(Token::Number(chars[start..i].iter().collect()));
            }
            '"' => {
                let (text, next) = read_string(&chars, i + 1)?;
                tokens.push(Token::Str(text));
                i = next;
            }
            '\\' => {
                match chars.get(i + 1) {
                    Some(&next) if !next.is_whitespace() => {
                        tokens.push(Token::Escaped(next));
                        i += 2;
                    }
                    _ => {
                        tokens.push(Token::Linebreak);
                        i += 1;
                    }
                }
            }
            '#' => {
                let start = i + 1;
                let end = letters_end(&chars, start);
                if end == start {
                    return Err(ConvertError::conversion(
                        "code expressions are not supported in math",
                    ));
                }
                tokens.push(Token::Hash(chars[start..end].iter().collect()));
                i = end;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Caret);
                i += 1;
            }
            '_' => {
                tokens.push(Token::Underscore);
                i += 1;
            }
            '&' => {
                tokens.push(Token::Ampersand);
                i += 1;
            }
            '$' => {
                return Err(ConvertError::conversion("unexpected '$' inside math"));
            }
            c => {
                tokens.push(Token::Punct(c));
                i += 1;
            }
        }
    }

    Ok(tokens)
}

fn letters_end(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && chars[i].is_alphabetic() {
        i += 1;
    }
    i
}

fn match_shorthand(rest: &[char]) -> Option<(usize, &'static str, Class)> {
    TYPST_SHORTHANDS.iter().find_map(|(short, tex, class)| {
        let len = short.chars().count();
        let matches = rest.len() >= len && rest.iter().zip(short.chars()).all(|(a, b)| *a == b);
        matches.then_some((len, *tex, *class))
    })
}

fn read_string(chars: &[char], mut i: usize) -> Result<(String, usize)> {
    let mut text = String::new();
    while i < chars.len() {
        match chars[i] {
            '"' => return Ok((text, i + 1)),
            '\\' if i + 1 < chars.len() => {
                text.push(chars[i + 1]);
                i += 2;
            }
            c => {
                text.push(c);
                i += 1;
            }
        }
    }
    Err(ConvertError::conversion("unterminated string"))
}
