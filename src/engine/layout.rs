//! Output Layout
//!
//! Both writers emit a flat list of pieces per sequence; this module decides
//! where spaces go between them.

use super::symbols::Class;

/// Spacing role of an emitted piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Atom,
    Bin,
    Rel,
    /// `+` or `-`, binary unless it opens an operand
    Sign,
    Open,
    Close,
    /// `,` `;` and friends, never preceded by a space
    Punct,
    /// `!` `'`, glued to what precedes them
    Postfix,
    /// Source whitespace, only emitted when spaces are kept
    RawSpace,
}

impl From<Class> for Kind {
    fn from(class: Class) -> Self {
        match class {
            Class::Bin => Kind::Bin,
            Class::Rel => Kind::Rel,
            Class::Open => Kind::Open,
            Class::Close => Kind::Close,
            Class::Ord | Class::Large | Class::Space => Kind::Atom,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub text: String,
    pub kind: Kind,
}

impl Piece {
    pub fn new(text: impl Into<String>, kind: Kind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    pub fn atom(text: impl Into<String>) -> Self {
        Self::new(text, Kind::Atom)
    }

    pub fn raw_space() -> Self {
        Self::new(" ", Kind::RawSpace)
    }

    fn is_paren_open(&self) -> bool {
        self.kind == Kind::Open && self.text == "("
    }
}

/// Kind for a single punctuation character.
pub fn char_kind(c: char) -> Kind {
    match c {
        '+' | '-' => Kind::Sign,
        '=' | '<' | '>' | ':' => Kind::Rel,
        '*' => Kind::Bin,
        '(' | '[' => Kind::Open,
        ')' | ']' => Kind::Close,
        ',' | ';' => Kind::Punct,
        '!' | '\'' | '.' => Kind::Postfix,
        _ => Kind::Atom,
    }
}

/// Joins pieces into one string.
///
/// With `keep_spaces` only source whitespace is reproduced, plus the minimum
/// separation needed to keep adjacent identifiers apart.
pub fn join(pieces: &[Piece], keep_spaces: bool) -> String {
    let mut out = String::new();
    let mut prev: Option<&Piece> = None;
    let mut prev_unary = false;
    let mut pending_space = false;

    for piece in pieces {
        if piece.kind == Kind::RawSpace {
            pending_space = prev.is_some();
            continue;
        }

        if let Some(last) = prev {
            let glue = if keep_spaces {
                pending_space || must_separate(&last.text, &piece.text)
            } else {
                wants_space(last, prev_unary, piece)
            };
            if glue {
                out.push(' ');
            }
        }

        let unary = piece.kind == Kind::Sign
            && prev.map_or(true, |p| {
                matches!(
                    p.kind,
                    Kind::Bin | Kind::Rel | Kind::Sign | Kind::Open | Kind::Punct
                )
            });

        out.push_str(&piece.text);
        prev = Some(piece);
        prev_unary = unary;
        pending_space = false;
    }

    out
}

fn wants_space(last: &Piece, last_unary: bool, next: &Piece) -> bool {
    // `\alpha` followed by `x` must not fuse into `\alphax`
    if ends_with_control_word(&last.text) && next.text.starts_with(char::is_alphabetic) {
        return true;
    }
    if last.kind == Kind::Open || last_unary {
        return false;
    }
    if matches!(next.kind, Kind::Close | Kind::Punct | Kind::Postfix) {
        return false;
    }
    if next.is_paren_open() && matches!(last.kind, Kind::Atom | Kind::Postfix | Kind::Close) {
        return false;
    }
    true
}

fn ends_with_control_word(text: &str) -> bool {
    let word = text.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    word.len() < text.len() && word.ends_with('\\')
}

fn must_separate(left: &str, right: &str) -> bool {
    match (left.chars().last(), right.chars().next()) {
        (Some(l), Some(r)) => {
            (l.is_alphabetic() && r.is_alphanumeric())
                || (l.is_ascii_digit() && r.is_ascii_digit())
                || (l == '\\' && r.is_alphabetic())
        }
        _ => false,
    }
}
