//! Symbol Tables
//!
//! Static TeX <-> Typst lookup tables. The forward tables are compile-time
//! perfect hash maps; the reverse table is derived once on first use.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Spacing class of a symbol, used when joining output pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    /// Ordinary atom
    Ord,
    /// Binary operator (spaced on both sides)
    Bin,
    /// Relation (spaced on both sides)
    Rel,
    /// Large operator accepting limits
    Large,
    /// Opening delimiter
    Open,
    /// Closing delimiter
    Close,
    /// Horizontal space
    Space,
}

/// TeX command name (without backslash) -> (Typst name, class).
pub static TEX_SYMBOLS: phf::Map<&'static str, (&'static str, Class)> = phf::phf_map! {
    // Lowercase Greek
    "alpha" => ("alpha", Class::Ord),
    "beta" => ("beta", Class::Ord),
    "gamma" => ("gamma", Class::Ord),
    "delta" => ("delta", Class::Ord),
    "epsilon" => ("epsilon", Class::Ord),
    "varepsilon" => ("epsilon.alt", Class::Ord),
    "zeta" => ("zeta", Class::Ord),
    "eta" => ("eta", Class::Ord),
    "theta" => ("theta", Class::Ord),
    "vartheta" => ("theta.alt", Class::Ord),
    "iota" => ("iota", Class::Ord),
    "kappa" => ("kappa", Class::Ord),
    "varkappa" => ("kappa.alt", Class::Ord),
    "lambda" => ("lambda", Class::Ord),
    "mu" => ("mu", Class::Ord),
    "nu" => ("nu", Class::Ord),
    "xi" => ("xi", Class::Ord),
    "pi" => ("pi", Class::Ord),
    "varpi" => ("pi.alt", Class::Ord),
    "rho" => ("rho", Class::Ord),
    "varrho" => ("rho.alt", Class::Ord),
    "sigma" => ("sigma", Class::Ord),
    "varsigma" => ("sigma.alt", Class::Ord),
    "tau" => ("tau", Class::Ord),
    "upsilon" => ("upsilon", Class::Ord),
    "phi" => ("phi.alt", Class::Ord),
    "varphi" => ("phi", Class::Ord),
    "chi" => ("chi", Class::Ord),
    "psi" => ("psi", Class::Ord),
    "omega" => ("omega", Class::Ord),

    // Uppercase Greek
    "Gamma" => ("Gamma", Class::Ord),
    "Delta" => ("Delta", Class::Ord),
    "Theta" => ("Theta", Class::Ord),
    "Lambda" => ("Lambda", Class::Ord),
    "Xi" => ("Xi", Class::Ord),
    "Pi" => ("Pi", Class::Ord),
    "Sigma" => ("Sigma", Class::Ord),
    "Upsilon" => ("Upsilon", Class::Ord),
    "Phi" => ("Phi", Class::Ord),
    "Psi" => ("Psi", Class::Ord),
    "Omega" => ("Omega", Class::Ord),

    // Miscellaneous ordinary symbols
    "infty" => ("infinity", Class::Ord),
    "partial" => ("diff", Class::Ord),
    "nabla" => ("nabla", Class::Ord),
    "forall" => ("forall", Class::Ord),
    "exists" => ("exists", Class::Ord),
    "nexists" => ("exists.not", Class::Ord),
    "emptyset" => ("emptyset", Class::Ord),
    "hbar" => ("planck.reduce", Class::Ord),
    "ell" => ("ell", Class::Ord),
    "aleph" => ("aleph", Class::Ord),
    "Re" => ("Re", Class::Ord),
    "Im" => ("Im", Class::Ord),
    "angle" => ("angle", Class::Ord),
    "prime" => ("prime", Class::Ord),
    "top" => ("top", Class::Ord),
    "bot" => ("bot", Class::Ord),
    "cdots" => ("dots.c", Class::Ord),
    "ldots" => ("dots.h", Class::Ord),
    "dots" => ("dots.h", Class::Ord),
    "vdots" => ("dots.v", Class::Ord),
    "ddots" => ("dots.down", Class::Ord),
    "neg" => ("not", Class::Ord),
    "lnot" => ("not", Class::Ord),
    "triangle" => ("triangle.t", Class::Ord),
    "square" => ("square", Class::Ord),
    "vert" => ("|", Class::Ord),
    "Vert" => ("bar.v.double", Class::Ord),
    "|" => ("bar.v.double", Class::Ord),
    "{" => ("{", Class::Open),
    "}" => ("}", Class::Close),
    "lbrace" => ("{", Class::Open),
    "rbrace" => ("}", Class::Close),
    "langle" => ("angle.l", Class::Open),
    "rangle" => ("angle.r", Class::Close),
    "lfloor" => ("floor.l", Class::Open),
    "rfloor" => ("floor.r", Class::Close),
    "lceil" => ("ceil.l", Class::Open),
    "rceil" => ("ceil.r", Class::Close),

    // Binary operators
    "pm" => ("plus.minus", Class::Bin),
    "mp" => ("minus.plus", Class::Bin),
    "times" => ("times", Class::Bin),
    "div" => ("div", Class::Bin),
    "cdot" => ("dot.op", Class::Bin),
    "ast" => ("ast", Class::Bin),
    "star" => ("star", Class::Bin),
    "circ" => ("compose", Class::Bin),
    "bullet" => ("bullet", Class::Bin),
    "cap" => ("sect", Class::Bin),
    "cup" => ("union", Class::Bin),
    "wedge" => ("and", Class::Bin),
    "land" => ("and", Class::Bin),
    "vee" => ("or", Class::Bin),
    "lor" => ("or", Class::Bin),
    "setminus" => ("without", Class::Bin),
    "oplus" => ("plus.circle", Class::Bin),
    "otimes" => ("times.circle", Class::Bin),
    "odot" => ("dot.circle", Class::Bin),

    // Relations and arrows
    "leq" => ("lt.eq", Class::Rel),
    "le" => ("lt.eq", Class::Rel),
    "geq" => ("gt.eq", Class::Rel),
    "ge" => ("gt.eq", Class::Rel),
    "neq" => ("eq.not", Class::Rel),
    "ne" => ("eq.not", Class::Rel),
    "approx" => ("approx", Class::Rel),
    "equiv" => ("equiv", Class::Rel),
    "sim" => ("tilde.op", Class::Rel),
    "simeq" => ("tilde.eq", Class::Rel),
    "cong" => ("tilde.equiv", Class::Rel),
    "propto" => ("prop", Class::Rel),
    "ll" => ("lt.double", Class::Rel),
    "gg" => ("gt.double", Class::Rel),
    "in" => ("in", Class::Rel),
    "notin" => ("in.not", Class::Rel),
    "ni" => ("in.rev", Class::Rel),
    "subset" => ("subset", Class::Rel),
    "supset" => ("supset", Class::Rel),
    "subseteq" => ("subset.eq", Class::Rel),
    "supseteq" => ("supset.eq", Class::Rel),
    "perp" => ("perp", Class::Rel),
    "parallel" => ("parallel", Class::Rel),
    "mid" => ("divides", Class::Rel),
    "to" => ("arrow.r", Class::Rel),
    "rightarrow" => ("arrow.r", Class::Rel),
    "gets" => ("arrow.l", Class::Rel),
    "leftarrow" => ("arrow.l", Class::Rel),
    "leftrightarrow" => ("arrow.l.r", Class::Rel),
    "Rightarrow" => ("arrow.r.double", Class::Rel),
    "Leftarrow" => ("arrow.l.double", Class::Rel),
    "Leftrightarrow" => ("arrow.l.r.double", Class::Rel),
    "implies" => ("arrow.r.double.long", Class::Rel),
    "iff" => ("arrow.l.r.double.long", Class::Rel),
    "mapsto" => ("arrow.r.bar", Class::Rel),
    "longrightarrow" => ("arrow.r.long", Class::Rel),
    "longleftarrow" => ("arrow.l.long", Class::Rel),
    "uparrow" => ("arrow.t", Class::Rel),
    "downarrow" => ("arrow.b", Class::Rel),

    // Large operators
    "int" => ("integral", Class::Large),
    "iint" => ("integral.double", Class::Large),
    "iiint" => ("integral.triple", Class::Large),
    "oint" => ("integral.cont", Class::Large),
    "sum" => ("sum", Class::Large),
    "prod" => ("product", Class::Large),
    "coprod" => ("product.co", Class::Large),
    "bigcup" => ("union.big", Class::Large),
    "bigcap" => ("sect.big", Class::Large),
    "bigoplus" => ("plus.circle.big", Class::Large),
    "bigotimes" => ("times.circle.big", Class::Large),

    // Operator names, identical in both grammars
    "sin" => ("sin", Class::Ord),
    "cos" => ("cos", Class::Ord),
    "tan" => ("tan", Class::Ord),
    "cot" => ("cot", Class::Ord),
    "sec" => ("sec", Class::Ord),
    "csc" => ("csc", Class::Ord),
    "arcsin" => ("arcsin", Class::Ord),
    "arccos" => ("arccos", Class::Ord),
    "arctan" => ("arctan", Class::Ord),
    "sinh" => ("sinh", Class::Ord),
    "cosh" => ("cosh", Class::Ord),
    "tanh" => ("tanh", Class::Ord),
    "log" => ("log", Class::Ord),
    "ln" => ("ln", Class::Ord),
    "exp" => ("exp", Class::Ord),
    "lim" => ("lim", Class::Large),
    "limsup" => ("limsup", Class::Large),
    "liminf" => ("liminf", Class::Large),
    "max" => ("max", Class::Large),
    "min" => ("min", Class::Large),
    "sup" => ("sup", Class::Large),
    "inf" => ("inf", Class::Large),
    "det" => ("det", Class::Ord),
    "gcd" => ("gcd", Class::Ord),
    "deg" => ("deg", Class::Ord),
    "dim" => ("dim", Class::Ord),
    "ker" => ("ker", Class::Ord),
    "arg" => ("arg", Class::Ord),
    "Pr" => ("Pr", Class::Ord),

    // Spacing
    "," => ("thin", Class::Space),
    ":" => ("med", Class::Space),
    ">" => ("med", Class::Space),
    ";" => ("thick", Class::Space),
    " " => ("space", Class::Space),
    "quad" => ("quad", Class::Space),
    "qquad" => ("wide", Class::Space),
};

/// TeX command -> Typst shorthand, used when shorthands are preferred.
pub static SHORTHANDS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "to" => "->",
    "rightarrow" => "->",
    "gets" => "<-",
    "leftarrow" => "<-",
    "leftrightarrow" => "<->",
    "Rightarrow" => "=>",
    "Leftrightarrow" => "<=>",
    "implies" => "==>",
    "iff" => "<==>",
    "mapsto" => "|->",
    "leq" => "<=",
    "le" => "<=",
    "geq" => ">=",
    "ge" => ">=",
    "neq" => "!=",
    "ne" => "!=",
    "ll" => "<<",
    "gg" => ">>",
    "ldots" => "...",
    "dots" => "...",
    "ast" => "*",
};

/// Typst shorthand -> TeX source, longest shorthands listed first.
pub static TYPST_SHORTHANDS: &[(&str, &str, Class)] = &[
    ("<==>", "\\iff", Class::Rel),
    ("==>", "\\implies", Class::Rel),
    ("<=>", "\\Leftrightarrow", Class::Rel),
    ("<->", "\\leftrightarrow", Class::Rel),
    ("|->", "\\mapsto", Class::Rel),
    ("...", "\\dots", Class::Ord),
    ("->", "\\to", Class::Rel),
    ("<-", "\\gets", Class::Rel),
    ("=>", "\\Rightarrow", Class::Rel),
    ("<=", "\\leq", Class::Rel),
    (">=", "\\geq", Class::Rel),
    ("!=", "\\neq", Class::Rel),
    ("<<", "\\ll", Class::Rel),
    (">>", "\\gg", Class::Rel),
    (":=", ":=", Class::Rel),
    ("||", "\\|", Class::Ord),
];

/// Typst names reachable from several TeX aliases, pinned to one spelling.
static REVERSE_PREFERRED: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "lt.eq" => "leq",
    "gt.eq" => "geq",
    "eq.not" => "neq",
    "arrow.r" => "rightarrow",
    "arrow.l" => "leftarrow",
    "and" => "wedge",
    "or" => "vee",
    "not" => "neg",
    "dots.h" => "ldots",
    "med" => ":",
    "bar.v.double" => "|",
    "oo" => "infty",
    "{" => "{",
    "}" => "}",
};

static TYPST_TO_TEX: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::with_capacity(TEX_SYMBOLS.len());
    for (tex, (typst, _)) in TEX_SYMBOLS.entries() {
        map.entry(*typst).or_insert(*tex);
    }
    for (typst, tex) in REVERSE_PREFERRED.entries() {
        map.insert(*typst, *tex);
    }
    map
});

/// Looks up a TeX command (without backslash).
pub fn tex_symbol(name: &str) -> Option<(&'static str, Class)> {
    TEX_SYMBOLS.get(name).copied()
}

/// Looks up the TeX command (without backslash) for a Typst symbol name.
pub fn typst_symbol(name: &str) -> Option<(&'static str, Class)> {
    let tex = TYPST_TO_TEX.get(name).copied()?;
    let class = TEX_SYMBOLS.get(tex).map(|(_, class)| *class).unwrap_or(Class::Ord);
    Some((tex, class))
}
