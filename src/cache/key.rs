//! Option Normalizer
//!
//! Turns a sparse option set into a canonical, hashable cache key.

use std::fmt::Debug;
use std::hash::Hash;

use crate::engine::{BackwardOptions, ForwardOptions};

// == Normalize Trait ==
/// Canonicalizes an option set.
///
/// Two option sets produce equal keys exactly when they are semantically
/// equal, however the caller built them.
pub trait Normalize {
    type Key: Clone + Debug + Eq + Hash;

    fn normalize(&self) -> Self::Key;
}

// == Forward Key ==
/// Normalized [`ForwardOptions`].
///
/// Flags are held in a fixed field order. Macros are flattened into pairs
/// sorted by trigger; `None` (no mapping) and `Some(vec![])` (empty mapping)
/// stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForwardKey {
    flags: [Option<bool>; 6],
    macros: Option<Vec<(String, String)>>,
}

impl Normalize for ForwardOptions {
    type Key = ForwardKey;

    fn normalize(&self) -> ForwardKey {
        let macros = self.custom_macros.as_ref().map(|map| {
            let mut pairs: Vec<(String, String)> = map
                .iter()
                .map(|(trigger, expansion)| (trigger.clone(), expansion.clone()))
                .collect();
            pairs.sort_unstable();
            pairs
        });

        ForwardKey {
            flags: [
                self.non_strict,
                self.prefer_shorthands,
                self.keep_spaces,
                self.frac_to_slash,
                self.infty_to_oo,
                self.optimize,
            ],
            macros,
        }
    }
}

// == Backward Key ==
/// Normalized [`BackwardOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackwardKey {
    block_math_mode: Option<bool>,
}

impl Normalize for BackwardOptions {
    type Key = BackwardKey;

    fn normalize(&self) -> BackwardKey {
        BackwardKey {
            block_math_mode: self.block_math_mode,
        }
    }
}
