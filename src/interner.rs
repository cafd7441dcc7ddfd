//! String interning.
//!
//! Names (type parameters, definitions, tuple element names) are interned
//! into lightweight `Atom` handles so that identity comparison is a u32
//! compare and type keys stay `Copy`-friendly.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::{Arc, RwLock};

/// An interned string handle. Equality is O(1).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Atom(pub u32);

impl Atom {
    /// Placeholder atom, never returned by interning.
    pub const NONE: Atom = Atom(u32::MAX);
}

/// Interning table for strings.
///
/// Thread-safe via `RwLock`; the solver only needs `&self` access while
/// building types.
pub struct StringInterner {
    map: RwLock<FxHashMap<Arc<str>, Atom>>,
    strings: RwLock<Vec<Arc<str>>>,
}

impl StringInterner {
    pub fn new() -> Self {
        StringInterner {
            map: RwLock::new(FxHashMap::default()),
            strings: RwLock::new(Vec::new()),
        }
    }

    /// Intern a string, returning its atom. Repeated calls with the same
    /// text return the same atom.
    pub fn intern(&self, text: &str) -> Atom {
        if let Some(&atom) = self.map.read().expect("interner lock poisoned").get(text) {
            return atom;
        }

        let mut map = self.map.write().expect("interner lock poisoned");
        // Re-check: another writer may have interned it between locks.
        if let Some(&atom) = map.get(text) {
            return atom;
        }

        let mut strings = self.strings.write().expect("interner lock poisoned");
        let arc: Arc<str> = Arc::from(text);
        let atom = Atom(strings.len() as u32);
        strings.push(arc.clone());
        map.insert(arc, atom);
        atom
    }

    /// Resolve an atom back to its text.
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        self.strings
            .read()
            .expect("interner lock poisoned")
            .get(atom.0 as usize)
            .cloned()
            .unwrap_or_else(|| Arc::from(""))
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
