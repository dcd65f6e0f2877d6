//! Symbol kinds and the palette they are drawn from

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Index of a symbol in the machine's palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SymbolKind(pub u16);

impl SymbolKind {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The fixed set of distinct symbol kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolPalette {
    names: Vec<String>,
}

impl SymbolPalette {
    /// Create a palette from display names (asset labels).
    /// Callers validate that names are distinct and non-empty.
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Get the display name of a kind
    pub fn name(&self, kind: SymbolKind) -> Option<&str> {
        self.names.get(kind.index()).map(String::as_str)
    }

    /// Look up a kind by display name
    pub fn kind_of(&self, name: &str) -> Option<SymbolKind> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| SymbolKind(i as u16))
    }

    /// All kinds in palette order
    pub fn kinds(&self) -> impl Iterator<Item = SymbolKind> + '_ {
        (0..self.names.len()).map(|i| SymbolKind(i as u16))
    }

    /// Uniform draw over the palette
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> SymbolKind {
        if self.names.is_empty() {
            return SymbolKind(0);
        }
        SymbolKind(rng.random_range(0..self.names.len()) as u16)
    }
}
