use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents the value stored in one canvas cell.
///
/// Non-negative values are concrete tiles; their meaning comes from the tables
/// in this crate, never from the magnitude of the number. Negative values are
/// reserved markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct TileId(pub i32);

impl TileId {
    /// No tile. Writing it during normal placement is a no-op.
    pub const EMPTY: Self = Self(-1);
    /// Explicit instruction to erase whatever occupies a cell.
    pub const CLEAR_MARK: Self = Self(-2);
    /// Reserved for snapshot replay. Never a concrete tile.
    pub const UNDO_WILDCARD: Self = Self(-3);

    /// True for ids that name a real tile in the tileset.
    #[inline]
    pub const fn is_concrete(self) -> bool {
        self.0 >= 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == Self::EMPTY.0
    }
}

impl Default for TileId {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for TileId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}
