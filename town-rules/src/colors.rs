//! Color categories used when describing structures.

use crate::types::TileId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColorCategory {
    Red,
    Yellow,
    Brown,
    Green,
    Gray,
}

impl ColorCategory {
    /// All categories, in table order. Ties between equally frequent colors
    /// resolve to the earlier entry.
    pub const ALL: [Self; 5] = [Self::Red, Self::Yellow, Self::Brown, Self::Green, Self::Gray];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Brown => "brown",
            Self::Green => "green",
            Self::Gray => "gray",
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    const fn tiles(self) -> &'static [i32] {
        match self {
            Self::Red => &[52, 53, 54, 55, 64, 65, 66, 67],
            Self::Yellow => &[3, 9, 10, 11, 15, 21, 22, 23, 27, 33, 34, 35],
            Self::Brown => &[
                72, 73, 74, 75, 84, 85, 86, 87, 44, 45, 46, 47, 56, 58, 59, 68, 69, 70, 71, 80,
                81, 82, 106,
            ],
            Self::Green => &[4, 5, 6, 7, 8, 16, 17, 18, 19, 20, 28, 29, 30, 31, 32],
            Self::Gray => &[48, 49, 50, 51, 60, 61, 62, 63, 76, 77, 78, 79, 88, 89, 90, 91],
        }
    }
}

impl fmt::Display for ColorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Yields every color category `tile` belongs to, in table order. A tile may
/// belong to none, one, or several categories.
pub fn colors_of(tile: TileId) -> impl Iterator<Item = ColorCategory> {
    ColorCategory::ALL
        .into_iter()
        .filter(move |color| color.tiles().contains(&tile.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roof_tiles_are_red_or_gray() {
        assert_eq!(colors_of(TileId(53)).collect::<Vec<_>>(), vec![ColorCategory::Red]);
        assert_eq!(colors_of(TileId(49)).collect::<Vec<_>>(), vec![ColorCategory::Gray]);
    }

    #[test]
    fn unknown_tiles_have_no_color() {
        assert_eq!(colors_of(TileId(1)).count(), 0);
        assert_eq!(colors_of(TileId::EMPTY).count(), 0);
    }

    #[test]
    fn indices_follow_table_order() {
        for (i, color) in ColorCategory::ALL.iter().enumerate() {
            assert_eq!(color.index(), i);
        }
    }
}
