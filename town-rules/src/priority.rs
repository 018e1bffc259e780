//! Compositing priority classes.

use crate::types::TileId;

/// Priority class of a tile. The derived ordering is the compositing order:
/// `House > Fence > Decor > Forest > Grass > Empty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Empty,
    Grass,
    Forest,
    Decor,
    Fence,
    House,
}

/// Returns the priority class of `tile`.
///
/// Reserved markers are `Empty`. Concrete ids missing from every table are
/// treated as `Decor`, i.e. a free-standing object.
pub const fn priority_of(tile: TileId) -> Priority {
    match tile.0 {
        i32::MIN..=-1 => Priority::Empty,
        48..=55 | 60..=67 | 72..=79 | 84..=91 => Priority::House,
        44..=47 | 56 | 58 | 59 | 68..=71 | 80..=83 => Priority::Fence,
        57 | 94 | 95 | 106 | 107 | 130 | 131 => Priority::Decor,
        3..=11 | 15..=23 | 27..=35 => Priority::Forest,
        0..=2 => Priority::Grass,
        _ => Priority::Decor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_order_matches_compositing_order() {
        assert!(Priority::House > Priority::Fence);
        assert!(Priority::Fence > Priority::Decor);
        assert!(Priority::Decor > Priority::Forest);
        assert!(Priority::Forest > Priority::Grass);
        assert!(Priority::Grass > Priority::Empty);
    }

    #[test]
    fn known_tiles_map_to_their_class() {
        assert_eq!(priority_of(TileId(53)), Priority::House);
        assert_eq!(priority_of(TileId(89)), Priority::House);
        assert_eq!(priority_of(TileId(45)), Priority::Fence);
        assert_eq!(priority_of(TileId(69)), Priority::Fence);
        assert_eq!(priority_of(TileId(57)), Priority::Decor);
        assert_eq!(priority_of(TileId(29)), Priority::Forest);
        assert_eq!(priority_of(TileId(1)), Priority::Grass);
        assert_eq!(priority_of(TileId::EMPTY), Priority::Empty);
        assert_eq!(priority_of(TileId::CLEAR_MARK), Priority::Empty);
    }

    #[test]
    fn unknown_concrete_tiles_are_decor() {
        assert_eq!(priority_of(TileId(500)), Priority::Decor);
    }
}
