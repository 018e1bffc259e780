//! Structure catalog consulted when describing the contents of a selection.

use crate::types::TileId;

/// A kind of structure the world-facts extractor can discover.
#[derive(Debug, Clone, Copy)]
pub struct StructureKind {
    pub name: &'static str,
    /// Tiles that make up the structure; flood fill is restricted to these.
    pub tiles: &'static [i32],
    /// Countable details, e.g. doors or windows, in reporting order.
    pub features: &'static [(&'static str, &'static [i32])],
    /// Named sub-regions whose colors are reported separately (e.g. a roof).
    pub substructures: &'static [(&'static str, &'static [i32])],
}

impl StructureKind {
    pub fn contains(&self, tile: TileId) -> bool {
        self.tiles.contains(&tile.0)
    }

    /// Tiles of this kind that do not belong to any substructure.
    pub fn is_body_tile(&self, tile: TileId) -> bool {
        !self
            .substructures
            .iter()
            .any(|(_, tiles)| tiles.contains(&tile.0))
    }
}

const ROOF_TILES: &[i32] = &[
    48, 49, 50, 51, 52, 53, 54, 55, 60, 61, 62, 63, 64, 65, 66, 67,
];

/// Structure kinds in discovery priority order.
pub const STRUCTURE_KINDS: [StructureKind; 3] = [
    StructureKind {
        name: "house",
        tiles: &[
            48, 49, 50, 51, 52, 53, 54, 55, 60, 61, 62, 63, 64, 65, 66, 67, 72, 73, 74, 75, 76, 77,
            78, 79, 84, 85, 86, 87, 88, 89, 90, 91,
        ],
        features: &[
            ("archway", &[74, 78]),
            ("chimney", &[51, 55]),
            ("door", &[85, 86, 87, 89, 90, 91]),
            ("window", &[84, 88]),
        ],
        substructures: &[("roof", ROOF_TILES)],
    },
    StructureKind {
        name: "fence",
        tiles: &[44, 45, 46, 47, 56, 58, 59, 68, 69, 70, 71, 80, 81, 82],
        features: &[("gate", &[69])],
        substructures: &[],
    },
    StructureKind {
        name: "forest",
        tiles: &[
            3, 4, 5, 6, 7, 8, 9, 10, 11, 15, 16, 17, 18, 19, 20, 21, 22, 23, 27, 28, 29, 30, 31,
            32, 33, 34, 35, 94, 106,
        ],
        features: &[
            ("log", &[106]),
            ("beehive", &[94]),
            ("mushroom", &[29]),
            ("sprout", &[17]),
        ],
        substructures: &[],
    },
];
