//! Multi-tile shapes and the neighbor contracts derived from them.
//!
//! A tree drawn with several tiles is only valid while every one of its tiles
//! is present. Each tile of a shape therefore "requires" the other tiles at
//! fixed offsets; the pruner in `town-core` checks these contracts.

use crate::types::TileId;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// A tree made of several tiles. Offsets are relative to the anchor cell
/// (the cell a generator scans when it decides to plant the tree).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeShape {
    pub name: &'static str,
    pub cells: &'static [(i32, i32, TileId)],
}

impl TreeShape {
    /// Number of tiles in the footprint.
    pub const fn len(&self) -> usize {
        self.cells.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Tall 1x2 tree, green.
pub const GREEN_TALL_TREE: TreeShape = TreeShape {
    name: "green tall tree",
    cells: &[(0, 0, TileId(4)), (0, 1, TileId(16))],
};
/// Tall 1x2 tree, yellow.
pub const YELLOW_TALL_TREE: TreeShape = TreeShape {
    name: "yellow tall tree",
    cells: &[(0, 0, TileId(3)), (0, 1, TileId(15))],
};
/// Round 2x2 tree, green.
pub const GREEN_ROUND_TREE: TreeShape = TreeShape {
    name: "green round tree",
    cells: &[
        (0, 0, TileId(6)),
        (1, 0, TileId(8)),
        (0, 1, TileId(30)),
        (1, 1, TileId(32)),
    ],
};
/// Round 2x2 tree, yellow.
pub const YELLOW_ROUND_TREE: TreeShape = TreeShape {
    name: "yellow round tree",
    cells: &[
        (0, 0, TileId(9)),
        (1, 0, TileId(11)),
        (0, 1, TileId(33)),
        (1, 1, TileId(35)),
    ],
};
/// Cross-shaped 5 tile tree, green. Anchored at the top tile.
pub const GREEN_CROSS_TREE: TreeShape = TreeShape {
    name: "green cross tree",
    cells: &[
        (0, 0, TileId(7)),
        (0, 1, TileId(19)),
        (0, 2, TileId(31)),
        (-1, 1, TileId(18)),
        (1, 1, TileId(20)),
    ],
};
/// Cross-shaped 5 tile tree, yellow. Anchored at the top tile.
pub const YELLOW_CROSS_TREE: TreeShape = TreeShape {
    name: "yellow cross tree",
    cells: &[
        (0, 0, TileId(10)),
        (0, 1, TileId(22)),
        (0, 2, TileId(34)),
        (-1, 1, TileId(21)),
        (1, 1, TileId(23)),
    ],
};

/// Every multi-tile shape known to the editor.
pub const TREE_SHAPES: [TreeShape; 6] = [
    GREEN_TALL_TREE,
    YELLOW_TALL_TREE,
    GREEN_ROUND_TREE,
    YELLOW_ROUND_TREE,
    GREEN_CROSS_TREE,
    YELLOW_CROSS_TREE,
];

/// One neighbor a tile requires: the cell at `(x + dx, y + dy)` must hold `expected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborRequirement {
    pub dx: i32,
    pub dy: i32,
    pub expected: TileId,
}

static CONTRACTS: Lazy<HashMap<TileId, Vec<NeighborRequirement>>> = Lazy::new(|| {
    let mut table = HashMap::new();
    for shape in &TREE_SHAPES {
        for &(ax, ay, tile) in shape.cells {
            let requirements = shape
                .cells
                .iter()
                .filter(|&&(bx, by, _)| (bx, by) != (ax, ay))
                .map(|&(bx, by, expected)| NeighborRequirement {
                    dx: bx - ax,
                    dy: by - ay,
                    expected,
                })
                .collect();
            if table.insert(tile, requirements).is_some() {
                log::warn!("Tile {tile} appears in more than one multi-tile shape");
            }
        }
    }
    log::debug!("Derived neighbor contracts for {} tiles", table.len());
    table
});

/// Returns the neighbors `tile` requires, or `None` if it is not part of a
/// multi-tile shape.
pub fn neighbor_contract(tile: TileId) -> Option<&'static [NeighborRequirement]> {
    CONTRACTS.get(&tile).map(Vec::as_slice)
}
