//! Forest generator.
//!
//! A stochastic pass walks the region row by row and plants mushrooms, bushes
//! and multi-tile trees into empty cells. A second pass drops the requested
//! number of extra single-tile plants onto randomly chosen empty cells.

use rand::seq::SliceRandom;
use rand::Rng;
use town_rules::shapes::{
    GREEN_CROSS_TREE, GREEN_ROUND_TREE, GREEN_TALL_TREE, YELLOW_CROSS_TREE, YELLOW_ROUND_TREE,
    YELLOW_TALL_TREE,
};
use town_rules::{TileId, TreeShape};

use super::{
    check_optional, check_range, CompletedSection, FeatureGenerator, GenerateError, GeneratorInput,
};
use crate::geometry::{Point, Rect};
use crate::grid::TileGrid;

/// Chance that an empty cell gets a plant at all.
pub const TREE_CHANCE: f64 = 0.8;
pub const MAX_EXTRA_PLANTS: usize = 100;

const MUSHROOM: TileId = TileId(29);
const GREEN_BUSHES: [TileId; 3] = [TileId(5), TileId(17), TileId(28)];
const YELLOW_BUSHES: [TileId; 1] = [TileId(27)];
const YELLOW_TREE: TileId = TileId(27);
const GREEN_TREE: TileId = TileId(28);

/// Options for [`ForestGenerator`]. The optional rect limits planting to part
/// of the selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForestOptions {
    pub x: Option<usize>,
    pub y: Option<usize>,
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub mushrooms: usize,
    pub yellow_trees: usize,
    pub green_trees: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ForestGenerator;

#[derive(Debug, Default)]
struct Counts {
    trees: usize,
    bushes: usize,
    mushrooms: usize,
}

/// Plants `shape` anchored at `anchor` if its whole footprint is empty and
/// inside `region`.
fn try_plant(grid: &mut TileGrid, region: &Rect, anchor: Point, shape: &TreeShape) -> bool {
    let mut cells = Vec::with_capacity(shape.len());
    for &(dx, dy, tile) in shape.cells {
        match anchor.offset(dx, dy) {
            Some(p)
                if region.contains_point(p) && grid.get_point(p).is_some_and(|t| t.is_empty()) =>
            {
                cells.push((p, tile));
            }
            _ => return false,
        }
    }
    for (p, tile) in cells {
        grid.set(p.x, p.y, tile);
    }
    true
}

impl FeatureGenerator for ForestGenerator {
    type Options = ForestOptions;

    fn name(&self) -> &'static str {
        "forest"
    }

    fn validate(&self, options: &ForestOptions) -> Result<(), GenerateError> {
        check_optional("x", options.x, 0, 40)?;
        check_optional("y", options.y, 0, 25)?;
        check_optional("width", options.width, 1, 50)?;
        check_optional("height", options.height, 1, 50)?;
        check_range("mushrooms", options.mushrooms, 0, MAX_EXTRA_PLANTS)?;
        check_range("yellow_trees", options.yellow_trees, 0, MAX_EXTRA_PLANTS)?;
        check_range("green_trees", options.green_trees, 0, MAX_EXTRA_PLANTS)
    }

    fn generate<R: Rng>(
        &self,
        input: &GeneratorInput,
        options: &ForestOptions,
        rng: &mut R,
    ) -> Result<CompletedSection, GenerateError> {
        let region = input.region(options.x, options.y, options.width, options.height)?;
        let mut grid = input.grid.clone();
        let mut counts = Counts::default();

        for anchor in region.points() {
            let occupied = grid.get_point(anchor).is_some_and(|t| !t.is_empty());
            if occupied || rng.gen_bool(1.0 - TREE_CHANCE) {
                continue;
            }
            let roll = rng.gen_range(0..=100);
            let green = rng.gen_bool(0.5);
            if roll < 7 {
                grid.set(anchor.x, anchor.y, MUSHROOM);
                counts.mushrooms += 1;
            } else if roll < 30 {
                let palette: &[TileId] = if green { &GREEN_BUSHES } else { &YELLOW_BUSHES };
                if let Some(&bush) = palette.choose(rng) {
                    grid.set(anchor.x, anchor.y, bush);
                    counts.bushes += 1;
                }
            } else {
                let (green_shape, yellow_shape) = if roll < 60 {
                    (&GREEN_TALL_TREE, &YELLOW_TALL_TREE)
                } else if roll < 85 {
                    (&GREEN_ROUND_TREE, &YELLOW_ROUND_TREE)
                } else {
                    (&GREEN_CROSS_TREE, &YELLOW_CROSS_TREE)
                };
                let shape = if green { green_shape } else { yellow_shape };
                if try_plant(&mut grid, &region, anchor, shape) {
                    counts.trees += 1;
                }
            }
        }

        let mut open: Vec<Point> = region
            .points()
            .filter(|&p| grid.get_point(p).is_some_and(|t| t.is_empty()))
            .collect();
        open.shuffle(rng);
        let extras = std::iter::repeat(MUSHROOM)
            .take(options.mushrooms)
            .chain(std::iter::repeat(YELLOW_TREE).take(options.yellow_trees))
            .chain(std::iter::repeat(GREEN_TREE).take(options.green_trees));
        for (tile, p) in extras.zip(open) {
            grid.set(p.x, p.y, tile);
            if tile == MUSHROOM {
                counts.mushrooms += 1;
            } else {
                counts.trees += 1;
            }
        }

        let description = format!(
            "A {}x{} forest with {} trees, {} bushes and {} mushrooms",
            region.width, region.height, counts.trees, counts.bushes, counts.mushrooms
        );
        let planted: Vec<TileId> = region
            .points()
            .filter_map(|p| {
                let after = grid.get_point(p).copied()?;
                (after.is_concrete() && input.grid.get_point(p) != Some(&after)).then_some(after)
            })
            .collect();
        let mut section = CompletedSection::new("Forest", description, grid);
        for tile in planted {
            section.tally(tile);
        }
        Ok(section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use town_rules::{priority_of, Priority};

    use crate::pruner::{StructurePruner, TileSurface};

    #[test]
    fn forest_only_plants_forest_tiles_in_empty_cells() {
        let mut input = GeneratorInput::blank(12, 10);
        input.grid.set(3, 3, TileId(89));
        let section = ForestGenerator
            .run(&input, &ForestOptions::default(), &mut StdRng::seed_from_u64(3))
            .unwrap();

        assert_eq!(section.grid.get(3, 3), Some(&TileId(89)));
        assert!(section.grid.occupied() > 1);
        for (x, y, tile) in section.grid.cells() {
            if (x, y) != (3, 3) && tile.is_concrete() {
                assert_eq!(priority_of(*tile), Priority::Forest, "tile {tile} at ({x}, {y})");
            }
        }
    }

    #[test]
    fn generated_trees_are_never_broken() {
        let section = ForestGenerator
            .run(
                &GeneratorInput::blank(15, 15),
                &ForestOptions::default(),
                &mut StdRng::seed_from_u64(11),
            )
            .unwrap();
        let mut grid = section.grid;
        let bounds = TileSurface::bounds(&grid);
        assert!(StructurePruner::default().prune(&mut grid, bounds).is_empty());
    }

    #[test]
    fn sub_rect_limits_planting() {
        let opts = ForestOptions {
            x: Some(2),
            y: Some(2),
            width: Some(3),
            height: Some(3),
            ..ForestOptions::default()
        };
        let section = ForestGenerator
            .run(&GeneratorInput::blank(10, 10), &opts, &mut StdRng::seed_from_u64(5))
            .unwrap();
        let region = Rect::new(2, 2, 3, 3);
        for (x, y, tile) in section.grid.cells() {
            if tile.is_concrete() {
                assert!(region.contains_point(Point::new(x, y)));
            }
        }
    }

    #[test]
    fn requested_extras_are_placed_when_room_allows() {
        let mut input = GeneratorInput::blank(4, 4);
        // a full grid leaves no room for the stochastic pass
        for (x, y) in input.grid.coords().collect::<Vec<_>>() {
            if y > 0 {
                input.grid.set(x, y, TileId(45));
            }
        }
        let opts = ForestOptions {
            mushrooms: 1,
            green_trees: 10,
            ..ForestOptions::default()
        };
        let section = ForestGenerator
            .run(&input, &opts, &mut StdRng::seed_from_u64(8))
            .unwrap();
        let top_row_filled = (0..4).all(|x| section.grid.get(x, 0).is_some_and(|t| t.is_concrete()));
        assert!(top_row_filled);
        let tallied: usize = section.placed.values().sum();
        assert_eq!(tallied, 4);
    }

    #[test]
    fn counts_out_of_range_are_rejected() {
        let opts = ForestOptions {
            mushrooms: 101,
            ..ForestOptions::default()
        };
        assert!(ForestGenerator
            .run(&GeneratorInput::blank(5, 5), &opts, &mut StdRng::seed_from_u64(0))
            .is_err());
    }
}
