//! Direct placement tools: one tile, a box, or an erase box.

use rand::Rng;
use town_rules::TileId;

use super::{CompletedSection, FeatureGenerator, GenerateError, GeneratorInput};
use crate::geometry::{Point, Rect};

/// Rejects an origin outside the selection.
fn check_inside(input: &GeneratorInput, x: usize, y: usize) -> Result<(), GenerateError> {
    let point = Point::new(x, y);
    if input.grid.bounds().contains_point(point) {
        Ok(())
    } else {
        Err(GenerateError::OutsideSelection {
            point,
            width: input.width(),
            height: input.height(),
        })
    }
}

/// The requested box and the part of it inside the selection. Oversized
/// boxes are clamped to the selection edge.
fn clip_box(
    input: &GeneratorInput,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> Result<(Rect, Rect), GenerateError> {
    check_inside(input, x, y)?;
    let rect = Rect::new(x, y, width, height);
    let visible = rect
        .intersection(&input.grid.bounds())
        .ok_or(GenerateError::OutsideSelection {
            point: Point::new(x, y),
            width: input.width(),
            height: input.height(),
        })?;
    Ok((rect, visible))
}

fn check_tile(tile: TileId) -> Result<(), GenerateError> {
    if tile.is_concrete() {
        Ok(())
    } else {
        Err(GenerateError::InvalidArgument(format!(
            "tile {tile} is not a placeable tile"
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileOptions {
    pub x: usize,
    pub y: usize,
    pub tile: TileId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxOptions {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub tile: TileId,
    /// Outline only when false.
    pub filled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearOptions {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Places one tile.
#[derive(Debug, Clone, Copy, Default)]
pub struct TilePlacer;

/// Places a filled or hollow box of one tile. Cells past the selection edge are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxPlacer;

/// Marks a box for erasure.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxClearer;

impl FeatureGenerator for TilePlacer {
    type Options = TileOptions;

    fn name(&self) -> &'static str {
        "tile"
    }

    fn validate(&self, options: &TileOptions) -> Result<(), GenerateError> {
        check_tile(options.tile)
    }

    fn generate<R: Rng>(
        &self,
        input: &GeneratorInput,
        options: &TileOptions,
        _rng: &mut R,
    ) -> Result<CompletedSection, GenerateError> {
        check_inside(input, options.x, options.y)?;
        let mut grid = input.grid.clone();
        grid.set(options.x, options.y, options.tile);
        let mut section = CompletedSection::new(
            "Tile",
            format!("Placed tile {} at ({}, {})", options.tile, options.x, options.y),
            grid,
        );
        section.tally(options.tile);
        Ok(section)
    }
}

impl FeatureGenerator for BoxPlacer {
    type Options = BoxOptions;

    fn name(&self) -> &'static str {
        "box"
    }

    fn validate(&self, options: &BoxOptions) -> Result<(), GenerateError> {
        if options.width == 0 || options.height == 0 {
            return Err(GenerateError::InvalidArgument("box must be at least 1x1".into()));
        }
        check_tile(options.tile)
    }

    fn generate<R: Rng>(
        &self,
        input: &GeneratorInput,
        options: &BoxOptions,
        _rng: &mut R,
    ) -> Result<CompletedSection, GenerateError> {
        let (rect, visible) = clip_box(input, options.x, options.y, options.width, options.height)?;
        let mut grid = input.grid.clone();
        let mut count = 0;
        for p in visible.points() {
            let on_edge = p.x == rect.min_x()
                || p.x == rect.max_x()
                || p.y == rect.min_y()
                || p.y == rect.max_y();
            if (options.filled || on_edge) && grid.set(p.x, p.y, options.tile) {
                count += 1;
            }
        }
        let kind = if options.filled { "filled" } else { "hollow" };
        let mut section = CompletedSection::new(
            "Box",
            format!(
                "Placed a {kind} {}x{} box of tile {}",
                visible.width, visible.height, options.tile
            ),
            grid,
        );
        section.placed.insert(options.tile, count);
        Ok(section)
    }
}

impl FeatureGenerator for BoxClearer {
    type Options = ClearOptions;

    fn name(&self) -> &'static str {
        "clear"
    }

    fn validate(&self, options: &ClearOptions) -> Result<(), GenerateError> {
        if options.width == 0 || options.height == 0 {
            return Err(GenerateError::InvalidArgument("clear box must be at least 1x1".into()));
        }
        Ok(())
    }

    fn generate<R: Rng>(
        &self,
        input: &GeneratorInput,
        options: &ClearOptions,
        _rng: &mut R,
    ) -> Result<CompletedSection, GenerateError> {
        let (_, visible) = clip_box(input, options.x, options.y, options.width, options.height)?;
        let mut grid = input.grid.clone();
        for p in visible.points() {
            grid.set(p.x, p.y, TileId::CLEAR_MARK);
        }
        Ok(CompletedSection::new(
            "Clear",
            format!("Cleared a {}x{} box", visible.width, visible.height),
            grid,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn rng() -> StepRng {
        StepRng::new(0, 1)
    }

    #[test]
    fn hollow_box_leaves_interior_alone() {
        let opts = BoxOptions {
            x: 1,
            y: 1,
            width: 4,
            height: 3,
            tile: TileId(45),
            filled: false,
        };
        let section = BoxPlacer
            .run(&GeneratorInput::blank(6, 5), &opts, &mut rng())
            .unwrap();
        assert_eq!(section.grid.occupied(), 10);
        assert_eq!(section.grid.get(2, 2), Some(&TileId::EMPTY));
        assert_eq!(section.placed[&TileId(45)], 10);
    }

    #[test]
    fn box_is_clipped_at_selection_edge() {
        let opts = BoxOptions {
            x: 3,
            y: 0,
            width: 5,
            height: 2,
            tile: TileId(0),
            filled: true,
        };
        let section = BoxPlacer
            .run(&GeneratorInput::blank(5, 5), &opts, &mut rng())
            .unwrap();
        assert_eq!(section.grid.occupied(), 4);
    }

    #[test]
    fn clear_box_marks_cells_for_erasure() {
        let opts = ClearOptions {
            x: 0,
            y: 0,
            width: 2,
            height: 2,
        };
        let section = BoxClearer
            .run(&GeneratorInput::blank(3, 3), &opts, &mut rng())
            .unwrap();
        let marks = section
            .grid
            .cells()
            .filter(|(_, _, t)| **t == TileId::CLEAR_MARK)
            .count();
        assert_eq!(marks, 4);
    }

    #[test]
    fn coordinates_outside_selection_are_rejected() {
        let opts = TileOptions {
            x: 5,
            y: 0,
            tile: TileId(29),
        };
        assert!(matches!(
            TilePlacer.run(&GeneratorInput::blank(5, 5), &opts, &mut rng()),
            Err(GenerateError::OutsideSelection { .. })
        ));
    }

    #[test]
    fn markers_cannot_be_placed() {
        let opts = TileOptions {
            x: 0,
            y: 0,
            tile: TileId::CLEAR_MARK,
        };
        assert!(TilePlacer
            .run(&GeneratorInput::blank(2, 2), &opts, &mut rng())
            .is_err());
    }

    #[test]
    fn oversized_box_is_clamped_to_selection() {
        let opts = BoxOptions {
            x: 1,
            y: 0,
            width: usize::MAX,
            height: 1,
            tile: TileId(29),
            filled: true,
        };
        let section = BoxPlacer
            .run(&GeneratorInput::blank(5, 5), &opts, &mut rng())
            .unwrap();
        assert_eq!(section.grid.occupied(), 4);
        assert_eq!(section.placed[&TileId(29)], 4);
        assert_eq!(section.grid.get(0, 0), Some(&TileId::EMPTY));
    }

    #[test]
    fn oversized_hollow_box_draws_only_visible_edges() {
        let opts = BoxOptions {
            x: 1,
            y: 1,
            width: usize::MAX,
            height: usize::MAX,
            tile: TileId(45),
            filled: false,
        };
        let section = BoxPlacer
            .run(&GeneratorInput::blank(4, 4), &opts, &mut rng())
            .unwrap();
        // only the top and left edges fall inside the selection
        assert_eq!(section.grid.occupied(), 5);
        assert_eq!(section.grid.get(2, 2), Some(&TileId::EMPTY));
    }

    #[test]
    fn clear_at_selection_edge_is_clamped() {
        let opts = ClearOptions {
            x: 2,
            y: 2,
            width: 100,
            height: usize::MAX,
        };
        let section = BoxClearer
            .run(&GeneratorInput::blank(3, 3), &opts, &mut rng())
            .unwrap();
        let marks: Vec<_> = section
            .grid
            .cells()
            .filter(|(_, _, t)| **t == TileId::CLEAR_MARK)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert_eq!(marks, vec![(2, 2)]);
        assert_eq!(section.description, "Cleared a 1x1 box");
    }

    #[test]
    fn zero_sized_box_is_rejected() {
        let opts = ClearOptions {
            x: 0,
            y: 0,
            width: 0,
            height: 3,
        };
        assert!(matches!(
            BoxClearer.run(&GeneratorInput::blank(3, 3), &opts, &mut rng()),
            Err(GenerateError::InvalidArgument(_))
        ));
    }
}
