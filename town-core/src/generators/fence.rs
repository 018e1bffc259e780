//! Closed rectangular fence with a single gate on its top or bottom edge.

use rand::Rng;
use town_rules::TileId;

use super::{
    check_optional, CompletedSection, FeatureGenerator, GenerateError, GeneratorInput,
    PointOfInterest, BORDER_PADDING,
};

pub const MIN_FENCE_SIZE: usize = 3;
pub const MAX_FENCE_SIZE: usize = 50;
const GATE: TileId = TileId(69);

// Edge bits of a cell on the fence outline.
const TOP: u8 = 0b0100;
const BOTTOM: u8 = 0b0001;
const LEFT: u8 = 0b1000;
const RIGHT: u8 = 0b0010;

const TOP_LEFT: u8 = TOP | LEFT;
const TOP_RIGHT: u8 = TOP | RIGHT;
const BOTTOM_LEFT: u8 = BOTTOM | LEFT;
const BOTTOM_RIGHT: u8 = BOTTOM | RIGHT;

/// Fence tile for an edge mask; interior cells (mask 0) have none.
const fn fence_tile(mask: u8) -> Option<TileId> {
    match mask {
        TOP_LEFT => Some(TileId(44)),
        TOP_RIGHT => Some(TileId(46)),
        BOTTOM_LEFT => Some(TileId(68)),
        BOTTOM_RIGHT => Some(TileId(70)),
        TOP | BOTTOM => Some(TileId(45)),
        LEFT => Some(TileId(56)),
        RIGHT => Some(TileId(58)),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FenceOptions {
    pub width: Option<usize>,
    pub height: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FenceGenerator;

impl FeatureGenerator for FenceGenerator {
    type Options = FenceOptions;

    fn name(&self) -> &'static str {
        "fence"
    }

    fn validate(&self, options: &FenceOptions) -> Result<(), GenerateError> {
        check_optional("width", options.width, MIN_FENCE_SIZE, MAX_FENCE_SIZE)?;
        check_optional("height", options.height, MIN_FENCE_SIZE, MAX_FENCE_SIZE)
    }

    fn generate<R: Rng>(
        &self,
        input: &GeneratorInput,
        options: &FenceOptions,
        rng: &mut R,
    ) -> Result<CompletedSection, GenerateError> {
        let usable_w = input.width().saturating_sub(2 * BORDER_PADDING);
        let usable_h = input.height().saturating_sub(2 * BORDER_PADDING);
        if usable_w < MIN_FENCE_SIZE || usable_h < MIN_FENCE_SIZE {
            return Err(GenerateError::SelectionTooSmall {
                feature: "fence",
                min_width: MIN_FENCE_SIZE,
                min_height: MIN_FENCE_SIZE,
            });
        }

        let width = options
            .width
            .map_or_else(|| rng.gen_range(MIN_FENCE_SIZE..=usable_w), |w| w.min(usable_w));
        let height = options
            .height
            .map_or_else(|| rng.gen_range(MIN_FENCE_SIZE..=usable_h), |h| h.min(usable_h));
        let fx = rng.gen_range(BORDER_PADDING..=input.width() - width - BORDER_PADDING);
        let fy = rng.gen_range(BORDER_PADDING..=input.height() - height - BORDER_PADDING);
        let (right, bottom) = (fx + width - 1, fy + height - 1);

        let mut grid = input.grid.clone();
        let mut placed = Vec::with_capacity(2 * (width + height));
        for y in fy..=bottom {
            for x in fx..=right {
                let mask = (u8::from(y == fy) << 2)
                    | u8::from(y == bottom)
                    | (u8::from(x == fx) << 3)
                    | (u8::from(x == right) << 1);
                if let Some(tile) = fence_tile(mask) {
                    grid.set(x, y, tile);
                    placed.push((x, y, tile));
                }
            }
        }

        let gate_x = rng.gen_range(fx + 1..right);
        let gate_y = if rng.gen_bool(0.5) { fy } else { bottom };
        grid.set(gate_x, gate_y, GATE);

        let mut section = CompletedSection::new("Fence", format!("A {width}x{height} fence"), grid)
            .with_point("gate", PointOfInterest::new(gate_x, gate_y));
        for (x, y, tile) in placed {
            if (x, y) != (gate_x, gate_y) {
                section.tally(tile);
            }
        }
        section.tally(GATE);
        Ok(section)
    }
}
