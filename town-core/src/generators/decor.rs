//! Scatters small decorations over a selection.

use rand::seq::SliceRandom;
use rand::Rng;
use town_rules::TileId;

use super::{check_optional, CompletedSection, FeatureGenerator, GenerateError, GeneratorInput};

pub const DEFAULT_DECOR_CHANCE: f64 = 0.05;

/// Decoration tiles and their names.
pub const DECOR_TILES: [(TileId, &str); 10] = [
    (TileId(27), "orange tree"),
    (TileId(28), "green tree"),
    (TileId(29), "mushroom"),
    (TileId(57), "wheelbarrow"),
    (TileId(94), "beehive"),
    (TileId(95), "target"),
    (TileId(106), "log"),
    (TileId(107), "bag"),
    (TileId(130), "bucket empty"),
    (TileId(131), "bucket full"),
];

fn decor_name(tile: TileId) -> &'static str {
    DECOR_TILES
        .iter()
        .find(|(t, _)| *t == tile)
        .map_or("decor", |(_, name)| *name)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecorOptions {
    /// Per-cell probability in `0..=1`. Defaults to [`DEFAULT_DECOR_CHANCE`].
    pub chance: Option<f64>,
    pub x: Option<usize>,
    pub y: Option<usize>,
    pub width: Option<usize>,
    pub height: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecorGenerator;

impl FeatureGenerator for DecorGenerator {
    type Options = DecorOptions;

    fn name(&self) -> &'static str {
        "decor"
    }

    fn validate(&self, options: &DecorOptions) -> Result<(), GenerateError> {
        if options.chance.is_some_and(f64::is_nan) {
            return Err(GenerateError::InvalidArgument("chance must be a number".into()));
        }
        check_optional("chance", options.chance, 0.0, 1.0)?;
        check_optional("x", options.x, 0, 40)?;
        check_optional("y", options.y, 0, 25)?;
        check_optional("width", options.width, 1, 50)?;
        check_optional("height", options.height, 1, 50)
    }

    fn generate<R: Rng>(
        &self,
        input: &GeneratorInput,
        options: &DecorOptions,
        rng: &mut R,
    ) -> Result<CompletedSection, GenerateError> {
        let chance = options.chance.unwrap_or(DEFAULT_DECOR_CHANCE);
        let region = input.region(options.x, options.y, options.width, options.height)?;
        let mut grid = input.grid.clone();
        let mut placed = Vec::new();

        for p in region.points() {
            if rng.gen::<f64>() < chance {
                if let Some(&(tile, _)) = DECOR_TILES.choose(rng) {
                    grid.set(p.x, p.y, tile);
                    placed.push(tile);
                }
            }
        }

        let mut section = CompletedSection::new(
            "Decor",
            format!("Added {} decor tiles at chance {chance:.2}", placed.len()),
            grid,
        );
        for tile in placed {
            section.tally(tile);
        }
        if !section.placed.is_empty() {
            let summary: Vec<String> = section
                .placed
                .iter()
                .map(|(tile, n)| format!("{} x{n}", decor_name(*tile)))
                .collect();
            section.description = format!("{}: {}", section.description, summary.join(", "));
        }
        Ok(section)
    }
}
