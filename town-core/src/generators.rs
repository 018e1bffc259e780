//! Procedural feature generators.
//!
//! A generator reads a snapshot of the current selection and returns a new grid
//! of the same size, together with named points of interest and a tally of the
//! tiles it placed. Generators never touch the canvas; the compositor decides
//! what actually lands. All randomness comes from the caller's RNG, so a seeded
//! RNG reproduces a section exactly.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;
use town_rules::TileId;

use crate::geometry::{Point, Rect};
use crate::grid::TileGrid;

pub mod decor;
pub mod fence;
pub mod forest;
pub mod house;
pub mod simple;

pub use decor::{DecorGenerator, DecorOptions};
pub use fence::{FenceGenerator, FenceOptions};
pub use forest::{ForestGenerator, ForestOptions};
pub use house::{HouseGenerator, HouseOptions, RoofColor, WallStyle};
pub use simple::{BoxClearer, BoxOptions, BoxPlacer, ClearOptions, TileOptions, TilePlacer};

/// Cells kept free around generated structures.
pub const BORDER_PADDING: usize = 1;

/// Errors reported by generators. None of them leave partial output behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerateError {
    /// The selection leaves less than the minimum footprint once padding is removed.
    #[error("Selection is too small for a {min_width}x{min_height} {feature}")]
    SelectionTooSmall {
        feature: &'static str,
        min_width: usize,
        min_height: usize,
    },
    /// An option fell outside its documented range.
    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: String,
        min: String,
        max: String,
    },
    /// A coordinate lies outside the selection being generated into.
    #[error("{point} is outside the {width}x{height} selection")]
    OutsideSelection {
        point: Point,
        width: usize,
        height: usize,
    },
    /// Anything else the generator refuses to work with.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Checks `min <= value <= max`, naming the option in the error.
pub fn check_range<T: PartialOrd + fmt::Display>(
    name: &'static str,
    value: T,
    min: T,
    max: T,
) -> Result<(), GenerateError> {
    if value < min || value > max {
        return Err(GenerateError::OutOfRange {
            name,
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

/// Validates an optional option; `None` always passes.
pub fn check_optional<T: PartialOrd + fmt::Display + Copy>(
    name: &'static str,
    value: Option<T>,
    min: T,
    max: T,
) -> Result<(), GenerateError> {
    value.map_or(Ok(()), |v| check_range(name, v, min, max))
}

/// Snapshot of the selection handed to a generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorInput {
    pub grid: TileGrid,
}

impl GeneratorInput {
    pub const fn new(grid: TileGrid) -> Self {
        Self { grid }
    }

    /// An all-empty selection of the given size.
    pub fn blank(width: usize, height: usize) -> Self {
        Self::new(TileGrid::new(width, height))
    }

    pub const fn width(&self) -> usize {
        self.grid.width
    }

    pub const fn height(&self) -> usize {
        self.grid.height
    }

    /// Optional sub-rectangle clipped to the selection. Missing parts default
    /// to the whole selection. Errors when nothing of it is left.
    pub fn region(
        &self,
        x: Option<usize>,
        y: Option<usize>,
        width: Option<usize>,
        height: Option<usize>,
    ) -> Result<Rect, GenerateError> {
        let requested = Rect::new(
            x.unwrap_or(0),
            y.unwrap_or(0),
            width.unwrap_or(self.width()),
            height.unwrap_or(self.height()),
        );
        requested
            .intersection(&self.grid.bounds())
            .ok_or(GenerateError::OutsideSelection {
                point: Point::new(requested.x, requested.y),
                width: self.width(),
                height: self.height(),
            })
    }
}

/// A named point reported by a generator, in selection-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointOfInterest {
    pub x: usize,
    pub y: usize,
}

impl PointOfInterest {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Output of a generator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedSection {
    pub name: String,
    pub description: String,
    pub grid: TileGrid,
    pub points_of_interest: BTreeMap<String, PointOfInterest>,
    /// How many of each tile the generator put down.
    pub placed: BTreeMap<TileId, usize>,
}

impl CompletedSection {
    pub fn new(name: impl Into<String>, description: impl Into<String>, grid: TileGrid) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            grid,
            points_of_interest: BTreeMap::new(),
            placed: BTreeMap::new(),
        }
    }

    pub fn with_point(mut self, name: impl Into<String>, point: PointOfInterest) -> Self {
        self.points_of_interest.insert(name.into(), point);
        self
    }

    /// Records one placement of `tile` in the tally.
    pub fn tally(&mut self, tile: TileId) {
        *self.placed.entry(tile).or_insert(0) += 1;
    }
}

/// Common interface of every generator.
pub trait FeatureGenerator {
    type Options;

    /// Short name used in logs and section names.
    fn name(&self) -> &'static str;

    /// Checks option ranges. Runs before any randomness is consumed.
    fn validate(&self, options: &Self::Options) -> Result<(), GenerateError>;

    /// Produces a section the size of `input`.
    fn generate<R: Rng>(
        &self,
        input: &GeneratorInput,
        options: &Self::Options,
        rng: &mut R,
    ) -> Result<CompletedSection, GenerateError>;

    /// Validates, then generates.
    fn run<R: Rng>(
        &self,
        input: &GeneratorInput,
        options: &Self::Options,
        rng: &mut R,
    ) -> Result<CompletedSection, GenerateError> {
        self.validate(options)?;
        let section = self.generate(input, options, rng)?;
        log::debug!(
            "{} generated {}x{} section '{}'",
            self.name(),
            section.grid.width,
            section.grid.height,
            section.name
        );
        Ok(section)
    }
}

/// Any generator invocation, as issued by a tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorRequest {
    House(HouseOptions),
    Forest(ForestOptions),
    Fence(FenceOptions),
    Decor(DecorOptions),
    Tile(TileOptions),
    Box(BoxOptions),
    Clear(ClearOptions),
}

impl GeneratorRequest {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::House(_) => "house",
            Self::Forest(_) => "forest",
            Self::Fence(_) => "fence",
            Self::Decor(_) => "decor",
            Self::Tile(_) => "tile",
            Self::Box(_) => "box",
            Self::Clear(_) => "clear",
        }
    }

    pub fn run<R: Rng>(
        &self,
        input: &GeneratorInput,
        rng: &mut R,
    ) -> Result<CompletedSection, GenerateError> {
        match self {
            Self::House(o) => HouseGenerator.run(input, o, rng),
            Self::Forest(o) => ForestGenerator.run(input, o, rng),
            Self::Fence(o) => FenceGenerator.run(input, o, rng),
            Self::Decor(o) => DecorGenerator.run(input, o, rng),
            Self::Tile(o) => TilePlacer.run(input, o, rng),
            Self::Box(o) => BoxPlacer.run(input, o, rng),
            Self::Clear(o) => BoxClearer.run(input, o, rng),
        }
    }
}
