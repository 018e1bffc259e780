//! Core engine of the town map editor.
//!
//! The crate owns the layered tile canvas and everything that mutates it:
//! the layer tree, the compositor with its single-level undo, the procedural
//! feature generators and the pruner that removes broken multi-tile trees.
//! It also contains the read-only world-facts extractor that describes a
//! selection in plain English.

use thiserror::Error;

/// Layered canvas, placement policy and undo.
pub mod compositor;
/// Layer lifecycle notifications.
pub mod events;
/// Structure discovery and description.
pub mod facts;
/// Procedural feature generators and simple placement tools.
pub mod generators;
/// Points, rects and selections.
pub mod geometry;
/// Generic 2D grid.
pub mod grid;
/// Named rectangular regions organized by containment.
pub mod layers;
/// JSON canvas snapshots.
#[cfg(feature = "serde")]
pub mod persistence;
/// Multi-tile integrity checks.
pub mod pruner;

pub use compositor::{
    CollectedSelection, CompositorConfig, PlaceMode, PlacementReport, TieBreak, TileCompositor,
};
pub use events::LayerEvent;
pub use facts::{FactsConfig, Structure, WorldFactsExtractor};
pub use generators::{CompletedSection, FeatureGenerator, GenerateError, GeneratorRequest};
pub use geometry::{Point, Rect, Selection};
pub use grid::{Grid, TileGrid};
pub use layers::{LayerError, LayerTree};
#[cfg(feature = "serde")]
pub use persistence::CanvasSnapshot;
pub use pruner::StructurePruner;
pub use town_rules::TileId;

/// Errors raised by canvas operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The canvas has zero width or height.
    #[error("Canvas has no surfaces ({width}x{height})")]
    SurfaceUninitialized { width: usize, height: usize },
    /// A rect lies entirely outside the canvas.
    #[error("{0} is outside the canvas")]
    OutOfCanvas(Rect),
    /// A grid does not match the canvas dimensions.
    #[error("Expected a {expected_width}x{expected_height} grid, got {width}x{height}")]
    ShapeMismatch {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },
    /// Undo was requested with no snapshot stored.
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error(transparent)]
    Layer(#[from] LayerError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    /// A persisted canvas could not be rebuilt.
    #[error("Invalid canvas snapshot: {0}")]
    InvalidSnapshot(String),
    #[cfg(feature = "serde")]
    #[error("Snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
