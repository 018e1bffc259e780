//! Static tile tables for the town map editor.
//!
//! Everything the engine needs to know about a tile id lives here: its
//! compositing priority, the multi-tile shape it belongs to (and therefore the
//! neighbors it requires), its color categories, and the structure catalog used
//! when describing a selection. The crate also loads the external tile
//! dictionary (id -> human readable description).

use thiserror::Error;

pub mod catalog;
pub mod colors;
pub mod dictionary;
pub mod formats;
pub mod loader;
pub mod priority;
pub mod shapes;
pub mod types;

pub use catalog::{StructureKind, STRUCTURE_KINDS};
pub use colors::{colors_of, ColorCategory};
pub use dictionary::TileDictionary;
pub use priority::{priority_of, Priority};
pub use shapes::{neighbor_contract, NeighborRequirement, TreeShape, TREE_SHAPES};
pub use types::TileId;

/// Errors that can occur while loading a tile dictionary.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error reading file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse dictionary format (e.g., RON/JSON): {0}")]
    ParseError(String),
    #[error("Invalid dictionary data: {0}")]
    InvalidData(String),
    #[error("Unsupported dictionary format: {0}")]
    UnsupportedFormat(String),
    #[error("Feature not enabled: {0}")]
    FeatureNotEnabled(String),
}
