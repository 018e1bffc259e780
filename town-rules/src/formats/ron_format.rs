use crate::formats::FormatParser;
use crate::{LoadError, TileDictionary};
#[cfg(feature = "serde")]
use crate::TileId;
#[cfg(feature = "serde")]
use serde::Deserialize;

/// A parser implementation for RON (Rusty Object Notation) dictionaries.
pub struct RonFormatParser;

impl Default for RonFormatParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RonFormatParser {
    /// Creates a new RON format parser
    pub fn new() -> Self {
        Self
    }
}

// --- Structs mirroring the RON format (only needed with serde) ---

#[cfg(feature = "serde")]
#[derive(Debug, Clone, Deserialize)]
struct RonTileData {
    id: i32,
    description: String,
}

/// Top-level structure of a RON dictionary:
/// `( tiles: [ (id: 29, description: "mushroom"), ... ] )`.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Deserialize)]
struct RonDictionaryFile {
    tiles: Vec<RonTileData>,
}

impl FormatParser for RonFormatParser {
    fn format_name(&self) -> &'static str {
        "Rusty Object Notation (RON)"
    }

    #[cfg(feature = "serde")]
    fn parse(&self, ron_content: &str) -> Result<TileDictionary, LoadError> {
        let file: RonDictionaryFile = ron::from_str(ron_content)
            .map_err(|e| LoadError::ParseError(format!("RON deserialization failed: {e}")))?;

        if file.tiles.is_empty() {
            return Err(LoadError::InvalidData("No tiles defined.".to_owned()));
        }
        let mut dictionary = TileDictionary::new();
        for tile in file.tiles {
            if tile.id < 0 {
                return Err(LoadError::InvalidData(format!(
                    "Negative tile id {} is reserved",
                    tile.id
                )));
            }
            if dictionary.insert(TileId(tile.id), tile.description).is_some() {
                return Err(LoadError::InvalidData(format!(
                    "Duplicate tile id: {}",
                    tile.id
                )));
            }
        }
        Ok(dictionary)
    }

    /// Stub implementation when the `serde` feature is not enabled.
    #[cfg(not(feature = "serde"))]
    fn parse(&self, _ron_content: &str) -> Result<TileDictionary, LoadError> {
        Err(LoadError::FeatureNotEnabled(
            "serde (required for RON parsing)".to_string(),
        ))
    }
}

/// Parses a tile dictionary defined in a RON string.
pub fn parse_ron_dictionary(ron_content: &str) -> Result<TileDictionary, LoadError> {
    RonFormatParser::new().parse(ron_content)
}
