use crate::formats::FormatParser;
use crate::{LoadError, TileDictionary};
#[cfg(feature = "serde")]
use crate::TileId;
#[cfg(feature = "serde")]
use serde::Deserialize;

/// Parser for the tileset's JSON database:
/// `{"Tilemap_Packed_Tileset": [{"TileID": 29, "Description": "mushroom"}, ...]}`.
#[derive(Debug, Default)]
pub struct JsonFormatParser;

impl JsonFormatParser {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "serde")]
#[derive(Debug, Deserialize)]
struct JsonTileEntry {
    #[serde(rename = "TileID")]
    tile_id: i32,
    #[serde(rename = "Description")]
    description: String,
}

#[cfg(feature = "serde")]
#[derive(Debug, Deserialize)]
struct JsonTileDatabase {
    #[serde(rename = "Tilemap_Packed_Tileset")]
    tiles: Vec<JsonTileEntry>,
}

impl FormatParser for JsonFormatParser {
    fn format_name(&self) -> &'static str {
        "JSON tile database"
    }

    #[cfg(feature = "serde")]
    fn parse(&self, content: &str) -> Result<TileDictionary, LoadError> {
        let database: JsonTileDatabase = serde_json::from_str(content)
            .map_err(|e| LoadError::ParseError(format!("JSON deserialization failed: {e}")))?;

        let mut dictionary = TileDictionary::new();
        for entry in database.tiles {
            if entry.tile_id < 0 {
                return Err(LoadError::InvalidData(format!(
                    "Negative tile id {} is reserved",
                    entry.tile_id
                )));
            }
            if dictionary
                .insert(TileId(entry.tile_id), entry.description)
                .is_some()
            {
                log::warn!("Duplicate tile id {} in JSON database, last entry wins", entry.tile_id);
            }
        }
        Ok(dictionary)
    }

    /// Stub implementation when the `serde` feature is not enabled.
    #[cfg(not(feature = "serde"))]
    fn parse(&self, _content: &str) -> Result<TileDictionary, LoadError> {
        Err(LoadError::FeatureNotEnabled(
            "serde (required for JSON parsing)".to_string(),
        ))
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn parses_tileset_database() {
        let content = r#"{"Tilemap_Packed_Tileset": [
            {"TileID": 29, "Description": "mushroom"},
            {"TileID": 57, "Description": "wheelbarrow"}
        ]}"#;
        let dictionary = JsonFormatParser::new().parse(content).unwrap();
        assert_eq!(dictionary.len(), 2);
        assert_eq!(dictionary.get(TileId(57)), Some("wheelbarrow"));
    }

    #[test]
    fn rejects_reserved_ids() {
        let content = r#"{"Tilemap_Packed_Tileset": [{"TileID": -1, "Description": "nothing"}]}"#;
        let result = JsonFormatParser::new().parse(content);
        assert!(matches!(result, Err(LoadError::InvalidData(_))));
    }

    #[test]
    fn reports_malformed_json() {
        let result = JsonFormatParser::new().parse("{ not json");
        assert!(matches!(result, Err(LoadError::ParseError(_))));
    }
}
