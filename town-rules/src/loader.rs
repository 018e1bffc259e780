use crate::formats::{json_format::JsonFormatParser, ron_format::RonFormatParser, FormatParser};
use crate::{LoadError, TileDictionary};
use std::fs;
use std::path::Path;

/// Loads a tile dictionary from a file, picking the format from its extension
/// (`.json` or `.ron`).
pub fn load_from_file(path: &Path) -> Result<TileDictionary, LoadError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let parser: Box<dyn FormatParser> = match extension.as_str() {
        "json" => Box::new(JsonFormatParser::new()),
        "ron" => Box::new(RonFormatParser::new()),
        other => {
            return Err(LoadError::UnsupportedFormat(format!(
                "'{other}' (expected .json or .ron): {}",
                path.display()
            )))
        }
    };

    log::debug!("Loading tile dictionary from {} as {}", path.display(), parser.format_name());
    let content = fs::read_to_string(path)?;
    let dictionary = parser.parse(&content)?;
    log::info!("Loaded {} tile descriptions from {}", dictionary.len(), path.display());
    Ok(dictionary)
}
