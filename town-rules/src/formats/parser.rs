use crate::{LoadError, TileDictionary};

/// Trait defining the interface for format-specific dictionary parsers.
///
/// Implementors of this trait can parse a tile dictionary from different file
/// formats (e.g., the tileset's JSON database or a RON file).
pub trait FormatParser {
    /// Parses file content into a `TileDictionary`.
    ///
    /// # Arguments
    ///
    /// * `content` - A string slice containing the dictionary content
    fn parse(&self, content: &str) -> Result<TileDictionary, LoadError>;

    /// Returns a descriptive name for this parser format.
    ///
    /// This can be used for debugging, logging, or user-facing error messages.
    fn format_name(&self) -> &'static str;
}
