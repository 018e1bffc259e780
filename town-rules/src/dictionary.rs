//! External tile dictionary: tile id -> human readable description.

use crate::types::TileId;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileDictionary {
    entries: BTreeMap<TileId, String>,
}

impl TileDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a description, returning the previous one if the id was known.
    pub fn insert(&mut self, tile: TileId, description: impl Into<String>) -> Option<String> {
        self.entries.insert(tile, description.into())
    }

    pub fn get(&self, tile: TileId) -> Option<&str> {
        self.entries.get(&tile).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `"29 (mushroom)"` when the tile is known, `"29"` otherwise.
    pub fn label(&self, tile: TileId) -> String {
        match self.get(tile) {
            Some(description) => format!("{tile} ({description})"),
            None => tile.to_string(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileId, &str)> {
        self.entries.iter().map(|(id, d)| (*id, d.as_str()))
    }
}

impl FromIterator<(TileId, String)> for TileDictionary {
    fn from_iter<I: IntoIterator<Item = (TileId, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_falls_back_to_the_number() {
        let mut dictionary = TileDictionary::new();
        dictionary.insert(TileId(29), "mushroom");
        assert_eq!(dictionary.label(TileId(29)), "29 (mushroom)");
        assert_eq!(dictionary.label(TileId(30)), "30");
    }
}
