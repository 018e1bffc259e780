//! JSON snapshot of a canvas: the flattened feature tiles plus the layer rects.
//!
//! Layers are rebuilt on load by re-running containment insertion, so only
//! their names, rects and recorded parents are stored.

use serde::{Deserialize, Serialize};
use town_rules::TileId;

use crate::compositor::{CompositorConfig, TileCompositor};
use crate::geometry::{Point, Rect};
use crate::grid::TileGrid;
use crate::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRecord {
    pub name: String,
    pub rect: Rect,
    pub parent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSnapshot {
    pub width: usize,
    pub height: usize,
    /// Rows of visible feature tiles, `-1` where empty.
    pub tiles: Vec<Vec<TileId>>,
    /// Named layers in preorder, so parents precede children.
    #[serde(default)]
    pub layers: Vec<LayerRecord>,
}

impl CanvasSnapshot {
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl TileCompositor {
    pub fn to_snapshot(&self) -> CanvasSnapshot {
        let tree = self.layers();
        let layers = tree
            .layers()
            .map(|node| LayerRecord {
                name: node.name().to_string(),
                rect: node.rect(),
                parent: tree
                    .find_parent(node.name())
                    .map_or_else(|| tree.root_name().to_string(), |p| p.name().to_string()),
            })
            .collect();
        CanvasSnapshot {
            width: self.width(),
            height: self.height(),
            tiles: self.flatten_features().to_rows(),
            layers,
        }
    }

    /// Rebuilds a compositor from a snapshot. Tiles land on the feature
    /// surface and are then cut into the re-created layers.
    pub fn from_snapshot(
        snapshot: &CanvasSnapshot,
        config: CompositorConfig,
    ) -> Result<Self, CoreError> {
        let grid = TileGrid::from_rows(snapshot.tiles.clone())
            .ok_or_else(|| CoreError::InvalidSnapshot("tile rows have different lengths".into()))?;
        if (grid.width, grid.height) != (snapshot.width, snapshot.height) {
            return Err(CoreError::InvalidSnapshot(format!(
                "declared {}x{} but tiles are {}x{}",
                snapshot.width, snapshot.height, grid.width, grid.height
            )));
        }

        let mut compositor = Self::new(snapshot.width, snapshot.height, config);
        let root = compositor.layers_mut().root_mut();
        for (x, y, &tile) in grid.cells() {
            if tile.is_concrete() {
                root.set_tile(Point::new(x, y), tile);
            }
        }

        for record in &snapshot.layers {
            compositor.name_selection(&record.name, record.rect)?;
            let tree = compositor.layers_mut();
            let actual = tree.find_parent(&record.name).map(|p| p.name().to_string());
            if actual.as_deref() != Some(record.parent.as_str()) && tree.contains(&record.parent) {
                tree.move_node(&record.name, &record.parent)?;
            }
        }
        compositor.drain_events();
        log::info!(
            "Loaded {}x{} canvas with {} layers",
            snapshot.width,
            snapshot.height,
            snapshot.layers.len()
        );
        Ok(compositor)
    }
}
