//! The layered tile canvas.
//!
//! Three kinds of surface make up the canvas: a base grid of grass, the shared
//! feature surface (the root node of the [`LayerTree`]) and the private grids of
//! named layers. Layers draw above the feature surface in registration order,
//! the earliest registered layer on top. Generated sections are merged in cell
//! by cell under a priority policy. The state before each placement is kept so
//! the last placement can be undone.

use rand::seq::SliceRandom;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use town_rules::{priority_of, TileId};

use crate::events::LayerEvent;
use crate::generators::{CompletedSection, GeneratorInput, GeneratorRequest};
use crate::geometry::{Point, Rect};
use crate::grid::TileGrid;
use crate::layers::LayerTree;
use crate::pruner::{StructurePruner, TileSurface, DEFAULT_MAX_PASSES};
use crate::CoreError;

/// Name of the root node, the shared feature surface.
pub const ROOT_LAYER: &str = "Root";
/// Tiles around a placement that are re-checked for broken trees.
pub const DEFAULT_PRUNE_MARGIN: usize = 2;
/// Tiles the base surface is painted with.
pub const GRASS_TILES: [TileId; 3] = [TileId(0), TileId(1), TileId(2)];

/// Which write wins when incoming and existing tiles have equal priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum TieBreak {
    /// Last writer wins.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "incoming"))]
    #[cfg_attr(feature = "clap", value(name = "incoming"))]
    IncomingWins,
    /// First writer wins.
    #[cfg_attr(feature = "serde", serde(rename = "existing"))]
    #[cfg_attr(feature = "clap", value(name = "existing"))]
    ExistingWins,
}

impl TieBreak {
    /// Whether `incoming` may replace `existing`.
    pub fn allows(self, incoming: TileId, existing: TileId) -> bool {
        let (new, old) = (priority_of(incoming), priority_of(existing));
        match self {
            Self::IncomingWins => new >= old,
            Self::ExistingWins => new > old,
        }
    }
}

/// How [`TileCompositor::place`] treats the section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceMode {
    /// Priority-checked merge with snapshot, pruning and auto-layering.
    Normal,
    /// Verbatim replay of a snapshot. Every value, including `EMPTY`, is written.
    Restore,
}

/// Placement policy.
#[derive(Debug, Clone)]
pub struct CompositorConfig {
    pub tie_break: TieBreak,
    /// Register each placement rect as a named layer.
    pub auto_layer: bool,
    pub prune_margin: usize,
    pub max_prune_passes: usize,
}

impl CompositorConfig {
    /// Creates a new builder for `CompositorConfig`.
    pub fn builder() -> CompositorConfigBuilder {
        CompositorConfigBuilder::default()
    }
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            tie_break: TieBreak::IncomingWins,
            auto_layer: false,
            prune_margin: DEFAULT_PRUNE_MARGIN,
            max_prune_passes: DEFAULT_MAX_PASSES,
        }
    }
}

/// Builder for `CompositorConfig`.
#[derive(Debug, Default)]
pub struct CompositorConfigBuilder {
    tie_break: Option<TieBreak>,
    auto_layer: Option<bool>,
    prune_margin: Option<usize>,
    max_prune_passes: Option<usize>,
}

impl CompositorConfigBuilder {
    pub const fn tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = Some(tie_break);
        self
    }

    pub const fn auto_layer(mut self, enabled: bool) -> Self {
        self.auto_layer = Some(enabled);
        self
    }

    pub const fn prune_margin(mut self, margin: usize) -> Self {
        self.prune_margin = Some(margin);
        self
    }

    pub const fn max_prune_passes(mut self, passes: usize) -> Self {
        self.max_prune_passes = Some(passes);
        self
    }

    pub fn build(self) -> CompositorConfig {
        let defaults = CompositorConfig::default();
        CompositorConfig {
            tie_break: self.tie_break.unwrap_or(defaults.tie_break),
            auto_layer: self.auto_layer.unwrap_or(defaults.auto_layer),
            prune_margin: self.prune_margin.unwrap_or(defaults.prune_margin),
            max_prune_passes: self.max_prune_passes.unwrap_or(defaults.max_prune_passes),
        }
    }
}

/// Layer an auto-layered placement landed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoLayer {
    pub name: String,
    /// False when the tiles were merged into an existing layer with the same rect.
    pub created: bool,
}

/// What a placement did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementReport {
    pub section: String,
    /// Placement rect clipped to the canvas.
    pub area: Rect,
    pub changed: Vec<Point>,
    pub pruned: Vec<Point>,
    pub auto_layer: Option<AutoLayer>,
}

impl PlacementReport {
    pub fn changed_bounds(&self) -> Option<Rect> {
        Rect::bounding(&self.changed)
    }
}

/// Tiles under a rect, split by surface. All grids are rect-local.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedSelection {
    pub area: Rect,
    pub base: TileGrid,
    /// The shared feature surface only.
    pub features: TileGrid,
    /// Feature surface with named layers drawn over it.
    pub layered: TileGrid,
    /// Everything, falling back to the base where no feature is visible.
    pub combined: TileGrid,
}

impl CollectedSelection {
    /// The view generators work on: visible features, no grass.
    pub fn generator_input(&self) -> GeneratorInput {
        GeneratorInput::new(self.layered.clone())
    }
}

enum WriteTarget {
    Surface,
    Layer(String),
}

/// Owns the canvas surfaces, the layer tree and the undo slot.
#[derive(Debug, Clone)]
pub struct TileCompositor {
    width: usize,
    height: usize,
    base: TileGrid,
    layers: LayerTree,
    active_layer: Option<String>,
    snapshot: Option<TileGrid>,
    config: CompositorConfig,
    events: Vec<LayerEvent>,
}

impl TileCompositor {
    /// Creates a canvas with a plain grass base and no features.
    pub fn new(width: usize, height: usize, config: CompositorConfig) -> Self {
        Self {
            width,
            height,
            base: TileGrid::filled(width, height, GRASS_TILES[0]),
            layers: LayerTree::new(ROOT_LAYER, Rect::new(0, 0, width, height)),
            active_layer: None,
            snapshot: None,
            config,
            events: Vec::new(),
        }
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub const fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub const fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub const fn layers(&self) -> &LayerTree {
        &self.layers
    }

    pub fn active_layer(&self) -> Option<&str> {
        self.active_layer.as_deref()
    }

    pub const fn can_undo(&self) -> bool {
        self.snapshot.is_some()
    }

    /// False for a zero-sized canvas, which has nothing to draw on.
    pub const fn is_initialized(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub const fn base(&self) -> &TileGrid {
        &self.base
    }

    /// The shared feature surface.
    pub const fn features(&self) -> &TileGrid {
        self.layers.root().grid()
    }

    /// Paints the base with random grass.
    pub fn fill_base<R: Rng>(&mut self, rng: &mut R) {
        for (x, y) in self.base.coords().collect::<Vec<_>>() {
            if let Some(&grass) = GRASS_TILES.choose(rng) {
                self.base.set(x, y, grass);
            }
        }
    }

    pub fn set_base(&mut self, base: TileGrid) -> Result<(), CoreError> {
        if (base.width, base.height) != (self.width, self.height) {
            return Err(CoreError::ShapeMismatch {
                expected_width: self.width,
                expected_height: self.height,
                width: base.width,
                height: base.height,
            });
        }
        self.base = base;
        Ok(())
    }

    /// Visible feature at `point`: the first registered layer holding a tile
    /// there, else the feature surface.
    pub fn visible_feature(&self, point: Point) -> TileId {
        self.layers
            .covering(point)
            .into_iter()
            .map(|node| node.tile_at(point))
            .find(|tile| !tile.is_empty())
            .unwrap_or_else(|| self.layers.root().tile_at(point))
    }

    /// Feature surface and layers merged, `EMPTY` where nothing is drawn.
    pub fn flatten_features(&self) -> TileGrid {
        let mut out = self.features().clone();
        let mut nodes: Vec<_> = self.layers.layers().collect();
        // draw the latest layer first so earlier ones end up on top
        nodes.sort_by_key(|node| std::cmp::Reverse(node.seq()));
        for node in nodes {
            let rect = node.rect();
            for (lx, ly, &tile) in node.grid().cells() {
                if !tile.is_empty() {
                    out.set(rect.x + lx, rect.y + ly, tile);
                }
            }
        }
        out
    }

    /// Features over the base.
    pub fn flatten(&self) -> TileGrid {
        let mut out = self.flatten_features();
        for (x, y) in out.coords().collect::<Vec<_>>() {
            if out.get(x, y).is_some_and(|t| t.is_empty()) {
                if let Some(&grass) = self.base.get(x, y) {
                    out.set(x, y, grass);
                }
            }
        }
        out
    }

    /// Reads every surface under `rect`, clipped to the canvas.
    pub fn collect(&self, rect: Rect) -> Result<CollectedSelection, CoreError> {
        let area = rect
            .intersection(&self.bounds())
            .ok_or(CoreError::OutOfCanvas(rect))?;
        Ok(CollectedSelection {
            area,
            base: self.base.sub_grid(area),
            features: self.features().sub_grid(area),
            layered: self.flatten_features().sub_grid(area),
            combined: self.flatten().sub_grid(area),
        })
    }

    /// Runs a generator over `rect` and places its output there.
    ///
    /// Invalid requests fail before the canvas is touched.
    pub fn apply<R: Rng>(
        &mut self,
        request: &GeneratorRequest,
        rect: Rect,
        rng: &mut R,
    ) -> Result<(CompletedSection, PlacementReport), CoreError> {
        let collected = self.collect(rect)?;
        let section = request.run(&collected.generator_input(), rng)?;
        let origin = Point::new(collected.area.x, collected.area.y);
        let report = self.place(&section, origin, PlaceMode::Normal)?;
        Ok((section, report))
    }

    /// Merges `section` into the canvas with its top-left cell at `origin`.
    ///
    /// Cells that fall off the canvas are skipped. In normal mode `EMPTY` cells
    /// are left alone, `CLEAR_MARK` erases every surface, and concrete tiles go
    /// to the resolution target if the tie-break policy allows it.
    pub fn place(
        &mut self,
        section: &CompletedSection,
        origin: Point,
        mode: PlaceMode,
    ) -> Result<PlacementReport, CoreError> {
        if !self.is_initialized() {
            log::warn!("Cannot place '{}': canvas has no surfaces", section.name);
            return Err(CoreError::SurfaceUninitialized {
                width: self.width,
                height: self.height,
            });
        }
        let requested = Rect::new(origin.x, origin.y, section.grid.width, section.grid.height);
        let area = requested
            .intersection(&self.bounds())
            .ok_or(CoreError::OutOfCanvas(requested))?;

        if mode == PlaceMode::Normal {
            self.snapshot = Some(self.flatten_features());
        }

        let mut report = PlacementReport {
            section: section.name.clone(),
            area,
            ..PlacementReport::default()
        };
        let mut wrote_tile = false;
        let mut surface_writes = Vec::new();

        for (dx, dy, &tile) in section.grid.cells() {
            let point = Point::new(origin.x + dx, origin.y + dy);
            if !area.contains_point(point) {
                continue;
            }
            match mode {
                PlaceMode::Restore => {
                    self.erase_everywhere(point);
                    if tile.is_concrete() {
                        self.layers.root_mut().set_tile(point, tile);
                    }
                }
                PlaceMode::Normal if tile == TileId::CLEAR_MARK => {
                    self.erase_everywhere(point);
                    report.changed.push(point);
                }
                PlaceMode::Normal if tile.is_concrete() => {
                    if let Some(target) = self.write(point, tile) {
                        report.changed.push(point);
                        wrote_tile = true;
                        if matches!(target, WriteTarget::Surface) {
                            surface_writes.push(point);
                        }
                    }
                }
                PlaceMode::Normal => {}
            }
        }

        if mode == PlaceMode::Normal {
            if let Some(changed) = report.changed_bounds() {
                let region = changed.expanded(self.config.prune_margin, &self.bounds());
                let pruner = StructurePruner::new(self.config.max_prune_passes);
                report.pruned = pruner.prune(self, region);
            }
            if self.config.auto_layer && wrote_tile {
                report.auto_layer = self.auto_layer(area, &surface_writes)?;
            }
        }

        log::info!(
            "Placed '{}' at {area}: {} changed, {} pruned",
            section.name,
            report.changed.len(),
            report.pruned.len()
        );
        Ok(report)
    }

    /// Restores the canvas to its state before the last normal placement.
    /// The snapshot is consumed, so a second undo fails.
    pub fn undo(&mut self) -> Result<PlacementReport, CoreError> {
        let snapshot = self.snapshot.take().ok_or(CoreError::NothingToUndo)?;
        let section = CompletedSection::new("Undo", "Restore previous state", snapshot);
        self.place(&section, Point::ORIGIN, PlaceMode::Restore)
    }

    fn write_target(&self, point: Point) -> WriteTarget {
        if let Some(active) = self.active_layer.as_deref() {
            if self
                .layers
                .find(active)
                .is_some_and(|node| node.rect().contains_point(point))
            {
                return WriteTarget::Layer(active.to_string());
            }
        }
        self.layers
            .covering(point)
            .first()
            .map_or(WriteTarget::Surface, |node| {
                WriteTarget::Layer(node.name().to_string())
            })
    }

    /// Priority-checked write of one concrete tile. Returns where it went, or
    /// `None` if the tile was refused or already visible.
    ///
    /// An accepted tile becomes the only tile at its cell: every other surface
    /// is cleared there, so a layer drawn above the target cannot hide it.
    fn write(&mut self, point: Point, tile: TileId) -> Option<WriteTarget> {
        let visible = self.visible_feature(point);
        if visible == tile || !self.config.tie_break.allows(tile, visible) {
            return None;
        }
        let target = self.write_target(point);
        let owner = match &target {
            WriteTarget::Surface => self.layers.root_name().to_string(),
            WriteTarget::Layer(name) => name.clone(),
        };
        self.layers.find(&owner)?;
        self.layers.for_each_mut(|node| {
            let value = if node.name() == owner { tile } else { TileId::EMPTY };
            node.set_tile(point, value);
        });
        Some(target)
    }

    fn erase_everywhere(&mut self, point: Point) {
        self.layers.for_each_mut(|node| {
            node.set_tile(point, TileId::EMPTY);
        });
    }

    /// Moves freshly written surface tiles into a layer covering `area`,
    /// creating one with a placeholder name if none has exactly that rect.
    /// Nothing is created when every write already landed in a layer.
    fn auto_layer(
        &mut self,
        area: Rect,
        surface_writes: &[Point],
    ) -> Result<Option<AutoLayer>, CoreError> {
        let existing = self
            .layers
            .layers()
            .find(|node| node.rect() == area)
            .map(|node| node.name().to_string());
        let (name, created) = match existing {
            Some(name) => (name, false),
            None if surface_writes.is_empty() => {
                log::debug!("No surface writes in {area}, skipping auto-layer");
                return Ok(None);
            }
            None => {
                let name = self.placeholder_name(area);
                self.layers.insert(&name, area)?;
                self.events.push(LayerEvent::Created {
                    name: name.clone(),
                    rect: area,
                });
                (name, true)
            }
        };

        let moved: Vec<(Point, TileId)> = surface_writes
            .iter()
            .map(|&p| (p, self.layers.root().tile_at(p)))
            .filter(|(_, tile)| tile.is_concrete())
            .collect();
        for &(p, _) in &moved {
            self.layers.root_mut().set_tile(p, TileId::EMPTY);
        }
        if let Some(node) = self.layers.find_mut(&name) {
            for &(p, tile) in &moved {
                node.set_tile(p, tile);
            }
        }
        log::debug!("Auto-layer '{name}' took {} tiles (new: {created})", moved.len());
        Ok(Some(AutoLayer { name, created }))
    }

    /// "Unnamed Area WxH", suffixed with a counter if taken.
    pub fn placeholder_name(&self, area: Rect) -> String {
        let base = format!("Unnamed Area {}x{}", area.width, area.height);
        if !self.layers.contains(&base) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base} ({n})");
            if !self.layers.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Registers `rect` as a named layer and moves the feature-surface tiles
    /// under it into the new layer.
    pub fn name_selection(&mut self, name: &str, rect: Rect) -> Result<(), CoreError> {
        let area = rect
            .intersection(&self.bounds())
            .ok_or(CoreError::OutOfCanvas(rect))?;
        self.layers.insert(name, area)?;

        let cut: Vec<(Point, TileId)> = area
            .points()
            .map(|p| (p, self.layers.root().tile_at(p)))
            .filter(|(_, tile)| !tile.is_empty())
            .collect();
        for &(p, _) in &cut {
            self.layers.root_mut().set_tile(p, TileId::EMPTY);
        }
        if let Some(node) = self.layers.find_mut(name) {
            for &(p, tile) in &cut {
                node.set_tile(p, tile);
            }
        }
        log::info!("Named {area} as '{name}' ({} tiles)", cut.len());
        self.events.push(LayerEvent::Created {
            name: name.to_string(),
            rect: area,
        });
        Ok(())
    }

    pub fn rename_layer(&mut self, old: &str, new: &str) -> bool {
        if !self.layers.rename(old, new) {
            return false;
        }
        if self.active_layer.as_deref() == Some(old) {
            self.active_layer = Some(new.to_string());
        }
        self.events.push(LayerEvent::Renamed {
            from: old.to_string(),
            to: new.to_string(),
        });
        true
    }

    /// Deletes a layer. Without `cascade` its tiles drop back onto the feature
    /// surface and its children move up a level. With `cascade` the layer, its
    /// descendants and all their tiles are discarded.
    pub fn delete_layer(&mut self, name: &str, cascade: bool) -> bool {
        let node = match self.layers.detach(name, cascade) {
            Ok(node) => node,
            Err(e) => {
                log::warn!("Cannot delete layer: {e}");
                return false;
            }
        };
        if !cascade {
            let rect = node.rect();
            let root = self.layers.root_mut();
            for (lx, ly, &tile) in node.grid().cells() {
                if !tile.is_empty() {
                    root.set_tile(Point::new(rect.x + lx, rect.y + ly), tile);
                }
            }
        }
        if self
            .active_layer
            .as_deref()
            .is_some_and(|active| node.find(active).is_some())
        {
            self.active_layer = None;
        }
        self.events.push(LayerEvent::Deleted {
            name: name.to_string(),
            cascade,
        });
        true
    }

    /// Re-parents a layer. Geometric containment is not re-checked.
    pub fn move_layer(&mut self, name: &str, new_parent: &str) -> bool {
        match self.layers.move_node(name, new_parent) {
            Ok(()) => {
                self.events.push(LayerEvent::Moved {
                    name: name.to_string(),
                    parent: new_parent.to_string(),
                });
                true
            }
            Err(e) => {
                log::warn!("Cannot move layer: {e}");
                false
            }
        }
    }

    pub fn move_layer_to_root(&mut self, name: &str) -> bool {
        let root = self.layers.root_name().to_string();
        self.move_layer(name, &root)
    }

    /// Makes `name` the preferred write target and returns its rect.
    /// Selecting the root clears the active layer.
    pub fn select_layer(&mut self, name: &str) -> Option<Rect> {
        let rect = self.layers.find(name)?.rect();
        self.active_layer = if self.layers.is_root(name) {
            None
        } else {
            Some(name.to_string())
        };
        self.events.push(LayerEvent::Selected {
            name: name.to_string(),
            rect,
        });
        Some(rect)
    }

    pub fn clear_active_layer(&mut self) {
        self.active_layer = None;
    }

    /// Indented outline of the layer tree.
    pub fn list_layers(&self) -> String {
        self.layers.render()
    }

    /// Takes the queued layer events.
    pub fn drain_events(&mut self) -> Vec<LayerEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn layers_mut(&mut self) -> &mut LayerTree {
        &mut self.layers
    }
}

impl TileSurface for TileCompositor {
    fn bounds(&self) -> Rect {
        Self::bounds(self)
    }

    fn tile_at(&self, point: Point) -> TileId {
        self.visible_feature(point)
    }

    fn erase(&mut self, point: Point) {
        self.erase_everywhere(point);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{BoxOptions, ClearOptions, HouseOptions};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn compositor() -> TileCompositor {
        TileCompositor::new(10, 8, CompositorConfig::default())
    }

    fn single(tile: i32) -> CompletedSection {
        CompletedSection::new("Tile", "", TileGrid::filled(1, 1, TileId(tile)))
    }

    fn place_at(c: &mut TileCompositor, tile: i32, x: usize, y: usize) -> PlacementReport {
        c.place(&single(tile), Point::new(x, y), PlaceMode::Normal).unwrap()
    }

    #[test]
    fn higher_priority_overwrites_lower_never_the_reverse() {
        let mut c = compositor();
        place_at(&mut c, 29, 2, 2); // forest
        place_at(&mut c, 89, 2, 2); // house
        assert_eq!(c.visible_feature(Point::new(2, 2)), TileId(89));

        let report = place_at(&mut c, 45, 2, 2); // fence
        assert!(report.changed.is_empty());
        assert_eq!(c.visible_feature(Point::new(2, 2)), TileId(89));
    }

    #[test]
    fn tie_break_policy_decides_equal_priority() {
        let mut c = compositor();
        place_at(&mut c, 88, 0, 0);
        place_at(&mut c, 77, 0, 0);
        assert_eq!(c.visible_feature(Point::ORIGIN), TileId(77));

        let config = CompositorConfig::builder()
            .tie_break(TieBreak::ExistingWins)
            .build();
        let mut c = TileCompositor::new(4, 4, config);
        place_at(&mut c, 88, 0, 0);
        place_at(&mut c, 77, 0, 0);
        assert_eq!(c.visible_feature(Point::ORIGIN), TileId(88));
    }

    #[test]
    fn empty_cells_never_erase_and_clear_marks_always_do() {
        let mut c = compositor();
        place_at(&mut c, 89, 1, 1);
        c.place(
            &CompletedSection::new("Blank", "", TileGrid::new(3, 3)),
            Point::ORIGIN,
            PlaceMode::Normal,
        )
        .unwrap();
        assert_eq!(c.visible_feature(Point::new(1, 1)), TileId(89));

        let report = c
            .place(&single(TileId::CLEAR_MARK.0), Point::new(1, 1), PlaceMode::Normal)
            .unwrap();
        assert_eq!(report.changed, vec![Point::new(1, 1)]);
        assert_eq!(c.visible_feature(Point::new(1, 1)), TileId::EMPTY);
    }

    #[test]
    fn cells_off_the_canvas_are_skipped() {
        let mut c = compositor();
        let section = CompletedSection::new("Big", "", TileGrid::filled(4, 4, TileId(29)));
        let report = c.place(&section, Point::new(8, 6), PlaceMode::Normal).unwrap();
        assert_eq!(report.area, Rect::new(8, 6, 2, 2));
        assert_eq!(report.changed.len(), 4);
    }

    #[test]
    fn zero_sized_canvas_reports_uninitialized() {
        let mut c = TileCompositor::new(0, 0, CompositorConfig::default());
        assert!(matches!(
            c.place(&single(29), Point::ORIGIN, PlaceMode::Normal),
            Err(CoreError::SurfaceUninitialized { .. })
        ));
    }

    #[test]
    fn undo_restores_previous_state_once() {
        let mut c = compositor();
        place_at(&mut c, 29, 3, 3);
        let before = c.flatten_features();
        place_at(&mut c, 89, 3, 3);
        place_at(&mut c, 89, 4, 3);

        // only the last placement is undone
        c.undo().unwrap();
        let mut expected = before;
        expected.set(3, 3, TileId(89));
        assert_eq!(c.flatten_features(), expected);
        assert!(matches!(c.undo(), Err(CoreError::NothingToUndo)));
    }

    #[test]
    fn clear_then_undo_restores_house() {
        let mut c = compositor();
        let mut rng = StdRng::seed_from_u64(5);
        let house = GeneratorRequest::House(HouseOptions {
            width: Some(4),
            height: Some(4),
            ..HouseOptions::default()
        });
        c.apply(&house, Rect::new(0, 0, 6, 6), &mut rng).unwrap();
        let with_house = c.flatten_features();

        let clear = GeneratorRequest::Clear(ClearOptions {
            x: 0,
            y: 0,
            width: 6,
            height: 6,
        });
        c.apply(&clear, Rect::new(0, 0, 6, 6), &mut rng).unwrap();
        assert_eq!(c.flatten_features().occupied(), 0);

        c.undo().unwrap();
        assert_eq!(c.flatten_features(), with_house);
    }

    #[test]
    fn broken_tree_is_pruned_after_placement() {
        let mut c = compositor();
        let mut tree = TileGrid::new(1, 2);
        tree.set(0, 0, TileId(4));
        tree.set(0, 1, TileId(16));
        c.place(&CompletedSection::new("Tree", "", tree), Point::new(5, 5), PlaceMode::Normal)
            .unwrap();

        // a house tile over the trunk orphans the crown
        let report = place_at(&mut c, 89, 5, 6);
        assert_eq!(report.pruned, vec![Point::new(5, 5)]);
        assert_eq!(c.visible_feature(Point::new(5, 5)), TileId::EMPTY);
        assert_eq!(c.visible_feature(Point::new(5, 6)), TileId(89));
    }

    #[test]
    fn naming_a_selection_cuts_tiles_into_the_layer() {
        let mut c = compositor();
        place_at(&mut c, 89, 2, 2);
        place_at(&mut c, 29, 7, 7);
        c.name_selection("House", Rect::new(1, 1, 3, 3)).unwrap();

        assert_eq!(c.features().get(2, 2), Some(&TileId::EMPTY));
        assert_eq!(c.features().get(7, 7), Some(&TileId(29)));
        let layer = c.layers().find("House").unwrap();
        assert_eq!(layer.tile_at(Point::new(2, 2)), TileId(89));
        assert_eq!(c.visible_feature(Point::new(2, 2)), TileId(89));
        assert!(matches!(
            c.drain_events().as_slice(),
            [LayerEvent::Created { name, .. }] if name == "House"
        ));
    }

    #[test]
    fn full_canvas_selection_becomes_child_of_root() {
        let mut c = compositor();
        c.name_selection("Town", c.bounds()).unwrap();
        assert_eq!(c.layers().find_parent("Town").unwrap().name(), ROOT_LAYER);
    }

    #[test]
    fn writes_go_to_active_then_first_covering_layer() {
        let mut c = compositor();
        c.name_selection("Yard", Rect::new(0, 0, 6, 6)).unwrap();
        c.name_selection("Shed", Rect::new(1, 1, 2, 2)).unwrap();

        place_at(&mut c, 29, 1, 1);
        assert_eq!(c.layers().find("Yard").unwrap().tile_at(Point::new(1, 1)), TileId(29));

        c.select_layer("Shed").unwrap();
        place_at(&mut c, 29, 2, 2);
        assert_eq!(c.layers().find("Shed").unwrap().tile_at(Point::new(2, 2)), TileId(29));

        place_at(&mut c, 29, 8, 7);
        assert_eq!(c.features().get(8, 7), Some(&TileId(29)));
    }

    #[test]
    fn auto_layer_creates_then_merges() {
        let config = CompositorConfig::builder().auto_layer(true).build();
        let mut c = TileCompositor::new(10, 10, config);
        let mut rng = StdRng::seed_from_u64(1);
        let area = Rect::new(2, 2, 4, 3);
        let filled_box = |tile| {
            GeneratorRequest::Box(BoxOptions {
                x: 0,
                y: 0,
                width: 4,
                height: 3,
                tile: TileId(tile),
                filled: true,
            })
        };

        let (_, first) = c.apply(&filled_box(29), area, &mut rng).unwrap();
        let created = first.auto_layer.unwrap();
        assert!(created.created);
        assert_eq!(created.name, "Unnamed Area 4x3");

        let (_, second) = c.apply(&filled_box(89), area, &mut rng).unwrap();
        let merged = second.auto_layer.unwrap();
        assert!(!merged.created);
        assert_eq!(merged.name, created.name);
        assert_eq!(c.layers().len(), 1);
        assert_eq!(c.features().occupied(), 0);
    }

    #[test]
    fn pure_clear_does_not_auto_layer() {
        let config = CompositorConfig::builder().auto_layer(true).build();
        let mut c = TileCompositor::new(5, 5, config);
        let report = c
            .place(&single(TileId::CLEAR_MARK.0), Point::ORIGIN, PlaceMode::Normal)
            .unwrap();
        assert!(report.auto_layer.is_none());
        assert!(c.layers().is_empty());
    }

    #[test]
    fn delete_releases_or_discards_tiles() {
        let mut c = compositor();
        place_at(&mut c, 89, 2, 2);
        c.name_selection("A", Rect::new(0, 0, 4, 4)).unwrap();
        assert!(c.delete_layer("A", false));
        assert_eq!(c.features().get(2, 2), Some(&TileId(89)));

        c.name_selection("B", Rect::new(0, 0, 4, 4)).unwrap();
        c.select_layer("B").unwrap();
        assert!(c.delete_layer("B", true));
        assert_eq!(c.visible_feature(Point::new(2, 2)), TileId::EMPTY);
        assert_eq!(c.active_layer(), None);
        assert!(!c.delete_layer(ROOT_LAYER, true));
    }

    #[test]
    fn rename_updates_active_layer() {
        let mut c = compositor();
        c.name_selection("Old", Rect::new(0, 0, 2, 2)).unwrap();
        c.select_layer("Old").unwrap();
        assert!(c.rename_layer("Old", "New"));
        assert_eq!(c.active_layer(), Some("New"));
        assert!(!c.rename_layer("Missing", "Other"));
    }

    #[test]
    fn collect_splits_surfaces() {
        let mut c = compositor();
        place_at(&mut c, 29, 1, 0);
        c.name_selection("L", Rect::new(2, 0, 1, 1)).unwrap();
        place_at(&mut c, 89, 2, 0);

        let collected = c.collect(Rect::new(0, 0, 3, 1)).unwrap();
        assert_eq!(collected.base.to_rows(), vec![vec![TileId(0); 3]]);
        assert_eq!(
            collected.features.to_rows(),
            vec![vec![TileId::EMPTY, TileId(29), TileId::EMPTY]]
        );
        assert_eq!(
            collected.combined.to_rows(),
            vec![vec![TileId(0), TileId(29), TileId(89)]]
        );
    }

    #[test]
    fn accepted_write_into_active_layer_is_visible() {
        let mut c = compositor();
        c.name_selection("Yard", Rect::new(0, 0, 6, 6)).unwrap();
        c.name_selection("Shed", Rect::new(1, 1, 2, 2)).unwrap();
        place_at(&mut c, 29, 1, 1);

        // Yard draws above Shed, so its forest tile must make way
        c.select_layer("Shed").unwrap();
        let report = place_at(&mut c, 89, 1, 1);
        assert_eq!(report.changed, vec![Point::new(1, 1)]);
        assert_eq!(c.visible_feature(Point::new(1, 1)), TileId(89));
        assert_eq!(c.flatten_features().get(1, 1), Some(&TileId(89)));
        assert_eq!(c.layers().find("Yard").unwrap().tile_at(Point::new(1, 1)), TileId::EMPTY);
        assert_eq!(c.layers().find("Shed").unwrap().tile_at(Point::new(1, 1)), TileId(89));

        c.undo().unwrap();
        assert_eq!(c.visible_feature(Point::new(1, 1)), TileId(29));
    }

    #[test]
    fn refused_write_leaves_other_layers_alone() {
        let mut c = compositor();
        c.name_selection("Yard", Rect::new(0, 0, 6, 6)).unwrap();
        c.name_selection("Shed", Rect::new(1, 1, 2, 2)).unwrap();
        place_at(&mut c, 89, 1, 1);
        c.select_layer("Shed").unwrap();

        let report = place_at(&mut c, 29, 1, 1);
        assert!(report.changed.is_empty());
        assert_eq!(c.layers().find("Yard").unwrap().tile_at(Point::new(1, 1)), TileId(89));
    }

    #[test]
    fn auto_layer_skips_placements_absorbed_by_layers() {
        let config = CompositorConfig::builder().auto_layer(true).build();
        let mut c = TileCompositor::new(10, 10, config);
        c.name_selection("Yard", Rect::new(0, 0, 6, 6)).unwrap();
        c.drain_events();

        let report = place_at(&mut c, 29, 2, 2);
        assert_eq!(report.changed, vec![Point::new(2, 2)]);
        assert!(report.auto_layer.is_none());
        assert_eq!(c.layers().len(), 1);
        assert!(c.drain_events().is_empty());
    }
}

