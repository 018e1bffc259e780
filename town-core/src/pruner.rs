//! Removes broken multi-tile shapes.
//!
//! A tile that belongs to a multi-tile tree requires its partner tiles at fixed
//! offsets. After an edit, any such tile whose partners are missing (or would
//! sit outside the canvas) is erased, so half-trees never survive.

use town_rules::{neighbor_contract, TileId};

use crate::geometry::{Point, Rect};
use crate::grid::{Grid, TileGrid};

/// Default number of passes before the pruner gives up on reaching a fixed point.
pub const DEFAULT_MAX_PASSES: usize = 8;

/// Read/erase access to a flattened tile view.
pub trait TileSurface {
    /// Canvas extent.
    fn bounds(&self) -> Rect;
    /// Visible tile at `point`, `EMPTY` if none.
    fn tile_at(&self, point: Point) -> TileId;
    /// Erases whatever is visible at `point`.
    fn erase(&mut self, point: Point);
}

impl TileSurface for TileGrid {
    fn bounds(&self) -> Rect {
        Grid::bounds(self)
    }

    fn tile_at(&self, point: Point) -> TileId {
        self.get_point(point).copied().unwrap_or(TileId::EMPTY)
    }

    fn erase(&mut self, point: Point) {
        self.set(point.x, point.y, TileId::EMPTY);
    }
}

/// Enforces neighbor contracts over a region.
#[derive(Debug, Clone, Copy)]
pub struct StructurePruner {
    max_passes: usize,
}

impl Default for StructurePruner {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PASSES)
    }
}

impl StructurePruner {
    pub const fn new(max_passes: usize) -> Self {
        Self { max_passes }
    }

    /// True when `point` holds a multi-tile tile with a missing partner.
    pub fn is_broken<S: TileSurface + ?Sized>(surface: &S, point: Point) -> bool {
        let Some(contract) = neighbor_contract(surface.tile_at(point)) else {
            return false;
        };
        let bounds = surface.bounds();
        contract.iter().any(|req| {
            match point.offset(req.dx, req.dy) {
                Some(neighbor) if bounds.contains_point(neighbor) => {
                    surface.tile_at(neighbor) != req.expected
                }
                _ => true,
            }
        })
    }

    /// One pass: collects every broken tile in `region`, then erases them all.
    /// Erasing after the scan keeps the result independent of scan order.
    pub fn prune_pass<S: TileSurface + ?Sized>(&self, surface: &mut S, region: Rect) -> Vec<Point> {
        let Some(region) = region.intersection(&surface.bounds()) else {
            return Vec::new();
        };
        let broken: Vec<Point> = region
            .points()
            .filter(|&p| Self::is_broken(surface, p))
            .collect();
        for &point in &broken {
            surface.erase(point);
        }
        broken
    }

    /// Repeats passes until nothing changes, at most `max_passes` times.
    pub fn prune<S: TileSurface + ?Sized>(&self, surface: &mut S, region: Rect) -> Vec<Point> {
        let mut removed = Vec::new();
        for pass in 0..self.max_passes {
            let erased = self.prune_pass(surface, region);
            if erased.is_empty() {
                break;
            }
            log::trace!("Prune pass {pass} erased {} tiles in {region}", erased.len());
            removed.extend(erased);
        }
        if !removed.is_empty() {
            log::debug!("Pruned {} orphaned tiles in {region}", removed.len());
        }
        removed
    }
}
