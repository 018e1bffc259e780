//! Structure discovery and natural-language description of a selection.
//!
//! Each structure kind is flood-filled separately over its own tile set. A
//! flood step may jump up to `struct_range` cells in a cardinal direction, which
//! bridges small gaps such as a door of another palette in a wall. Components
//! below `min_tiles` are noise and dropped. Discovery order is kind order, then
//! row-major position of the first tile, so repeated extraction is stable.

use std::fmt;

use bitvec::prelude::*;
use town_rules::{colors_of, ColorCategory, StructureKind, TileId, STRUCTURE_KINDS};

use crate::geometry::{Point, Rect};
use crate::grid::TileGrid;

pub const DEFAULT_STRUCT_RANGE: usize = 1;
pub const DEFAULT_MIN_STRUCTURE_TILES: usize = 4;

const DIRECTIONS: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactsConfig {
    /// Largest gap, in cells, a flood step may jump.
    pub struct_range: usize,
    /// Smallest component kept as a structure.
    pub min_tiles: usize,
}

impl Default for FactsConfig {
    fn default() -> Self {
        Self {
            struct_range: DEFAULT_STRUCT_RANGE,
            min_tiles: DEFAULT_MIN_STRUCTURE_TILES,
        }
    }
}

/// Inclusive bounds of a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl BoundingBox {
    fn of(points: &[Point]) -> Option<Self> {
        Rect::bounding(points).map(|r| Self {
            min_x: r.min_x(),
            min_y: r.min_y(),
            max_x: r.max_x(),
            max_y: r.max_y(),
        })
    }

    pub const fn width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    pub const fn height(&self) -> usize {
        self.max_y - self.min_y + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substructure {
    pub kind: &'static str,
    pub colors: Vec<ColorCategory>,
}

/// Where a structure lies relative to another one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativePosition {
    /// Label of the other structure, e.g. `house1`.
    pub other: String,
    /// Compass-style direction from the other structure, e.g. `top left`.
    /// Empty when aligned on both axes.
    pub direction: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structure {
    pub kind: &'static str,
    /// 1-based index among structures of the same kind.
    pub id: usize,
    pub bounding_box: BoundingBox,
    pub zone: String,
    pub features: Vec<String>,
    pub substructures: Vec<Substructure>,
    /// Most and second most frequent color of the body tiles.
    pub colors: Vec<ColorCategory>,
    pub relative_positions: Vec<RelativePosition>,
    pub tile_count: usize,
}

impl Structure {
    pub fn label(&self) -> String {
        format!("{}{}", self.kind, self.id)
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.bounding_box;
        write!(
            f,
            "{} ({} tiles, {}x{} at {}, {})",
            self.label(),
            self.tile_count,
            b.width(),
            b.height(),
            b.min_x,
            b.min_y
        )
    }
}

/// Thirds of the selection: `top left` through `bottom right`, with the middle
/// cell reported as plain `center`.
pub fn map_zone(point: Point, width: usize, height: usize) -> String {
    let (w, h) = (width as f64 / 3.0, height as f64 / 3.0);
    let (x, y) = (point.x as f64, point.y as f64);
    let vertical = if y < h {
        "top"
    } else if y < 2.0 * h {
        "center"
    } else {
        "bottom"
    };
    let horizontal = if x < w {
        "left"
    } else if x < 2.0 * w {
        "center"
    } else {
        "right"
    };
    if vertical == horizontal {
        "center".to_string()
    } else {
        format!("{vertical} {horizontal}")
    }
}

/// Direction of `subject` as seen from `reference`, comparing top-left corners.
pub fn relative_direction(reference: &BoundingBox, subject: &BoundingBox) -> String {
    use std::cmp::Ordering;

    let vertical = match subject.min_y.cmp(&reference.min_y) {
        Ordering::Less => Some("top"),
        Ordering::Greater => Some("bottom"),
        Ordering::Equal => None,
    };
    let horizontal = match subject.min_x.cmp(&reference.min_x) {
        Ordering::Less => Some("left"),
        Ordering::Greater => Some("right"),
        Ordering::Equal => None,
    };
    [vertical, horizontal]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
}

/// "a", "a and b", "a, b, and c".
fn english_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{a} and {b}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

fn join_colors(colors: &[ColorCategory]) -> String {
    colors
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Up to two most frequent colors among `tiles`, earlier table entries winning ties.
fn dominant_colors(tiles: impl IntoIterator<Item = TileId>) -> Vec<ColorCategory> {
    let mut counts = [0usize; ColorCategory::ALL.len()];
    for tile in tiles {
        for color in colors_of(tile) {
            counts[color.index()] += 1;
        }
    }
    let mut top = Vec::with_capacity(2);
    for _ in 0..2 {
        let best = ColorCategory::ALL
            .iter()
            .filter(|c| !top.contains(*c) && counts[c.index()] > 0)
            .fold(None, |best: Option<ColorCategory>, &c| match best {
                Some(b) if counts[b.index()] >= counts[c.index()] => Some(b),
                _ => Some(c),
            });
        match best {
            Some(color) => top.push(color),
            None => break,
        }
    }
    top
}

/// One sentence per structure, chained by relative position.
pub fn describe_paragraph(structures: &[Structure]) -> String {
    let mut sentences = Vec::with_capacity(structures.len());
    for (i, s) in structures.iter().enumerate() {
        let mut sentence = match i.checked_sub(1).map(|p| &structures[p]) {
            None => "There is a".to_string(),
            Some(prev) => {
                let direction = relative_direction(&prev.bounding_box, &s.bounding_box);
                if direction.is_empty() {
                    format!("Next to that {}, there is a", prev.kind)
                } else {
                    format!("To the {direction} of that {}, there is a", prev.kind)
                }
            }
        };
        if !s.colors.is_empty() {
            sentence.push(' ');
            sentence.push_str(&join_colors(&s.colors));
        }
        sentence.push_str(&format!(
            " {} at the {} of the selection box",
            s.kind, s.zone
        ));

        let substructures: Vec<String> = s
            .substructures
            .iter()
            .map(|sub| {
                if sub.colors.is_empty() {
                    format!("a {}", sub.kind)
                } else {
                    format!("a {} {}", join_colors(&sub.colors), sub.kind)
                }
            })
            .collect();
        if !substructures.is_empty() {
            sentence.push_str(" with ");
            sentence.push_str(&english_list(&substructures));
        }
        if !s.features.is_empty() {
            sentence.push_str(if substructures.is_empty() { " with " } else { ", " });
            sentence.push_str(&english_list(&s.features));
        }
        sentence.push('.');
        sentences.push(sentence);
    }
    sentences.join(" ").trim().to_string()
}

/// Finds and describes structures in a flattened grid. Read-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorldFactsExtractor {
    config: FactsConfig,
}

impl WorldFactsExtractor {
    pub const fn new(config: FactsConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &FactsConfig {
        &self.config
    }

    /// Discovers every structure in `grid`, in a fixed order.
    pub fn extract(&self, grid: &TileGrid) -> Vec<Structure> {
        let mut structures = Vec::new();
        for kind in &STRUCTURE_KINDS {
            for (i, component) in self.components(grid, kind).into_iter().enumerate() {
                if let Some(structure) = Self::build(grid, kind, i + 1, &component) {
                    structures.push(structure);
                }
            }
        }

        let boxes: Vec<(String, BoundingBox)> = structures
            .iter()
            .map(|s| (s.label(), s.bounding_box))
            .collect();
        for (i, s) in structures.iter_mut().enumerate() {
            s.relative_positions = boxes
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, (label, other))| RelativePosition {
                    other: label.clone(),
                    direction: relative_direction(other, &s.bounding_box),
                })
                .collect();
        }
        log::debug!(
            "Extracted {} structures from {}x{} grid",
            structures.len(),
            grid.width,
            grid.height
        );
        structures
    }

    /// Paragraph describing `grid`; empty when nothing is recognized.
    pub fn describe(&self, grid: &TileGrid) -> String {
        describe_paragraph(&self.extract(grid))
    }

    fn components(&self, grid: &TileGrid, kind: &StructureKind) -> Vec<Vec<Point>> {
        let mut visited = bitvec![0; grid.width * grid.height];
        let mut found = Vec::new();
        for (x, y, &tile) in grid.cells() {
            if visited[y * grid.width + x] || !kind.contains(tile) {
                continue;
            }
            let component = self.flood_fill(grid, kind, Point::new(x, y), &mut visited);
            if component.len() >= self.config.min_tiles {
                found.push(component);
            }
        }
        found
    }

    fn flood_fill(
        &self,
        grid: &TileGrid,
        kind: &StructureKind,
        start: Point,
        visited: &mut BitVec,
    ) -> Vec<Point> {
        let bounds = grid.bounds();
        let mut component = Vec::new();
        let mut stack = vec![start];
        while let Some(p) = stack.pop() {
            let idx = p.y * grid.width + p.x;
            if visited[idx] || !grid.get_point(p).is_some_and(|t| kind.contains(*t)) {
                continue;
            }
            visited.set(idx, true);
            component.push(p);
            for (dx, dy) in DIRECTIONS {
                for step in 1..=self.config.struct_range as i32 {
                    if let Some(next) = p.offset(dx * step, dy * step) {
                        if bounds.contains_point(next) {
                            stack.push(next);
                        }
                    }
                }
            }
        }
        component
    }

    fn build(
        grid: &TileGrid,
        kind: &StructureKind,
        id: usize,
        positions: &[Point],
    ) -> Option<Structure> {
        let first = *positions.first()?;
        let bounding_box = BoundingBox::of(positions)?;
        let tiles: Vec<TileId> = positions
            .iter()
            .filter_map(|&p| grid.get_point(p).copied())
            .collect();

        let features = kind
            .features
            .iter()
            .filter_map(|(name, ids)| {
                let count = tiles.iter().filter(|t| ids.contains(&t.0)).count();
                match count {
                    0 => None,
                    1 => Some(format!("1 {name}")),
                    n => Some(format!("{n} {name}s")),
                }
            })
            .collect();

        let substructures = kind
            .substructures
            .iter()
            .map(|(name, ids)| Substructure {
                kind: *name,
                colors: dominant_colors(tiles.iter().copied().filter(|t| ids.contains(&t.0))),
            })
            .collect();

        let colors = dominant_colors(tiles.iter().copied().filter(|&t| kind.is_body_tile(t)));

        Some(Structure {
            kind: kind.name,
            id,
            bounding_box,
            zone: map_zone(first, grid.width, grid.height),
            features,
            substructures,
            colors,
            relative_positions: Vec::new(),
            tile_count: positions.len(),
        })
    }
}
