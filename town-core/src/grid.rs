#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use town_rules::TileId;

use crate::geometry::{Point, Rect};

/// Dense row-major 2D grid.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Grid<T> {
    pub width: usize,
    pub height: usize,
    pub(crate) data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    /// Creates a new grid with the given dimensions, initialized with default values.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }

    /// Copies the cells covered by `rect` into a new grid of the rect's size.
    /// Cells of `rect` that fall outside this grid are left at their default.
    pub fn sub_grid(&self, rect: Rect) -> Self {
        let mut out = Self::new(rect.width, rect.height);
        for (lx, ly) in out.coords() {
            if let Some(value) = self.get(rect.x + lx, rect.y + ly) {
                out.set(lx, ly, value.clone());
            }
        }
        out
    }
}

impl<T: Clone> Grid<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Builds a grid from rows. Returns `None` for ragged input.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Option<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != width) {
            return None;
        }
        Some(Self {
            width,
            height,
            data: rows.into_iter().flatten().collect(),
        })
    }

    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.rows().map(<[T]>::to_vec).collect()
    }

    /// Writes `value` at `(x, y)`. Returns false (and writes nothing) when out of bounds.
    pub fn set(&mut self, x: usize, y: usize, value: T) -> bool {
        match self.get_mut(x, y) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }
}

impl<T> Grid<T> {
    /// Returns an immutable reference to the element at the given coordinates,
    /// or None if the coordinates are out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        self.index(x, y).and_then(|idx| self.data.get(idx))
    }

    /// Returns a mutable reference to the element at the given coordinates,
    /// or None if the coordinates are out of bounds.
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        self.index(x, y).and_then(move |idx| self.data.get_mut(idx))
    }

    pub fn get_point(&self, point: Point) -> Option<&T> {
        self.get(point.x, point.y)
    }

    pub const fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        // chunks() rejects a zero chunk size
        self.data.chunks(self.width.max(1))
    }

    /// Row-major coordinates of every cell.
    pub fn coords(&self) -> impl Iterator<Item = (usize, usize)> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| (x, y)))
    }

    /// Row-major iteration over `(x, y, &value)`.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width.max(1);
        self.data
            .iter()
            .enumerate()
            .map(move |(idx, value)| (idx % width, idx / width, value))
    }

    /// Calculates the 1D index for the given 2D coordinates.
    /// Returns None if the coordinates are out of bounds.
    fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }
}

/// Grid of tile ids. `TileId::default()` is `EMPTY`, so `TileGrid::new` is blank.
pub type TileGrid = Grid<TileId>;

impl TileGrid {
    /// Number of cells holding something other than `EMPTY`.
    pub fn occupied(&self) -> usize {
        self.data.iter().filter(|t| !t.is_empty()).count()
    }
}
