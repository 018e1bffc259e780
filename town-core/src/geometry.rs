//! Canvas coordinates, rectangles and selections.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// `self + (dx, dy)`, or `None` if either coordinate would become negative.
    pub const fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        match (
            self.x.checked_add_signed(dx as isize),
            self.y.checked_add_signed(dy as isize),
        ) {
            (Some(x), Some(y)) => Some(Self { x, y }),
            _ => None,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned rectangle: origin plus size, in tiles. Bounds are inclusive,
/// so a 1x1 rect has `min == max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalized rect spanning two corners, inclusive on both axes.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let (min_x, max_x) = (a.x.min(b.x), a.x.max(b.x));
        let (min_y, max_y) = (a.y.min(b.y), a.y.max(b.y));
        Self::new(
            min_x,
            min_y,
            (max_x - min_x).saturating_add(1),
            (max_y - min_y).saturating_add(1),
        )
    }

    pub const fn min_x(&self) -> usize {
        self.x
    }

    pub const fn min_y(&self) -> usize {
        self.y
    }

    pub const fn max_x(&self) -> usize {
        self.x.saturating_add(self.width.saturating_sub(1))
    }

    pub const fn max_y(&self) -> usize {
        self.y.saturating_add(self.height.saturating_sub(1))
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub const fn area(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    /// Inclusive containment: an edge-touching `other` is contained.
    pub const fn contains_rect(&self, other: &Self) -> bool {
        other.min_x() >= self.min_x()
            && other.min_y() >= self.min_y()
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }

    pub const fn contains_point(&self, point: Point) -> bool {
        !self.is_empty()
            && point.x >= self.min_x()
            && point.y >= self.min_y()
            && point.x <= self.max_x()
            && point.y <= self.max_y()
    }

    /// Overlapping part of two rects, if any.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if self.is_empty() || other.is_empty() {
            return None;
        }
        let min_x = self.min_x().max(other.min_x());
        let min_y = self.min_y().max(other.min_y());
        let max_x = self.max_x().min(other.max_x());
        let max_y = self.max_y().min(other.max_y());
        (min_x <= max_x && min_y <= max_y)
            .then(|| {
                Self::new(
                    min_x,
                    min_y,
                    (max_x - min_x).saturating_add(1),
                    (max_y - min_y).saturating_add(1),
                )
            })
    }

    /// Grows the rect by `margin` on every side, clipped to `bounds`.
    pub fn expanded(&self, margin: usize, bounds: &Self) -> Self {
        let grown = Self::from_corners(
            Point::new(self.x.saturating_sub(margin), self.y.saturating_sub(margin)),
            Point::new(
                self.max_x().saturating_add(margin),
                self.max_y().saturating_add(margin),
            ),
        );
        grown.intersection(bounds).unwrap_or_default()
    }

    /// Bounding rect of a set of points; `None` when empty.
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min, mut max) = (*first, *first);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self::from_corners(min, max))
    }

    /// Row-major iteration over every point in the rect. Coordinates past
    /// `usize::MAX` are cut off.
    pub fn points(&self) -> impl Iterator<Item = Point> {
        let Self {
            x,
            y,
            width,
            height,
        } = *self;
        (y..y.saturating_add(height))
            .flat_map(move |py| (x..x.saturating_add(width)).map(move |px| Point::new(px, py)))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) {}x{}", self.x, self.y, self.width, self.height)
    }
}

/// A drag selection between two tile corners, in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Selection {
    pub start: Point,
    pub end: Point,
}

impl Selection {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Normalized bounds: `min..=max` on both axes.
    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.start, self.end)
    }

    /// The selection clipped to `bounds`, or `None` if it lies entirely outside.
    pub fn clamped(&self, bounds: &Rect) -> Option<Rect> {
        self.rect().intersection(bounds)
    }
}

impl From<Rect> for Selection {
    fn from(rect: Rect) -> Self {
        Self::new(
            Point::new(rect.min_x(), rect.min_y()),
            Point::new(rect.max_x(), rect.max_y()),
        )
    }
}
