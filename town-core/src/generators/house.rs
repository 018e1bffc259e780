//! House generator: a roof cap row, a roof body row, then wall rows with
//! windows and doors. Wall and roof palettes are selected by tile offset.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use town_rules::TileId;

use super::{
    check_optional, check_range, CompletedSection, FeatureGenerator, GenerateError,
    GeneratorInput, PointOfInterest, BORDER_PADDING,
};

pub const MIN_HOUSE_SIZE: usize = 3;
pub const MAX_HOUSE_SIZE: usize = 20;
pub const MAX_DOORS: usize = 4;
pub const MAX_WINDOWS: usize = 20;

// Gray wall / red roof tiles; other palettes are offsets from these.
const ROOF_LEFT: i32 = 52;
const ROOF_MIDDLE: i32 = 53;
const ROOF_RIGHT: i32 = 54;
const CHIMNEY: i32 = 55;
const EAVES_LEFT: i32 = 64;
const EAVES_MIDDLE: i32 = 65;
const EAVES_RIGHT: i32 = 66;
const AWNING: i32 = 67;
const WALL_LEFT: i32 = 76;
const WALL: i32 = 77;
const WALL_RIGHT: i32 = 79;
const WINDOW: i32 = 88;
const DOOR: i32 = 89;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallStyle {
    Gray,
    Brown,
}

impl WallStyle {
    const fn offset(self) -> i32 {
        match self {
            Self::Gray => 0,
            Self::Brown => -4,
        }
    }

    /// Roof used when none is requested.
    pub const fn default_roof(self) -> RoofColor {
        match self {
            Self::Gray => RoofColor::Red,
            Self::Brown => RoofColor::Gray,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoofColor {
    Red,
    Gray,
}

impl RoofColor {
    const fn offset(self) -> i32 {
        match self {
            Self::Red => 0,
            Self::Gray => -4,
        }
    }
}

impl FromStr for WallStyle {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gray" | "grey" => Ok(Self::Gray),
            "brown" => Ok(Self::Brown),
            other => Err(GenerateError::InvalidArgument(format!(
                "unknown wall style '{other}' (expected gray or brown)"
            ))),
        }
    }
}

impl FromStr for RoofColor {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" => Ok(Self::Red),
            "gray" | "grey" => Ok(Self::Gray),
            other => Err(GenerateError::InvalidArgument(format!(
                "unknown roof color '{other}' (expected red or gray)"
            ))),
        }
    }
}

impl fmt::Display for WallStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gray => "gray",
            Self::Brown => "brown",
        })
    }
}

impl fmt::Display for RoofColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Red => "red",
            Self::Gray => "gray",
        })
    }
}

/// Options for [`HouseGenerator`]. Unset fields are chosen at random.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HouseOptions {
    pub x: Option<usize>,
    pub y: Option<usize>,
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub doors: Option<usize>,
    pub windows: usize,
    pub style: Option<WallStyle>,
    pub roof: Option<RoofColor>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HouseGenerator;

impl FeatureGenerator for HouseGenerator {
    type Options = HouseOptions;

    fn name(&self) -> &'static str {
        "house"
    }

    fn validate(&self, options: &HouseOptions) -> Result<(), GenerateError> {
        check_optional("width", options.width, MIN_HOUSE_SIZE, MAX_HOUSE_SIZE)?;
        check_optional("height", options.height, MIN_HOUSE_SIZE, MAX_HOUSE_SIZE)?;
        check_optional("doors", options.doors, 1, MAX_DOORS)?;
        check_range("windows", options.windows, 0, MAX_WINDOWS)
    }

    fn generate<R: Rng>(
        &self,
        input: &GeneratorInput,
        options: &HouseOptions,
        rng: &mut R,
    ) -> Result<CompletedSection, GenerateError> {
        let usable_w = input.width().saturating_sub(2 * BORDER_PADDING);
        let usable_h = input.height().saturating_sub(2 * BORDER_PADDING);
        if usable_w < MIN_HOUSE_SIZE || usable_h < MIN_HOUSE_SIZE {
            return Err(GenerateError::SelectionTooSmall {
                feature: "house",
                min_width: MIN_HOUSE_SIZE,
                min_height: MIN_HOUSE_SIZE,
            });
        }

        let width = match options.width {
            Some(w) => w.min(usable_w),
            None => rng.gen_range(MIN_HOUSE_SIZE..=usable_w.min(MAX_HOUSE_SIZE)),
        };
        let height = match options.height {
            Some(h) => h.min(usable_h),
            None => rng.gen_range(MIN_HOUSE_SIZE..=usable_h.min(MAX_HOUSE_SIZE)),
        };
        let max_x = input.width() - width - BORDER_PADDING;
        let max_y = input.height() - height - BORDER_PADDING;
        let x = match options.x {
            Some(x) => x.clamp(BORDER_PADDING, max_x),
            None => rng.gen_range(BORDER_PADDING..=max_x),
        };
        let y = match options.y {
            Some(y) => y.clamp(BORDER_PADDING, max_y),
            None => rng.gen_range(BORDER_PADDING..=max_y),
        };

        let style = options.style.unwrap_or_else(|| {
            if rng.gen_bool(0.5) {
                WallStyle::Brown
            } else {
                WallStyle::Gray
            }
        });
        let roof_color = options.roof.unwrap_or_else(|| style.default_roof());
        let wall = |base: i32| TileId(base + style.offset());
        let roof = |base: i32| TileId(base + roof_color.offset());

        // -1 means no chimney
        let chimney = usize::try_from(rng.gen_range(-1..width as i64)).ok();

        let mut grid = input.grid.clone();
        let right = x + width - 1;
        let bottom = y + height - 1;

        for px in x..=right {
            let (cap, eaves) = if px == x {
                (ROOF_LEFT, EAVES_LEFT)
            } else if px == right {
                (ROOF_RIGHT, EAVES_RIGHT)
            } else {
                (ROOF_MIDDLE, EAVES_MIDDLE)
            };
            grid.set(px, y, roof(cap));
            grid.set(px, y + 1, roof(eaves));
        }
        if let Some(cx) = chimney {
            grid.set(x + cx, y, roof(CHIMNEY));
        }

        let door_slots: Vec<usize> = (x + 1..right).collect();
        let door_count = options.doors.unwrap_or(1).min(door_slots.len());
        let mut doors: Vec<usize> = door_slots
            .choose_multiple(rng, door_count)
            .copied()
            .collect();
        doors.sort_unstable();

        let mut wall_cells = Vec::new();
        for py in y + 2..=bottom {
            grid.set(x, py, wall(WALL_LEFT));
            grid.set(right, py, wall(WALL_RIGHT));
            wall_cells.extend((x + 1..right).map(|px| (px, py)));
        }
        // door cells never hold a window
        let window_slots: Vec<(usize, usize)> = wall_cells
            .iter()
            .copied()
            .filter(|&(px, py)| py != bottom || !doors.contains(&px))
            .collect();
        let windows: BTreeSet<(usize, usize)> = window_slots
            .choose_multiple(rng, options.windows)
            .copied()
            .collect();
        for &(px, py) in &wall_cells {
            let tile = if windows.contains(&(px, py)) { WINDOW } else { WALL };
            grid.set(px, py, wall(tile));
        }

        let description = format!(
            "A {width}x{height} {style} house with a {roof_color} roof, {} door(s) and {} window(s)",
            doors.len(),
            windows.len()
        );
        for &dx in &doors {
            grid.set(dx, bottom, wall(DOOR));
            grid.set(dx, y + 1, roof(AWNING));
        }

        let mut section = CompletedSection::new("House", description, grid)
            .with_point("origin", PointOfInterest::new(x, y))
            .with_point("entrance", PointOfInterest::new(x + width / 2, y + height));
        for (i, &dx) in doors.iter().enumerate() {
            section
                .points_of_interest
                .insert(format!("door{}", i + 1), PointOfInterest::new(dx, bottom));
        }
        Ok(section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn options(width: usize, height: usize) -> HouseOptions {
        HouseOptions {
            width: Some(width),
            height: Some(height),
            ..HouseOptions::default()
        }
    }

    #[test]
    fn smallest_house_fills_padded_selection() {
        let mut rng = StdRng::seed_from_u64(7);
        let input = GeneratorInput::blank(5, 5);
        let section = HouseGenerator.run(&input, &options(3, 3), &mut rng).unwrap();

        for (x, y, tile) in section.grid.cells() {
            let inside = (1..=3).contains(&x) && (1..=3).contains(&y);
            assert_eq!(tile.is_concrete(), inside, "cell ({x}, {y})");
        }
        // walls flank the only door slot on the bottom row
        let bottom: Vec<i32> = (1..=3)
            .map(|x| section.grid.get(x, 3).unwrap().0)
            .collect();
        assert!(bottom == vec![76, 89, 79] || bottom == vec![72, 85, 75]);
        assert_eq!(section.points_of_interest["door1"], PointOfInterest::new(2, 3));
        assert_eq!(section.points_of_interest["entrance"], PointOfInterest::new(2, 4));
    }

    #[test]
    fn brown_house_gets_gray_roof_by_default() {
        let mut rng = StdRng::seed_from_u64(1);
        let opts = HouseOptions {
            style: Some(WallStyle::Brown),
            ..options(4, 4)
        };
        let section = HouseGenerator
            .run(&GeneratorInput::blank(8, 8), &opts, &mut rng)
            .unwrap();
        let roof_row: Vec<i32> = section
            .grid
            .cells()
            .filter(|(_, _, t)| t.is_concrete())
            .map(|(_, _, t)| t.0)
            .take(4)
            .collect();
        assert!(roof_row.iter().all(|t| (48..=51).contains(t)));
    }

    #[test]
    fn too_small_selection_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = HouseGenerator
            .run(&GeneratorInput::blank(4, 9), &HouseOptions::default(), &mut rng)
            .unwrap_err();
        assert_eq!(err.to_string(), "Selection is too small for a 3x3 house");
    }

    #[test]
    fn out_of_range_options_are_rejected_before_generation() {
        let mut rng = StdRng::seed_from_u64(0);
        let opts = HouseOptions {
            doors: Some(5),
            ..HouseOptions::default()
        };
        assert!(matches!(
            HouseGenerator.run(&GeneratorInput::blank(10, 10), &opts, &mut rng),
            Err(GenerateError::OutOfRange { name: "doors", .. })
        ));
    }

    #[test]
    fn requested_windows_and_doors_are_placed() {
        let mut rng = StdRng::seed_from_u64(42);
        let opts = HouseOptions {
            doors: Some(2),
            windows: 3,
            style: Some(WallStyle::Gray),
            ..options(6, 5)
        };
        let section = HouseGenerator
            .run(&GeneratorInput::blank(10, 10), &opts, &mut rng)
            .unwrap();
        let count = |id: i32| section.grid.cells().filter(|(_, _, t)| t.0 == id).count();
        assert_eq!(count(89), 2);
        assert_eq!(count(67), 2);
        assert_eq!(count(88), 3);
        assert!(section.description.ends_with("2 door(s) and 3 window(s)"));
        assert!(section.points_of_interest.contains_key("door2"));
    }

    #[test]
    fn same_seed_same_house() {
        let input = GeneratorInput::blank(12, 12);
        let a = HouseGenerator
            .run(&input, &HouseOptions::default(), &mut StdRng::seed_from_u64(9))
            .unwrap();
        let b = HouseGenerator
            .run(&input, &HouseOptions::default(), &mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn window_count_matches_tiles_when_walls_are_full() {
        // a 3x3 house has one wall cell, which the door takes
        let mut rng = StdRng::seed_from_u64(3);
        let opts = HouseOptions {
            windows: 5,
            style: Some(WallStyle::Gray),
            ..options(3, 3)
        };
        let section = HouseGenerator
            .run(&GeneratorInput::blank(5, 5), &opts, &mut rng)
            .unwrap();
        let windows = section.grid.cells().filter(|(_, _, t)| t.0 == 88).count();
        assert_eq!(windows, 0);
        assert!(section.description.ends_with("1 door(s) and 0 window(s)"));
    }
}
