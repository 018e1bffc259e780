use colored::{ColoredString, Colorize};
use std::io::{self, Write};
use town_core::{TileCompositor, TileGrid, TileId};
use town_rules::{colors_of, priority_of, ColorCategory, Priority};

/// Trait for types that can present the state of a canvas.
pub trait Visualizer {
    /// Displays the flattened canvas.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the display was successful.
    /// * `Err(anyhow::Error)` if writing the frame failed.
    fn display_state(&mut self, canvas: &TileCompositor) -> Result<(), anyhow::Error>;
}

/// Does nothing. Used when visualization is turned off.
#[derive(Debug, Default)]
pub struct NoopVisualizer;

impl Visualizer for NoopVisualizer {
    fn display_state(&mut self, _canvas: &TileCompositor) -> Result<(), anyhow::Error> {
        Ok(())
    }
}

/// Prints the canvas as one glyph per tile, colored by its color category.
pub struct TerminalVisualizer<W: Write = io::Stdout> {
    out: W,
    show_layers: bool,
}

impl TerminalVisualizer {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for TerminalVisualizer {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> TerminalVisualizer<W> {
    pub const fn with_writer(out: W) -> Self {
        Self {
            out,
            show_layers: true,
        }
    }

    /// Toggles the layer outline printed under the map.
    pub fn set_show_layers(&mut self, show: bool) {
        self.show_layers = show;
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Visualizer for TerminalVisualizer<W> {
    fn display_state(&mut self, canvas: &TileCompositor) -> Result<(), anyhow::Error> {
        writeln!(self.out, "--- {}x{} ---", canvas.width(), canvas.height())?;
        writeln!(self.out, "{}", render(&canvas.flatten()))?;
        if self.show_layers && !canvas.layers().is_empty() {
            writeln!(self.out, "{}", canvas.list_layers())?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// One line per row, no trailing newline.
pub fn render(grid: &TileGrid) -> String {
    grid.rows()
        .map(|row| row.iter().map(|&tile| glyph(tile).to_string()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

fn glyph(tile: TileId) -> ColoredString {
    let symbol = match priority_of(tile) {
        Priority::Empty => ".",
        Priority::Grass => ",",
        Priority::Forest => "T",
        Priority::Decor => "*",
        Priority::Fence => "#",
        Priority::House => "H",
    };
    match colors_of(tile).next() {
        Some(ColorCategory::Red) => symbol.red(),
        Some(ColorCategory::Yellow) => symbol.yellow(),
        Some(ColorCategory::Brown) => symbol.truecolor(150, 95, 45),
        Some(ColorCategory::Green) => symbol.green(),
        Some(ColorCategory::Gray) => symbol.bright_black(),
        None => symbol.normal(),
    }
}
