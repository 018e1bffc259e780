use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use town_core::{CanvasSnapshot, CompositorConfig, TileCompositor};

/// Saves the canvas. A `.json` path gets a full snapshot with layers, any
/// other path gets the flattened tile ids as text.
pub fn save_canvas(canvas: &TileCompositor, output_path: &Path) -> Result<()> {
    let is_json = output_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        save_snapshot(canvas, output_path)
    } else {
        save_rows(canvas, output_path)
    }
}

/// Writes the flattened canvas as text.
///
/// Format: space-separated tile ids along X, one line per row. Empty cells
/// are written as `-1`.
pub fn save_rows(canvas: &TileCompositor, output_path: &Path) -> Result<()> {
    log::info!("Attempting to save canvas rows to {output_path:?}...");

    let file = File::create(output_path)
        .with_context(|| format!("Failed to create output file: {output_path:?}"))?;
    let mut writer = io::BufWriter::new(file);

    for (y, row) in canvas.flatten().rows().enumerate() {
        let line = row
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{line}").with_context(|| format!("Failed to write row {y}"))?;
    }

    writer
        .flush()
        .context("Failed to flush writer for output file")?;
    log::info!("Successfully saved canvas to {output_path:?}");
    Ok(())
}

pub fn save_snapshot(canvas: &TileCompositor, output_path: &Path) -> Result<()> {
    let json = canvas
        .to_snapshot()
        .to_json()
        .context("Failed to serialize canvas snapshot")?;
    fs::write(output_path, json)
        .with_context(|| format!("Failed to write snapshot to {output_path:?}"))?;
    log::info!("Saved canvas snapshot to {output_path:?}");
    Ok(())
}

/// Rebuilds a canvas from a JSON snapshot, layers included.
pub fn load_snapshot(path: &Path, config: CompositorConfig) -> Result<TileCompositor> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {path:?}"))?;
    let snapshot = CanvasSnapshot::from_json(&json)
        .with_context(|| format!("Failed to parse snapshot: {path:?}"))?;
    let canvas = TileCompositor::from_snapshot(&snapshot, config)
        .with_context(|| format!("Invalid snapshot: {path:?}"))?;
    log::info!(
        "Loaded {}x{} canvas with {} layers from {path:?}",
        canvas.width(),
        canvas.height(),
        canvas.layers().len()
    );
    Ok(canvas)
}
