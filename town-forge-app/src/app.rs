// town-forge-app/src/app.rs

use crate::config::{AppConfig, EditorSettings, VisualizationMode};
use crate::logging;
use crate::naming::IntentNamer;
use crate::output;
use crate::script::run_script;
use crate::session::EditorSession;
use crate::visualization::{NoopVisualizer, TerminalVisualizer, Visualizer};
use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::{self, BufReader};
use town_core::{TileCompositor, WorldFactsExtractor};
use town_rules::loader::load_from_file;
use town_rules::TileDictionary;

/// Parses the command line, sets up logging and runs the editor to completion.
pub fn main() -> Result<()> {
    let config = AppConfig::parse();
    logging::init_logger(config.global_log_level, config.session_log_level);

    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    runtime.block_on(run(config))
}

/// Runs one editing session: builds the canvas, executes the script and
/// saves the result.
pub async fn run(config: AppConfig) -> Result<()> {
    log::info!("Town Forge starting");
    let settings = EditorSettings::resolve(&config)?;
    log::debug!("Resolved settings: {settings:?}");

    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut canvas = match &config.load {
        Some(path) => output::load_snapshot(path, settings.compositor_config())?,
        None => TileCompositor::new(settings.width, settings.height, settings.compositor_config()),
    };
    canvas.fill_base(&mut rng);
    log::info!("Canvas ready: {}x{}", canvas.width(), canvas.height());

    let dictionary = match &config.dictionary {
        Some(path) => load_from_file(path)?,
        None => TileDictionary::new(),
    };

    let mut session = EditorSession::new(canvas, rng)
        .with_dictionary(dictionary)
        .with_extractor(WorldFactsExtractor::new(settings.facts_config()))
        .with_namer(Box::new(IntentNamer), settings.naming_timeout()?);

    let mut visualizer: Box<dyn Visualizer> = match config.visualization_mode {
        VisualizationMode::None => Box::new(NoopVisualizer),
        VisualizationMode::Terminal => Box::new(TerminalVisualizer::new()),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = match &config.script {
        Some(path) => {
            log::info!("Running script {path:?}");
            let file = File::open(path)
                .with_context(|| format!("Failed to open script: {path:?}"))?;
            run_script(&mut session, BufReader::new(file), &mut out, visualizer.as_mut()).await?
        }
        None => {
            log::info!("Reading commands from stdin");
            run_script(&mut session, io::stdin().lock(), &mut out, visualizer.as_mut()).await?
        }
    };
    log::info!(
        "Script finished: {} commands, {} parse errors",
        summary.commands,
        summary.parse_errors
    );

    if config.visualization_mode == VisualizationMode::Terminal {
        visualizer.display_state(session.canvas())?;
    }

    if let Some(path) = &config.output_path {
        output::save_canvas(session.canvas(), path)?;
    }

    log::info!("Town Forge finished.");
    Ok(())
}
