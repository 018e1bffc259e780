use crate::error::AppError;
use clap::{Parser, ValueEnum};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use town_core::compositor::DEFAULT_PRUNE_MARGIN;
use town_core::facts::{DEFAULT_MIN_STRUCTURE_TILES, DEFAULT_STRUCT_RANGE};
use town_core::{CompositorConfig, FactsConfig, TieBreak};

/// Prefix of the environment variables read into [`EditorSettings`].
pub const ENV_PREFIX: &str = "TOWN_FORGE_";

/// Represents the different visualization modes available.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VisualizationMode {
    #[default]
    None,
    /// Colored character map printed after the script finishes.
    Terminal,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::Trace,
            LogLevel::Debug => Self::Debug,
            LogLevel::Info => Self::Info,
            LogLevel::Warn => Self::Warn,
            LogLevel::Error => Self::Error,
        }
    }
}

/// Command line of the Town Forge editor.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    /// Optional TOML file with editor settings.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Command script to run. Reads stdin when omitted.
    #[arg(short, long, value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Width of the canvas in tiles.
    #[arg(long)]
    pub width: Option<usize>,

    /// Height of the canvas in tiles.
    #[arg(long)]
    pub height: Option<usize>,

    /// Optional seed for the random number generator.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Tile dictionary (.json or .ron) used to label tool outcomes.
    #[arg(long, value_name = "FILE")]
    pub dictionary: Option<PathBuf>,

    /// Path to save the final canvas. `.json` writes a snapshot, anything else text rows.
    #[arg(short, long, value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// JSON snapshot to start from instead of a blank canvas.
    #[arg(long, value_name = "FILE")]
    pub load: Option<PathBuf>,

    /// Register every placement as a named layer.
    #[arg(long, default_value_t = false)]
    pub auto_layer: bool,

    /// Which write wins on equal priority.
    #[arg(long, value_enum)]
    pub tie_break: Option<TieBreak>,

    /// Largest gap a structure may bridge when describing the map.
    #[arg(long)]
    pub struct_range: Option<usize>,

    /// How long to wait for a layer name (e.g., "2s", "500ms").
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub naming_timeout: Option<Duration>,

    /// Choose the visualization mode.
    #[arg(long, value_enum, default_value_t = VisualizationMode::None)]
    pub visualization_mode: VisualizationMode,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub global_log_level: LogLevel,

    /// Level of the per-tool transcript.
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub session_log_level: LogLevel,
}

/// CLI values that take part in settings resolution. Unset flags are skipped
/// so they never mask lower layers.
#[derive(Serialize, Debug, Default)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    auto_layer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tie_break: Option<TieBreak>,
    #[serde(skip_serializing_if = "Option::is_none")]
    struct_range: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    naming_timeout: Option<String>,
}

impl AppConfig {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            width: self.width,
            height: self.height,
            seed: self.seed,
            auto_layer: self.auto_layer.then_some(true),
            tie_break: self.tie_break,
            struct_range: self.struct_range,
            naming_timeout: self
                .naming_timeout
                .map(|d| humantime::format_duration(d).to_string()),
        }
    }
}

/// Editor settings after merging defaults, the config file, the environment
/// and the command line, in that order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EditorSettings {
    pub width: usize,
    pub height: usize,
    pub seed: Option<u64>,
    pub auto_layer: bool,
    pub tie_break: TieBreak,
    pub prune_margin: usize,
    pub struct_range: usize,
    pub min_structure_tiles: usize,
    /// Humantime duration, e.g. "2s".
    pub naming_timeout: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            width: 40,
            height: 25,
            seed: None,
            auto_layer: false,
            tie_break: TieBreak::IncomingWins,
            prune_margin: DEFAULT_PRUNE_MARGIN,
            struct_range: DEFAULT_STRUCT_RANGE,
            min_structure_tiles: DEFAULT_MIN_STRUCTURE_TILES,
            naming_timeout: "2s".to_string(),
        }
    }
}

impl EditorSettings {
    pub fn resolve(cli: &AppConfig) -> Result<Self, AppError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = &cli.config {
            if !path.exists() {
                return Err(AppError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }
        let settings: Self = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(cli.overrides()))
            .extract()
            .map_err(|e| AppError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.width == 0 || self.height == 0 {
            return Err(AppError::Config(format!(
                "canvas must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        self.naming_timeout()?;
        Ok(())
    }

    pub fn naming_timeout(&self) -> Result<Duration, AppError> {
        humantime::parse_duration(&self.naming_timeout)
            .map_err(|e| AppError::Config(format!("naming_timeout '{}': {e}", self.naming_timeout)))
    }

    pub fn compositor_config(&self) -> CompositorConfig {
        CompositorConfig::builder()
            .tie_break(self.tie_break)
            .auto_layer(self.auto_layer)
            .prune_margin(self.prune_margin)
            .build()
    }

    pub const fn facts_config(&self) -> FactsConfig {
        FactsConfig {
            struct_range: self.struct_range,
            min_tiles: self.min_structure_tiles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_basic_args() {
        let args = vec!["town-forge", "--width", "20", "--output-path", "out.txt"];
        let config = AppConfig::try_parse_from(args).unwrap();
        assert_eq!(config.width, Some(20));
        assert_eq!(config.height, None);
        assert_eq!(config.output_path, Some(PathBuf::from("out.txt")));
        assert!(!config.auto_layer);
        assert_eq!(config.naming_timeout, None);
        assert_eq!(config.visualization_mode, VisualizationMode::None);
        assert_eq!(config.global_log_level, LogLevel::Info);
    }

    #[test]
    fn test_naming_timeout() {
        let args = vec!["town-forge", "--naming-timeout", "750ms"];
        let config = AppConfig::try_parse_from(args).unwrap();
        assert_eq!(config.naming_timeout, Some(Duration::from_millis(750)));
        assert!(AppConfig::try_parse_from(vec!["town-forge", "--naming-timeout", "soon"]).is_err());
    }

    #[test]
    fn test_tie_break_and_visualization_mode() {
        let args = vec![
            "town-forge",
            "--tie-break",
            "existing",
            "--visualization-mode",
            "terminal",
        ];
        let config = AppConfig::try_parse_from(args).unwrap();
        assert_eq!(config.tie_break, Some(TieBreak::ExistingWins));
        assert_eq!(config.visualization_mode, VisualizationMode::Terminal);

        let args_err = vec!["town-forge", "--tie-break", "random"];
        assert!(AppConfig::try_parse_from(args_err).is_err());
    }

    #[test]
    fn test_defaults_without_sources() {
        Jail::expect_with(|_jail| {
            let cli = AppConfig::try_parse_from(vec!["town-forge"]).unwrap();
            let settings = EditorSettings::resolve(&cli).unwrap();
            assert_eq!(settings, EditorSettings::default());
            assert_eq!(settings.naming_timeout().unwrap(), Duration::from_secs(2));
            Ok(())
        });
    }

    #[test]
    fn test_layers_merge_in_order() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "town.toml",
                r#"
                width = 30
                height = 20
                auto_layer = true
                tie_break = "existing"
                "#,
            )?;
            jail.set_env("TOWN_FORGE_HEIGHT", "12");
            jail.set_env("TOWN_FORGE_STRUCT_RANGE", "3");

            let cli = AppConfig::try_parse_from(vec![
                "town-forge",
                "--config",
                "town.toml",
                "--struct-range",
                "2",
            ])
            .unwrap();
            let settings = EditorSettings::resolve(&cli).unwrap();
            assert_eq!(settings.width, 30);
            assert_eq!(settings.height, 12);
            assert_eq!(settings.struct_range, 2);
            assert!(settings.auto_layer);
            assert_eq!(settings.tie_break, TieBreak::ExistingWins);
            assert!(settings.compositor_config().auto_layer);
            Ok(())
        });
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        Jail::expect_with(|_jail| {
            let cli = AppConfig::try_parse_from(vec!["town-forge", "--config", "nope.toml"]).unwrap();
            assert!(matches!(EditorSettings::resolve(&cli), Err(AppError::Config(_))));
            Ok(())
        });
    }

    #[test]
    fn test_zero_sized_canvas_is_rejected() {
        Jail::expect_with(|_jail| {
            let cli = AppConfig::try_parse_from(vec!["town-forge", "--width", "0"]).unwrap();
            assert!(EditorSettings::resolve(&cli).is_err());
            Ok(())
        });
    }
}
