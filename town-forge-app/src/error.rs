use thiserror::Error;
use town_core::CoreError;
use town_rules::LoadError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Core Error: {0}")]
    Core(#[from] CoreError),

    #[error("Dictionary Error: {0}")]
    Dictionary(#[from] LoadError),

    #[error("Script Error on line {line}: {message}")]
    Script { line: usize, message: String },

    #[error("Naming Error: {0}")]
    Naming(String),

    #[error("Visualization Error: {0}")]
    Visualization(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
