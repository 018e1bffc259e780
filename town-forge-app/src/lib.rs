//! Town Forge Application Library
//!
//! Configuration, logging, the editing session with its tool entry points,
//! the command-script runner and canvas output for the Town Forge editor.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod naming;
pub mod output;
pub mod script;
pub mod session;
pub mod visualization;

pub use config::{AppConfig, EditorSettings};
pub use error::AppError;
pub use session::EditorSession;

// Re-export the main function so it can be called from the root crate
pub use crate::app::main;
