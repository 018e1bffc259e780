//! Logging setup for the application.

use crate::config::LogLevel;
use env_logger::{Builder, Env};

/// Module that logs the tool transcript of an editing session.
pub const SESSION_MODULE: &str = "town_forge_app::session";

/// Initializes the logger from the configured levels.
///
/// The session transcript gets its own filter so tool outcomes can be traced
/// without turning on debug output for the whole engine. Directives from
/// `RUST_LOG` are applied last and win over both levels.
pub fn init_logger(global: LogLevel, session: LogLevel) {
    let mut builder = Builder::new();
    builder.filter_level(global.into());
    builder.filter_module(SESSION_MODULE, session.into());
    builder.parse_env(Env::default());

    if let Err(e) = builder.try_init() {
        eprintln!("Logger already initialized: {e}");
        return;
    }

    log::debug!("Logger initialized with global log level: {global:?}, session log level: {session:?}");
}
