//! Layer-naming collaborators.
//!
//! A namer turns the size of a freshly auto-created layer plus the user's
//! recent intent into a layer name. Naming runs after the placement is
//! committed, and any failure or timeout leaves the placeholder name in place.

use crate::error::AppError;
use async_trait::async_trait;
use std::time::Duration;

/// Words that never make it into a derived layer name.
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "of", "to", "in", "on", "at", "by", "for", "with", "near",
    "next", "some", "please", "add", "put", "place", "make", "build", "create", "draw", "here",
    "there", "this", "that", "me", "my", "i", "it",
];

/// At most this many words end up in a derived name.
const MAX_NAME_WORDS: usize = 3;

#[async_trait]
pub trait LayerNamer: Send + Sync {
    /// Proposes a name for a `width`x`height` area. `intent` holds recent user
    /// messages, oldest first.
    async fn name_area(
        &self,
        width: usize,
        height: usize,
        intent: &[String],
    ) -> Result<String, AppError>;
}

/// Always answers with the deterministic placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderNamer;

impl PlaceholderNamer {
    pub fn placeholder(width: usize, height: usize) -> String {
        format!("Unnamed Area {width}x{height}")
    }
}

#[async_trait]
impl LayerNamer for PlaceholderNamer {
    async fn name_area(
        &self,
        width: usize,
        height: usize,
        _intent: &[String],
    ) -> Result<String, AppError> {
        Ok(Self::placeholder(width, height))
    }
}

/// Builds a title from the most recent intent, e.g. "add a cozy red house"
/// becomes "Cozy Red House".
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentNamer;

#[async_trait]
impl LayerNamer for IntentNamer {
    async fn name_area(
        &self,
        _width: usize,
        _height: usize,
        intent: &[String],
    ) -> Result<String, AppError> {
        let latest = intent
            .last()
            .ok_or_else(|| AppError::Naming("no recent intent to name from".to_string()))?;
        let words: Vec<String> = latest
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty() && !w.chars().all(|c| c.is_ascii_digit()))
            .filter(|w| !STOP_WORDS.contains(&w.to_lowercase().as_str()))
            .take(MAX_NAME_WORDS)
            .map(title_case)
            .collect();
        if words.is_empty() {
            return Err(AppError::Naming(format!("nothing nameable in '{latest}'")));
        }
        Ok(words.join(" "))
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

/// Asks `namer` for a name, falling back to the placeholder on error, on an
/// empty answer, or when `timeout` elapses.
pub async fn name_or_placeholder(
    namer: &dyn LayerNamer,
    width: usize,
    height: usize,
    intent: &[String],
    timeout: Duration,
) -> String {
    match tokio::time::timeout(timeout, namer.name_area(width, height, intent)).await {
        Ok(Ok(name)) if !name.trim().is_empty() => name.trim().to_string(),
        Ok(Ok(_)) => {
            log::warn!("Layer namer returned an empty name, using placeholder");
            PlaceholderNamer::placeholder(width, height)
        }
        Ok(Err(e)) => {
            log::warn!("Layer naming failed ({e}), using placeholder");
            PlaceholderNamer::placeholder(width, height)
        }
        Err(_) => {
            log::warn!("Layer naming timed out after {}", humantime::format_duration(timeout));
            PlaceholderNamer::placeholder(width, height)
        }
    }
}
