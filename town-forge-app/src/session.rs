//! The editing session: the tool-style surface of the editor.
//!
//! Every tool returns a short outcome string, whether it succeeded or not, so
//! the result can be shown to a user or fed back into a conversation. Tools
//! that touch tiles refuse to run without a selection.

use crate::naming::{name_or_placeholder, LayerNamer, PlaceholderNamer};
use rand::rngs::StdRng;
use std::collections::VecDeque;
use std::time::Duration;
use town_core::compositor::AutoLayer;
use town_core::generators::{
    BoxOptions, ClearOptions, DecorOptions, FenceOptions, ForestOptions, HouseOptions, TileOptions,
};
use town_core::{
    CompletedSection, GeneratorRequest, LayerEvent, Rect, Selection,
    TileCompositor, WorldFactsExtractor,
};
use town_rules::TileDictionary;

pub const NO_SELECTION: &str = "Error: No selection. Select an area first.";

/// How many recent user messages are kept for layer naming.
pub const MAX_INTENTS: usize = 5;

pub struct EditorSession {
    canvas: TileCompositor,
    selection: Option<Rect>,
    rng: StdRng,
    dictionary: TileDictionary,
    extractor: WorldFactsExtractor,
    namer: Box<dyn LayerNamer>,
    naming_timeout: Duration,
    intents: VecDeque<String>,
    events: Vec<LayerEvent>,
}

impl EditorSession {
    pub fn new(canvas: TileCompositor, rng: StdRng) -> Self {
        Self {
            canvas,
            selection: None,
            rng,
            dictionary: TileDictionary::new(),
            extractor: WorldFactsExtractor::default(),
            namer: Box::new(PlaceholderNamer),
            naming_timeout: Duration::from_secs(2),
            intents: VecDeque::new(),
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_dictionary(mut self, dictionary: TileDictionary) -> Self {
        self.dictionary = dictionary;
        self
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: WorldFactsExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    #[must_use]
    pub fn with_namer(mut self, namer: Box<dyn LayerNamer>, timeout: Duration) -> Self {
        self.namer = namer;
        self.naming_timeout = timeout;
        self
    }

    pub const fn canvas(&self) -> &TileCompositor {
        &self.canvas
    }

    pub const fn selection(&self) -> Option<Rect> {
        self.selection
    }

    /// Layer events seen since the last call.
    pub fn take_events(&mut self) -> Vec<LayerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Remembers a free-text user message for layer naming.
    pub fn say(&mut self, text: &str) -> String {
        if self.intents.len() == MAX_INTENTS {
            self.intents.pop_front();
        }
        self.intents.push_back(text.trim().to_string());
        "Noted.".to_string()
    }

    pub fn select(&mut self, selection: Selection) -> String {
        match selection.clamped(&self.canvas.bounds()) {
            Some(rect) => {
                self.selection = Some(rect);
                log::debug!("Selection set to {rect}");
                format!("Selected {rect}")
            }
            None => format!("Error: Selection {} is outside the canvas.", selection.rect()),
        }
    }

    pub fn clear_selection(&mut self) -> String {
        self.selection = None;
        self.canvas.clear_active_layer();
        "Selection cleared.".to_string()
    }

    pub async fn house(&mut self, options: HouseOptions) -> String {
        self.generate(GeneratorRequest::House(options)).await
    }

    pub async fn forest(&mut self, options: ForestOptions) -> String {
        self.generate(GeneratorRequest::Forest(options)).await
    }

    pub async fn fence(&mut self, options: FenceOptions) -> String {
        self.generate(GeneratorRequest::Fence(options)).await
    }

    pub async fn decor(&mut self, options: DecorOptions) -> String {
        self.generate(GeneratorRequest::Decor(options)).await
    }

    pub async fn place_tile(&mut self, options: TileOptions) -> String {
        self.generate(GeneratorRequest::Tile(options)).await
    }

    pub async fn place_box(&mut self, options: BoxOptions) -> String {
        self.generate(GeneratorRequest::Box(options)).await
    }

    pub async fn clear(&mut self, options: ClearOptions) -> String {
        self.generate(GeneratorRequest::Clear(options)).await
    }

    /// Runs a generator over the selection and places the result.
    pub async fn generate(&mut self, request: GeneratorRequest) -> String {
        let Some(area) = self.selection else {
            log::warn!("{} requested without a selection", request.kind());
            return NO_SELECTION.to_string();
        };
        let (section, report) = match self.canvas.apply(&request, area, &mut self.rng) {
            Ok(result) => result,
            Err(e) => {
                log::warn!("{} failed: {e}", request.kind());
                return format!("Failed to place {}: {e}", request.kind());
            }
        };

        let mut outcome = self.outcome(&request, &section);
        if !report.pruned.is_empty() {
            outcome.push_str(&format!(" Removed {} orphaned tiles.", report.pruned.len()));
        }
        if let Some(auto) = &report.auto_layer {
            let name = self.name_auto_layer(auto).await;
            if auto.created {
                outcome.push_str(&format!(" Layer \"{name}\" created."));
            } else {
                outcome.push_str(&format!(" Merged into layer \"{name}\"."));
            }
        }
        self.collect_events();
        log::info!("{}: {outcome}", request.kind());
        outcome
    }

    fn outcome(&self, request: &GeneratorRequest, section: &CompletedSection) -> String {
        match request {
            GeneratorRequest::House(_) => {
                let point = |key: &str| {
                    section
                        .points_of_interest
                        .get(key)
                        .map_or((0, 0), |p| (p.x, p.y))
                };
                let (x, y) = point("origin");
                let (cx, cy) = point("entrance");
                format!("House added. at: ({x}, {y}). the connection point is at: ({cx}, {cy}).")
            }
            GeneratorRequest::Forest(_) => format!("Forest added. {}.", section.description),
            GeneratorRequest::Fence(_) => "Fence added successfully".to_string(),
            GeneratorRequest::Decor(_) => section.description.clone(),
            GeneratorRequest::Tile(o) => {
                format!("placed {} at: {},{}", self.dictionary.label(o.tile), o.x, o.y)
            }
            GeneratorRequest::Box(o) => format!(
                "placed box of {} at: {},{} with width: {} and height: {}",
                self.dictionary.label(o.tile),
                o.x,
                o.y,
                o.width,
                o.height
            ),
            GeneratorRequest::Clear(o) => format!(
                "cleared at: {},{} with width: {} and height: {}",
                o.x, o.y, o.width, o.height
            ),
        }
    }

    /// Gives a freshly created auto-layer a real name. The placement is
    /// already committed, so a failing namer only leaves the placeholder.
    async fn name_auto_layer(&mut self, auto: &AutoLayer) -> String {
        if !auto.created {
            return auto.name.clone();
        }
        let Some(rect) = self.canvas.layers().find(&auto.name).map(|node| node.rect()) else {
            return auto.name.clone();
        };
        let intents: Vec<String> = self.intents.iter().cloned().collect();
        let proposed = name_or_placeholder(
            self.namer.as_ref(),
            rect.width,
            rect.height,
            &intents,
            self.naming_timeout,
        )
        .await;
        if proposed != auto.name && self.canvas.rename_layer(&auto.name, &proposed) {
            proposed
        } else {
            auto.name.clone()
        }
    }

    pub fn undo(&mut self) -> String {
        match self.canvas.undo() {
            Ok(_) => {
                log::info!("undo restored the previous canvas");
                self.collect_events();
                "undid last task".to_string()
            }
            Err(e) => {
                log::warn!("undo failed: {e}");
                "Nothing to undo.".to_string()
            }
        }
    }

    /// Saves the selection as a named layer.
    pub fn name_layer(&mut self, name: &str) -> String {
        let Some(area) = self.selection else {
            return NO_SELECTION.to_string();
        };
        let outcome = match self.canvas.name_selection(name, area) {
            Ok(()) => format!("Layer \"{name}\" created."),
            Err(e) => {
                log::warn!("naming {area} as '{name}' failed: {e}");
                format!("Failed to name layer: {e}")
            }
        };
        self.collect_events();
        outcome
    }

    pub fn rename_layer(&mut self, old: &str, new: &str) -> String {
        let outcome = if self.canvas.rename_layer(old, new) {
            format!("Layer \"{old}\" renamed to \"{new}\".")
        } else {
            log::warn!("rename '{old}' -> '{new}' refused");
            format!("Could not rename layer \"{old}\" to \"{new}\".")
        };
        self.collect_events();
        outcome
    }

    /// Deletes a layer. Without `cascade` its children move up a level and
    /// its tiles stay on the map.
    pub fn delete_layer(&mut self, name: &str, cascade: bool) -> String {
        let outcome = if self.canvas.delete_layer(name, cascade) {
            format!("Layer \"{name}\" deleted.")
        } else {
            log::warn!("delete of '{name}' refused");
            format!("Layer \"{name}\" not found.")
        };
        self.collect_events();
        outcome
    }

    pub fn move_layer(&mut self, name: &str, parent: &str) -> String {
        let outcome = if self.canvas.move_layer(name, parent) {
            format!("Layer \"{name}\" moved under \"{parent}\".")
        } else {
            log::warn!("move of '{name}' under '{parent}' refused");
            format!("Could not move layer \"{name}\" under \"{parent}\".")
        };
        self.collect_events();
        outcome
    }

    /// Focuses a layer and makes its rectangle the selection.
    pub fn select_layer(&mut self, name: &str) -> String {
        let outcome = match self.canvas.select_layer(name) {
            Some(rect) => {
                self.selection = Some(rect);
                format!("Layer \"{name}\" selected.")
            }
            None => {
                log::warn!("select of unknown layer '{name}'");
                format!("Layer \"{name}\" not found.")
            }
        };
        self.collect_events();
        outcome
    }

    pub fn list_layers(&self) -> String {
        self.canvas.list_layers()
    }

    /// Describes the structures in the selection, or the whole canvas when
    /// nothing is selected.
    pub fn describe(&self) -> String {
        let area = self.selection.unwrap_or_else(|| self.canvas.bounds());
        let grid = match self.canvas.collect(area) {
            Ok(collected) => collected.layered,
            Err(e) => return format!("Failed to describe: {e}"),
        };
        let text = self.extractor.describe(&grid);
        if text.is_empty() {
            "Nothing notable here.".to_string()
        } else {
            text
        }
    }

    fn collect_events(&mut self) {
        for event in self.canvas.drain_events() {
            log::info!("{event}");
            self.events.push(event);
        }
    }
}
