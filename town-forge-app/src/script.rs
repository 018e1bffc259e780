//! Line-oriented command scripts.
//!
//! One tool invocation per line. Positional arguments come first, generator
//! options are `key=value` pairs, names with spaces are double-quoted and `#`
//! starts a comment:
//!
//! ```text
//! select 0 0 12 10
//! house width=5 height=4 doors=1 windows=2 style=brown
//! name "Old Mill"   # registers the selection as a layer
//! ```

use crate::error::AppError;
use crate::output;
use crate::session::EditorSession;
use crate::visualization::Visualizer;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;
use town_core::generators::{
    BoxOptions, ClearOptions, DecorOptions, FenceOptions, ForestOptions, HouseOptions, TileOptions,
};
use town_core::{GeneratorRequest, Rect, Selection, TileId};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Select(Selection),
    Deselect,
    Generate(GeneratorRequest),
    Undo,
    Name(String),
    Rename { from: String, to: String },
    Delete { name: String, cascade: bool },
    Move { name: String, parent: String },
    SelectLayer(String),
    Layers,
    Describe,
    Say(String),
    Save(PathBuf),
    Show,
}

/// Counts from one script run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    pub commands: usize,
    pub parse_errors: usize,
}

/// Parses one script line. Blank and comment-only lines give `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let trimmed = line.trim();
    if let Some(text) = trimmed.strip_prefix("say ") {
        return Ok(Some(Command::Say(text.trim().to_string())));
    }
    let tokens = tokenize(trimmed)?;
    let Some((head, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let command = match head.as_str() {
        "select" => {
            expect_count(head, args, 4)?;
            Command::Select(Selection::from(Rect::new(
                positional(args, 0, "x")?,
                positional(args, 1, "y")?,
                positional(args, 2, "width")?,
                positional(args, 3, "height")?,
            )))
        }
        "deselect" => no_args(head, args, Command::Deselect)?,
        "house" => Command::Generate(GeneratorRequest::House(house_options(args)?)),
        "forest" => Command::Generate(GeneratorRequest::Forest(forest_options(args)?)),
        "fence" => {
            let mut kv = KeyValues::parse(args)?;
            let options = FenceOptions {
                width: kv.take("width")?,
                height: kv.take("height")?,
            };
            kv.finish(head)?;
            Command::Generate(GeneratorRequest::Fence(options))
        }
        "decor" => {
            let mut kv = KeyValues::parse(args)?;
            let options = DecorOptions {
                chance: kv.take("chance")?,
                x: kv.take("x")?,
                y: kv.take("y")?,
                width: kv.take("width")?,
                height: kv.take("height")?,
            };
            kv.finish(head)?;
            Command::Generate(GeneratorRequest::Decor(options))
        }
        "tile" => {
            expect_count(head, args, 3)?;
            Command::Generate(GeneratorRequest::Tile(TileOptions {
                x: positional(args, 0, "x")?,
                y: positional(args, 1, "y")?,
                tile: TileId(positional(args, 2, "tile")?),
            }))
        }
        "box" => {
            let hollow = args.get(5).is_some_and(|a| a == "hollow");
            if args.len() != 5 && !(args.len() == 6 && hollow) {
                return Err("usage: box X Y WIDTH HEIGHT TILE [hollow]".to_string());
            }
            Command::Generate(GeneratorRequest::Box(BoxOptions {
                x: positional(args, 0, "x")?,
                y: positional(args, 1, "y")?,
                width: positional(args, 2, "width")?,
                height: positional(args, 3, "height")?,
                tile: TileId(positional(args, 4, "tile")?),
                filled: !hollow,
            }))
        }
        "clear" => {
            expect_count(head, args, 4)?;
            Command::Generate(GeneratorRequest::Clear(ClearOptions {
                x: positional(args, 0, "x")?,
                y: positional(args, 1, "y")?,
                width: positional(args, 2, "width")?,
                height: positional(args, 3, "height")?,
            }))
        }
        "undo" => no_args(head, args, Command::Undo)?,
        "name" => {
            expect_count(head, args, 1)?;
            Command::Name(args[0].clone())
        }
        "rename" => {
            expect_count(head, args, 2)?;
            Command::Rename {
                from: args[0].clone(),
                to: args[1].clone(),
            }
        }
        "delete" => {
            let cascade = args.get(1).is_some_and(|a| a == "cascade");
            if args.len() != 1 && !(args.len() == 2 && cascade) {
                return Err("usage: delete NAME [cascade]".to_string());
            }
            Command::Delete {
                name: args[0].clone(),
                cascade,
            }
        }
        "move" => {
            expect_count(head, args, 2)?;
            Command::Move {
                name: args[0].clone(),
                parent: args[1].clone(),
            }
        }
        "select-layer" => {
            expect_count(head, args, 1)?;
            Command::SelectLayer(args[0].clone())
        }
        "layers" => no_args(head, args, Command::Layers)?,
        "describe" => no_args(head, args, Command::Describe)?,
        "show" => no_args(head, args, Command::Show)?,
        "save" => {
            expect_count(head, args, 1)?;
            Command::Save(PathBuf::from(&args[0]))
        }
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(Some(command))
}

fn house_options(args: &[String]) -> Result<HouseOptions, String> {
    let mut kv = KeyValues::parse(args)?;
    let options = HouseOptions {
        x: kv.take("x")?,
        y: kv.take("y")?,
        width: kv.take("width")?,
        height: kv.take("height")?,
        doors: kv.take("doors")?,
        windows: kv.take("windows")?.unwrap_or(0),
        style: kv.take("style")?,
        roof: kv.take("roof")?,
    };
    kv.finish("house")?;
    Ok(options)
}

fn forest_options(args: &[String]) -> Result<ForestOptions, String> {
    let mut kv = KeyValues::parse(args)?;
    let options = ForestOptions {
        x: kv.take("x")?,
        y: kv.take("y")?,
        width: kv.take("width")?,
        height: kv.take("height")?,
        mushrooms: kv.take("mushrooms")?.unwrap_or(0),
        yellow_trees: kv.take("yellow_trees")?.unwrap_or(0),
        green_trees: kv.take("green_trees")?.unwrap_or(0),
    };
    kv.finish("forest")?;
    Ok(options)
}

/// Splits on whitespace, keeping double-quoted runs together and dropping
/// everything after an unquoted `#`.
fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                quoted = true;
            }
            '#' if !in_quotes => break,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() || quoted {
                    tokens.push(std::mem::take(&mut current));
                }
                quoted = false;
            }
            c => current.push(c),
        }
    }
    if in_quotes {
        return Err("unterminated quote".to_string());
    }
    if !current.is_empty() || quoted {
        tokens.push(current);
    }
    Ok(tokens)
}

fn expect_count(command: &str, args: &[String], count: usize) -> Result<(), String> {
    if args.len() == count {
        Ok(())
    } else {
        Err(format!("'{command}' takes {count} argument(s), got {}", args.len()))
    }
}

fn no_args(command: &str, args: &[String], parsed: Command) -> Result<Command, String> {
    expect_count(command, args, 0).map(|()| parsed)
}

fn positional<T>(args: &[String], index: usize, what: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = args
        .get(index)
        .ok_or_else(|| format!("missing {what}"))?;
    raw.parse()
        .map_err(|e| format!("invalid {what} '{raw}': {e}"))
}

/// `key=value` options of one command.
struct KeyValues {
    pairs: BTreeMap<String, String>,
}

impl KeyValues {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut pairs = BTreeMap::new();
        for arg in args {
            let (key, value) = arg
                .split_once('=')
                .ok_or_else(|| format!("expected key=value, got '{arg}'"))?;
            if pairs.insert(key.to_string(), value.to_string()).is_some() {
                return Err(format!("'{key}' given twice"));
            }
        }
        Ok(Self { pairs })
    }

    fn take<T>(&mut self, key: &str) -> Result<Option<T>, String>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.pairs
            .remove(key)
            .map(|raw| {
                raw.parse()
                    .map_err(|e| format!("invalid {key} '{raw}': {e}"))
            })
            .transpose()
    }

    fn finish(self, command: &str) -> Result<(), String> {
        match self.pairs.keys().next() {
            Some(key) => Err(format!("'{command}' has no option '{key}'")),
            None => Ok(()),
        }
    }
}

/// Runs one command against the session and returns its outcome string.
pub async fn execute(
    session: &mut EditorSession,
    command: Command,
    visualizer: &mut dyn Visualizer,
) -> String {
    match command {
        Command::Select(selection) => session.select(selection),
        Command::Deselect => session.clear_selection(),
        Command::Generate(request) => session.generate(request).await,
        Command::Undo => session.undo(),
        Command::Name(name) => session.name_layer(&name),
        Command::Rename { from, to } => session.rename_layer(&from, &to),
        Command::Delete { name, cascade } => session.delete_layer(&name, cascade),
        Command::Move { name, parent } => session.move_layer(&name, &parent),
        Command::SelectLayer(name) => session.select_layer(&name),
        Command::Layers => session.list_layers(),
        Command::Describe => session.describe(),
        Command::Say(text) => session.say(&text),
        Command::Save(path) => match output::save_canvas(session.canvas(), &path) {
            Ok(()) => format!("Saved canvas to {}", path.display()),
            Err(e) => format!("Failed to save: {e:#}"),
        },
        Command::Show => match visualizer.display_state(session.canvas()) {
            Ok(()) => "Shown.".to_string(),
            Err(e) => format!("Failed to display: {e:#}"),
        },
    }
}

/// Executes every line of `reader`, writing each outcome to `out`. Lines that
/// fail to parse are reported and skipped.
pub async fn run_script<R: BufRead, W: Write>(
    session: &mut EditorSession,
    reader: R,
    out: &mut W,
    visualizer: &mut dyn Visualizer,
) -> Result<ScriptSummary, AppError> {
    let mut summary = ScriptSummary::default();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(command)) => {
                log::debug!("line {}: {command:?}", index + 1);
                let outcome = execute(session, command, visualizer).await;
                writeln!(out, "{outcome}")?;
                summary.commands += 1;
            }
            Err(message) => {
                let error = AppError::Script {
                    line: index + 1,
                    message,
                };
                log::warn!("{error}");
                writeln!(out, "Error: {error}")?;
                summary.parse_errors += 1;
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualization::NoopVisualizer;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use town_core::generators::{RoofColor, WallStyle};
    use town_core::{CompositorConfig, TileCompositor};

    #[test]
    fn test_comments_and_blank_lines() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   # just a note"), Ok(None));
        assert_eq!(parse_line("undo # again"), Ok(Some(Command::Undo)));
    }

    #[test]
    fn test_quoted_names() {
        assert_eq!(
            parse_line(r#"rename "Old Mill" "New Mill""#),
            Ok(Some(Command::Rename {
                from: "Old Mill".to_string(),
                to: "New Mill".to_string()
            }))
        );
        assert_eq!(
            parse_line(r#"name "Pond # 2""#),
            Ok(Some(Command::Name("Pond # 2".to_string())))
        );
        assert!(parse_line(r#"name "Pond"#).is_err());
    }

    #[test]
    fn test_house_options() {
        let parsed = parse_line("house width=5 height=4 doors=2 windows=3 style=brown roof=red");
        let expected = HouseOptions {
            width: Some(5),
            height: Some(4),
            doors: Some(2),
            windows: 3,
            style: Some(WallStyle::Brown),
            roof: Some(RoofColor::Red),
            ..HouseOptions::default()
        };
        assert_eq!(
            parsed,
            Ok(Some(Command::Generate(GeneratorRequest::House(expected))))
        );
    }

    #[test]
    fn test_bad_options_are_reported() {
        assert!(parse_line("house colour=blue").unwrap_err().contains("no option 'colour'"));
        assert!(parse_line("house width=wide").unwrap_err().contains("invalid width"));
        assert!(parse_line("fence width=3 width=4").unwrap_err().contains("given twice"));
        assert!(parse_line("select 1 2 3").is_err());
        assert!(parse_line("teleport").unwrap_err().contains("unknown command"));
    }

    #[test]
    fn test_box_and_delete_flags() {
        assert!(matches!(
            parse_line("box 0 0 3 3 45 hollow"),
            Ok(Some(Command::Generate(GeneratorRequest::Box(BoxOptions { filled: false, .. }))))
        ));
        assert!(matches!(
            parse_line(r#"delete "Farm" cascade"#),
            Ok(Some(Command::Delete { cascade: true, .. }))
        ));
        assert!(parse_line("box 0 0 3 3 45 solid").is_err());
    }

    #[test]
    fn test_say_keeps_raw_text() {
        assert_eq!(
            parse_line("say add a \"big\" farm # please"),
            Ok(Some(Command::Say("add a \"big\" farm # please".to_string())))
        );
    }

    #[tokio::test]
    async fn test_run_script_writes_outcomes() {
        let mut session = EditorSession::new(
            TileCompositor::new(12, 10, CompositorConfig::default()),
            StdRng::seed_from_u64(1),
        );
        let script = "\
# build a tiny scene
tile 0 0 29
select 0 0 6 6
tile 0 0 29
bogus line
undo
";
        let mut out = Vec::new();
        let summary = run_script(&mut session, script.as_bytes(), &mut out, &mut NoopVisualizer)
            .await
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(summary, ScriptSummary { commands: 4, parse_errors: 1 });
        assert_eq!(lines[0], crate::session::NO_SELECTION);
        assert_eq!(lines[1], "Selected (0, 0) 6x6");
        assert_eq!(lines[2], "placed 29 at: 0,0");
        assert!(lines[3].starts_with("Error: Script Error on line 5"));
        assert_eq!(lines[4], "undid last task");
    }
}
