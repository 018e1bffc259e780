//! # Town Forge (Binary)
//!
//! Main executable entry point.

fn main() -> anyhow::Result<()> {
    town_forge_app::main()
}
