//! lumen-studio: compositing, snapshots and an interactive mesh viewer on top
//! of lumen-engine.

mod composite;
mod scene;
mod snapshot;
mod viewer;

use anyhow::Result;
use clap::{Parser, Subcommand};
use lumen_engine::logging::{init_logging, LoggingConfig};

#[derive(Parser)]
#[command(name = "lumen-studio", version, about)]
struct Cli {
    /// Log at debug level (RUST_LOG still wins when set).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Blend a foreground image over a background image.
    Composite(composite::CompositeArgs),

    /// Render the mesh offscreen and save it as an image.
    Snapshot(snapshot::SnapshotArgs),

    /// Open the interactive mesh viewer.
    View(viewer::ViewArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(LoggingConfig::default().verbose(cli.verbose));

    match cli.command {
        Command::Composite(args) => composite::run(&args),
        Command::Snapshot(args) => snapshot::run(&args),
        Command::View(args) => viewer::run(args),
    }
}
