use anyhow::Result;
use clap::{Parser, Subcommand};
use knot::{cli, config::Config};
use std::path::PathBuf;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.validate()?;
    cli::init_tracing(&config.log.level)?;

    match cli.command {
        Command::Text(args) => args.run(&config),
        Command::Binary(args) => args.run(&config),
    }
}

#[derive(Parser)]
#[command(
    name = "knot",
    version,
    about = "Turn a move string into a smooth closed Bezier loop"
)]
struct Cli {
    /// Optional configuration file (TOML or JSON).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print one formatted line per control point.
    Text(cli::text::TextArgs),
    /// Write the control points as a packed big-endian blob.
    Binary(cli::binary::BinaryArgs),
}
