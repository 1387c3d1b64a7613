use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod engine;
mod graph;
mod parser;
mod tui;

#[derive(Debug, Parser)]
#[command(name = "foxhunt", version, about = "Hunt a hidden fox on a graph, one probe a day")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the interactive board (the demo board when no file is given)
    Play {
        /// Graph file to load
        graph: Option<PathBuf>,
        /// Open the built-in demo board
        #[arg(long, conflicts_with = "graph")]
        demo: bool,
    },
    /// Parse a graph file and print a summary
    Check {
        /// Graph file to check
        graph: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Play {
        graph: None,
        demo: false,
    }) {
        Command::Play { graph, .. } => commands::play::run(graph.as_deref()),
        Command::Check { graph } => commands::check::run(&graph),
    }
}
