//! MIRA CLI - chat widget tooling.
//!
//! Provides commands for:
//! - `render`: Render markdown to the HTML the widget displays
//! - `request`: Print the chat-completion request a variant would send

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{RenderArgs, RequestArgs};
use output::Output;

/// MIRA - chat widget tooling.
#[derive(Parser)]
#[command(name = "mira", version, about)]
struct Cli {
    /// Enable verbose output (info-level logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render markdown from a file or stdin to HTML.
    Render(RenderArgs),
    /// Print the request body for a message.
    Request(RequestArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(&output),
        Commands::Request(args) => args.execute(&output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
