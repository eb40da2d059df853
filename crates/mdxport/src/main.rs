//! mdxport CLI - Documentation bundle to MDX converter.
//!
//! Provides commands for:
//! - `convert`: Convert a documentation bundle into an MDX tree
//! - `list`: List the documents and assets inside a bundle

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConvertArgs, ListArgs};
use output::Output;

/// mdxport - Documentation bundle to MDX converter.
#[derive(Parser)]
#[command(name = "mdxport", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a documentation bundle into an MDX tree.
    Convert(ConvertArgs),
    /// List the documents and assets inside a bundle.
    List(ListArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Convert(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Convert(args) => args.execute(),
        Commands::List(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
