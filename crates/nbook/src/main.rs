//! nbook CLI - build books from markdown and notebooks.
//!
//! Provides commands for:
//! - `build`: Build a whole book from its table of contents
//! - `page`: Build a single page as a stand-alone document
//! - `toc`: Generate a `_toc.yml` from a content folder
//! - `create`: Create a starter book

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, CreateArgs, PageArgs, TocArgs};
use output::Output;

/// nbook - build books from markdown and notebooks.
#[derive(Parser)]
#[command(name = "nbook", version, about)]
struct Cli {
    /// Enable verbose output (info-level logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a book from its table of contents.
    Build(BuildArgs),
    /// Build a single page.
    Page(PageArgs),
    /// Generate a table of contents for a content folder.
    Toc(TocArgs),
    /// Create a starter book.
    Create(CreateArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Page(args) => args.execute(),
        Commands::Toc(args) => args.execute(),
        Commands::Create(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
