use std::process::ExitCode;

use clap::{Parser, Subcommand};
use commands::{
    paths::{run_paths, PathsArgs},
    report::render_error,
    watch::{run_watch, WatchArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;

/// Report the elements of XML documents by absolute path
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Watch(WatchArgs),
    Paths(PathsArgs),
}

fn main() -> ExitCode {
    // log warnings by default, respecting RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Watch(args) => run_watch(args),
        Commands::Paths(args) => run_paths(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", render_error(&err));
            ExitCode::FAILURE
        }
    }
}
