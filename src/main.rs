// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod cli;

#[derive(Parser)]
#[command(name = "depthview")]
#[command(about = "Real-time viewer for depth+color sensors")]
#[command(version = depthview::constants::app_info::version())]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    view: cli::ViewArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// List available sensors
    List {
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=depthview=trace, RUST_LOG=info
    // Logs go to stderr so they stay out of the terminal display's way
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::List { json }) => cli::list_sensors(json),
        None => cli::run_viewer(&cli.view),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("depthview: {}", e);
            ExitCode::FAILURE
        }
    }
}
