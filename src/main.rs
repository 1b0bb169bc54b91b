//! csslink - Rebase, cache-bust and merge asset references in stylesheets.

mod asset;
mod cli;
mod config;
mod css;
mod logger;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = Config::load(&cli)?;

    match &cli.command {
        Commands::Bust { file, output, .. } => {
            cli::bust::bust_stylesheet(&config, file, output.as_deref())
        }
        Commands::Merge { files, output, .. } => {
            cli::merge::merge_stylesheets(&config, files, output)
        }
    }
}
