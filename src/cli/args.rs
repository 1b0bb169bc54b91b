//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::asset::BusterKind;

/// Default config file, looked up in the current directory.
pub const DEFAULT_CONFIG: &str = "csslink.toml";

/// Rebase, cache-bust and merge asset references in stylesheets
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path
    #[arg(short = 'C', long, global = true, default_value = DEFAULT_CONFIG, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub paths: PathArgs,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command for resolving asset references.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PathArgs {
    /// Directory relative references are resolved against (default: current directory)
    #[arg(long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub base: Option<PathBuf>,

    /// Server document root, needed for absolute references like `/images/logo.png`
    #[arg(short, long, visible_alias = "web-root", global = true, value_hint = clap::ValueHint::DirPath)]
    pub document_root: Option<PathBuf>,

    /// Local asset host (repeatable). Full URLs must use one of these hosts
    #[arg(short = 'H', long = "host", global = true, value_name = "HOST")]
    pub hosts: Vec<String>,

    /// Scheme for hosts given without one (default: http)
    #[arg(long, global = true)]
    pub protocol: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add cache busters to every url(...) in a stylesheet
    #[command(visible_alias = "b")]
    Bust {
        /// Stylesheet to rewrite
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// Write the result here instead of overwriting FILE
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Cache buster kind: query parameter (soft) or file name (hard)
        #[arg(short = 't', long = "type", value_enum)]
        kind: Option<BusterKind>,

        /// Cache buster parameter name (default: cb)
        #[arg(short, long, conflicts_with = "no_param")]
        param: Option<String>,

        /// Render the bare token (`?1234567890`) without a parameter name
        #[arg(long)]
        no_param: bool,
    },

    /// Merge stylesheets and their @imports into one file
    #[command(visible_alias = "m")]
    Merge {
        /// Stylesheets to merge, in order
        #[arg(required = true, value_hint = clap::ValueHint::FilePath)]
        files: Vec<PathBuf>,

        /// Merged output file
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: PathBuf,

        /// Render every url(...) as a document-root-absolute URL
        #[arg(short, long, conflicts_with = "relative_urls")]
        absolute_urls: bool,

        /// Render every url(...) relative to the output file
        #[arg(short, long)]
        relative_urls: bool,
    },
}
