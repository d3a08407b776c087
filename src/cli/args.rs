//! Command-line arguments and subcommands for the `sassy` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "sassy",
    version,
    about = "Expand Sass-style @mixin / @include in style sheets."
)]
pub struct SassyArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Expand every @include and print the resulting style sheet.
    Expand {
        #[command(flatten)]
        input: InputArgs,
        /// Write the result to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show each expansion step as a coloured diff.
    Trace {
        #[command(flatten)]
        input: InputArgs,
    },
    /// List every mixin available to a style sheet.
    List {
        #[command(flatten)]
        input: InputArgs,
    },
}

/// Input file plus the options shared by every subcommand.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// The style sheet to process.
    #[arg(required = true)]
    pub file: PathBuf,
    /// Options file (.json, .yaml or .yml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Directory of mixin data files. Repeatable.
    #[arg(long = "mixins-dir", value_name = "DIR")]
    pub mixins_dir: Vec<PathBuf>,
    /// Glob pattern of mixin data files. Repeatable.
    #[arg(long = "mixins-files", value_name = "GLOB")]
    pub mixins_files: Vec<String>,
    /// Drop calls to undefined mixins instead of failing.
    #[arg(long)]
    pub silent: bool,
    /// Maximum nesting depth of expansions.
    #[arg(long, value_name = "N", conflicts_with = "no_depth_limit")]
    pub max_depth: Option<usize>,
    /// Disable the expansion depth guard.
    #[arg(long)]
    pub no_depth_limit: bool,
}
