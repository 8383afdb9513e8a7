/// CLI argument definitions for the `sscore` command.
///
/// Defines all subcommands, their arguments, and long help text
/// using the `clap` derive macros.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::cli_help;

/// Top-level CLI parser with a single subcommand selector.
#[derive(Parser)]
#[command(name = "sscore", version, about = "Score, diff and trace model test reports")]
pub struct Cli {
    /// Settings file (default: ./suitescore.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments shared by the report commands.
#[derive(Args)]
pub struct OutputArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// All available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Score a report and print the result tree
    #[command(long_about = cli_help::SCORE)]
    Score {
        /// Report file or http(s) URL
        report: String,

        /// Reference report to show deltas against
        #[arg(long)]
        reference: Option<String>,

        /// Deepest tree level to show (1 = top-level sections)
        #[arg(long)]
        depth: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Compare a report against a reference report
    #[command(long_about = cli_help::DIFF)]
    Diff {
        /// Current report file or URL
        current: String,

        /// Reference report file or URL
        reference: String,

        /// Treat score changes up to this size as unchanged
        #[arg(long)]
        epsilon: Option<f64>,

        /// Only list identifiers whose status is not `unchanged`
        #[arg(long)]
        changed_only: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the history series of a test
    #[command(long_about = cli_help::HISTORY)]
    History {
        /// Report file or URL
        report: String,

        /// Test identifier (default: overall score)
        id: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        shell: Shell,
    },
}
