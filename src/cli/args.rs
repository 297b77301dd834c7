//! Command-line argument parsing for aromabot
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

/// aromabot - Ask Aroma's AI assistant about the menu, allergens, hours, catering, or policies
#[derive(Parser, Debug)]
#[command(name = "aromabot")]
#[command(version)]
#[command(about = "Answer restaurant questions from an indexed corpus", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Source text to index (overrides config)
    #[arg(long, global = true)]
    pub source: Option<PathBuf>,

    /// Index directory (overrides config)
    #[arg(long, global = true)]
    pub index_dir: Option<PathBuf>,

    /// Number of passages to retrieve (overrides config)
    #[arg(long, global = true)]
    pub top_k: Option<usize>,

    /// Chat model (overrides config)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Verbosity level: default (warnings), -v (info), -vv (debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand (defaults to the interactive session)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Build the vector index from the source text
    Build,

    /// Ask a single question
    Ask {
        /// The question
        #[arg(value_name = "QUESTION", required = true, num_args = 1..)]
        question: Vec<String>,

        /// Also print the supporting passages
        #[arg(long)]
        sources: bool,
    },

    /// Start the interactive session
    Start,

    /// Run health checks
    Doctor,

    /// Display the effective configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Subcommand to run, `Start` when none was given
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Start)
    }

    /// Apply command-line overrides on top of a loaded config
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(source) = &self.source {
            config.index.source_path = source.clone();
        }
        if let Some(index_dir) = &self.index_dir {
            config.index.index_dir = index_dir.clone();
        }
        if let Some(top_k) = self.top_k {
            config.index.top_k = top_k;
        }
        if let Some(model) = &self.model {
            config.provider.chat_model = model.clone();
        }
    }
}

impl Verbosity {
    /// Default tracing filter directive
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "aromabot=info,warn",
            Verbosity::VeryVerbose => "aromabot=debug,info",
        }
    }

    /// Check if should show progress spinners
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}
