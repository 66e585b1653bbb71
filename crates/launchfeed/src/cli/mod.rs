//! Command-line interface for launchfeed.
//!
//! This module provides the CLI structure for the `launchfeed` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, ErrorPageCommand, ListCommand, OutputFormat, RenderCommand};

/// launchfeed - Browse spaceflight launches page by page
///
/// Fetches launch records from the public launch query endpoint and shows
/// them as a listing that grows as you scroll.
#[derive(Debug, Parser)]
#[command(name = "launchfeed")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print launches to the terminal
    List(ListCommand),

    /// Render the listing page as HTML
    Render(RenderCommand),

    /// Render the static error page
    ErrorPage(ErrorPageCommand),

    /// Scroll through launches interactively (Enter loads more, q quits)
    Browse,

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
