//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use crate::render::{RenderFormat, RenderMode};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// sosumi-rs: offline WWDC session retrieval.
///
/// Searches an encrypted transcript corpus and renders sessions for humans
/// or agents. Works fully offline once the bundle is installed.
#[derive(Parser, Debug)]
#[command(name = "sosumi-rs")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the encrypted bundle or a plain .db file.
    ///
    /// Defaults to the standard search path (working directory, ~/.sosumi,
    /// executable resources).
    #[arg(long, global = true)]
    pub bundle: Option<PathBuf>,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search WWDC session transcripts.
    Wwdc {
        /// Search query.
        query: String,

        /// Output verbosity.
        #[arg(long, value_enum, default_value_t = Verbosity::Detailed)]
        verbosity: Verbosity,

        /// Output format.
        #[arg(long, value_enum, default_value_t = FormatArg::Markdown)]
        format: FormatArg,

        /// Maximum number of results (1-1000).
        #[arg(long)]
        limit: Option<usize>,

        /// Result offset for paging.
        #[arg(long)]
        offset: Option<usize>,
    },

    /// Show one session by id.
    Session {
        /// Session id, e.g. wwdc2024-10102.
        id: String,

        /// Rendering mode.
        #[arg(long, value_enum, default_value_t = ModeArg::User)]
        mode: ModeArg,

        /// Output format.
        #[arg(long, value_enum, default_value_t = FormatArg::Markdown)]
        format: FormatArg,
    },

    /// List sessions from a conference year.
    Year {
        /// Conference year (2003-2030).
        year: i32,

        /// Rendering mode.
        #[arg(long, value_enum, default_value_t = ModeArg::Compact)]
        mode: ModeArg,

        /// Output format.
        #[arg(long, value_enum, default_value_t = FormatArg::Markdown)]
        format: FormatArg,

        /// Maximum number of sessions (1-1000).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show corpus statistics.
    Stats {
        /// Output format.
        #[arg(long, value_enum, default_value_t = FormatArg::Markdown)]
        format: FormatArg,
    },
}

/// Search verbosity, mapped onto rendering modes.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// One line per session.
    Compact,
    /// Summaries with links.
    Detailed,
    /// Full transcripts.
    Full,
}

/// Rendering mode argument. `compact-agent` is experimental.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// One line per session.
    Compact,
    /// Human-facing summary.
    User,
    /// Full fidelity for agents.
    Agent,
    /// Dense agent digest (experimental).
    CompactAgent,
}

/// Output format argument.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable Markdown.
    Markdown,
    /// Machine-readable JSON.
    Json,
}

impl From<Verbosity> for RenderMode {
    fn from(v: Verbosity) -> Self {
        match v {
            Verbosity::Compact => Self::Compact,
            Verbosity::Detailed => Self::User,
            Verbosity::Full => Self::Agent,
        }
    }
}

impl From<ModeArg> for RenderMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Compact => Self::Compact,
            ModeArg::User => Self::User,
            ModeArg::Agent => Self::Agent,
            ModeArg::CompactAgent => Self::CompactAgent,
        }
    }
}

impl From<FormatArg> for RenderFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Markdown => Self::Markdown,
            FormatArg::Json => Self::Json,
        }
    }
}

impl Cli {
    /// The output format of the selected subcommand, used to shape error
    /// output.
    #[must_use]
    pub const fn render_format(&self) -> RenderFormat {
        let format = match &self.command {
            Commands::Wwdc { format, .. }
            | Commands::Session { format, .. }
            | Commands::Year { format, .. }
            | Commands::Stats { format, .. } => format,
        };
        match format {
            FormatArg::Markdown => RenderFormat::Markdown,
            FormatArg::Json => RenderFormat::Json,
        }
    }
}
