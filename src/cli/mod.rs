//! Command-line interface.

mod investigate;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{Config, Settings};

#[derive(Parser)]
#[command(name = "gramscope")]
#[command(about = "Rate-governed Instagram profile analytics")]
#[command(version)]
pub struct Cli {
    /// Data directory for reports
    #[arg(long, global = true, env = "GRAMSCOPE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Directory holding the saved session file
    #[arg(long, global = true, env = "GRAMSCOPE_SESSION_DIR")]
    session_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a profile and export a report
    Investigate {
        /// Username to investigate
        username: String,
        /// Maximum posts to analyze
        #[arg(short, long)]
        max_posts: Option<usize>,
        /// Report formats to write
        #[arg(short, long, value_enum, default_value = "both")]
        format: ReportFormat,
        /// Skip the random human-like delay between requests
        #[arg(long)]
        no_humanize: bool,
    },

    /// Show session state and the governor configuration
    Status,
}

/// Report export format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Json,
    Markdown,
    Both,
}

impl ReportFormat {
    pub fn includes_json(self) -> bool {
        matches!(self, ReportFormat::Json | ReportFormat::Both)
    }

    pub fn includes_markdown(self) -> bool {
        matches!(self, ReportFormat::Markdown | ReportFormat::Both)
    }
}

/// Parse arguments and dispatch to the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::default();
    if let Some(dir) = cli.data_dir {
        settings.data_dir = dir;
    }
    if let Some(dir) = cli.session_dir {
        settings.session_dir = dir;
    }

    let mut config = Config::load(&settings.data_dir)?;

    match cli.command {
        Commands::Investigate {
            username,
            max_posts,
            format,
            no_humanize,
        } => {
            // CLI overrides apply once, before anything is constructed.
            if no_humanize {
                config.rate_limit.humanize = false;
            }
            if let Some(max) = max_posts {
                config.limits.max_posts = max;
            }
            investigate::cmd_investigate(&settings, &config, &username, format).await
        }
        Commands::Status => status::cmd_status(&settings, &config),
    }
}
