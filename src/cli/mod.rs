//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Parser, Subcommand};
pub use clap_complete::Shell;
use iocscout::detect::IndicatorType;

pub mod args;
pub mod cache;
pub mod context;
pub mod detect;
pub mod settings;

pub use args::{GlobalOptions, OutputFormat};
pub use context::CommandContext;

/// iocscout - find indicators of compromise in text and manage the lookup cache
#[derive(Parser, Debug)]
#[command(name = "iocscout")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "IOCSCOUT_FORMAT",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: Option<OutputFormat>,

    /// Override config file location
    #[arg(long, global = true, env = "IOCSCOUT_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Override cache directory
    #[arg(long, global = true, env = "IOCSCOUT_CACHE_DIR", hide_env = true)]
    pub cache_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true, env = "IOCSCOUT_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find indicators of compromise in text
    #[command(after_help = "\
Examples:
  iocscout detect 'beacon to 8.8.8.8 and evil.example.com'
  iocscout detect --file report.txt --type ipv4,domain
  cat alert.log | iocscout detect --format json")]
    Detect {
        /// Text to scan (reads stdin when neither TEXT nor --file is given)
        #[arg(conflicts_with = "file")]
        text: Option<String>,

        /// Read the text to scan from a file
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,

        /// Only report these indicator types (comma-separated)
        #[arg(long = "type", short = 't', value_delimiter = ',')]
        types: Vec<IndicatorType>,
    },

    /// Manage the local lookup cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Show or change cache settings
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Generate shell completions (static)
    #[command(after_help = "\
  bash:   iocscout completion bash > /etc/bash_completion.d/iocscout
  zsh:    iocscout completion zsh > \"${fpath[1]}/_iocscout\"
  fish:   iocscout completion fish > ~/.config/fish/completions/iocscout.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Display version information
    Version,
}

/// Cache management subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache statistics
    Status,
    /// Clear all cached results
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Drop day buckets older than the retention window
    Clean,
    /// Print cache database path
    Path,
}

/// Cache settings subcommands
#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show current cache settings
    Show,
    /// Update cache settings
    Set {
        /// Days of results to keep (1 to 365)
        #[arg(long)]
        retention_days: Option<u32>,

        /// Enable or disable result caching
        #[arg(long)]
        enabled: Option<bool>,
    },
}
