//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::summary::SummarizationMode;

/// briefly - Summaries and key takeaways for any text
#[derive(Parser, Debug)]
#[command(name = "briefly")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize text, a file, or standard input
    Summarize(SummarizeArgs),

    /// List the available summarization modes
    Modes,

    /// Daemon management commands
    #[command(subcommand)]
    Daemon(DaemonCommand),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Print a shell completion script
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// Text to summarize (reads standard input when neither TEXT nor --file is given)
    pub text: Option<String>,

    /// Read the text from a file
    #[arg(short, long, conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Summarization mode (defaults to summary.default_mode)
    #[arg(short, long, value_enum)]
    pub mode: Option<SummarizationMode>,

    /// Instruction for the customize mode (defaults to summary.custom_prompt)
    #[arg(short, long)]
    pub instruction: Option<String>,

    /// Translate the result into this language
    #[arg(short, long)]
    pub translate_to: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Send the request through the running daemon
    #[arg(long)]
    pub daemon: bool,

    /// Summarize the daemon's last input again (keeps its mode unless --mode is given)
    #[arg(long, conflicts_with_all = ["text", "file", "instruction"])]
    pub again: bool,
}

#[derive(Subcommand, Debug)]
pub enum DaemonCommand {
    /// Start the background daemon
    Start {
        /// Run in foreground (don't daemonize)
        #[arg(short, long)]
        foreground: bool,
    },

    /// Stop the running daemon
    Stop,

    /// Show whether a summary is in flight
    Status,

    /// Cancel the summary in flight
    Cancel,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
