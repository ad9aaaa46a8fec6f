//! briefly - Summaries and key takeaways for any text
//!
//! Entry point for the briefly CLI application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use briefly::cli::commands;
use briefly::cli::{Cli, Commands};
use briefly::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        commands::print_completions(shell);
        return Ok(());
    }

    // Load configuration only for runtime commands.
    let settings = Settings::load()?;

    // Initialize logging
    let default_level = if cli.verbose {
        "debug".to_string()
    } else {
        settings.general.log_level.clone()
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Execute command
    match cli.command {
        Commands::Summarize(args) => {
            commands::summarize(&settings, args).await?;
        }
        Commands::Modes => {
            commands::list_modes(&settings);
        }
        Commands::Daemon(daemon_cmd) => {
            commands::daemon_command(&settings, daemon_cmd).await?;
        }
        Commands::Config(config_cmd) => {
            commands::config_command(&settings, config_cmd)?;
        }
        Commands::Completions { .. } => unreachable!(),
    }

    Ok(())
}
