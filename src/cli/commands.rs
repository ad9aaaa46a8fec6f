//! CLI command implementations

use anyhow::{Context, Result};
use chrono::Local;
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io::{self, Read};
use std::path::Path;

use crate::cli::args::{Cli, ConfigCommand, DaemonCommand, SummarizeArgs};
use crate::config::Settings;
use crate::daemon::client::DaemonClient;
use crate::daemon::ipc::{DaemonRequest, DaemonResponse};
use crate::llm::{build_provider, RequestDispatcher};
use crate::summary::{
    prepare_input, GuardStatus, RequestGuard, SummarizationMode, SummarizationRequest,
    SummarizationResult, SummarizationService, SummarySession,
};
use crate::translation::{translate_result, LlmTranslator, TranslatedResult};

/// Summarize text from an argument, a file, or stdin
pub async fn summarize(settings: &Settings, args: SummarizeArgs) -> Result<()> {
    let mut dispatcher: Option<RequestDispatcher> = None;
    let result = if args.again {
        summarize_via_daemon(settings, DaemonRequest::Regenerate { mode: args.mode }).await?
    } else {
        let request = build_request(settings, &args)?;
        if args.daemon {
            summarize_via_daemon(settings, DaemonRequest::Summarize(request)).await?
        } else {
            let provider = build_provider(settings)?;
            let service = SummarizationService::new(provider, settings.request_timeout());
            dispatcher = Some(service.dispatcher().clone());
            let session = SummarySession::new(RequestGuard::new(service));
            session
                .request_summary(request)
                .await?
                .context("Request was superseded by a newer one")?
        }
    };

    let output = match translation_target(settings, args.translate_to.as_deref()) {
        Some(target) => {
            let dispatcher = match dispatcher {
                Some(dispatcher) => dispatcher,
                None => RequestDispatcher::new(build_provider(settings)?),
            };
            let translator = LlmTranslator::new(dispatcher, settings.request_timeout());
            translate_result(
                &translator,
                &settings.translation.source_language,
                &target,
                result,
            )
            .await
        }
        None => TranslatedResult {
            result,
            notice: None,
        },
    };

    if let Some(notice) = &output.notice {
        eprintln!("note: {}", notice);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_text(&output.result));
    }

    Ok(())
}

fn build_request(settings: &Settings, args: &SummarizeArgs) -> Result<SummarizationRequest> {
    let (raw_input, source_mime) = read_input(args)?;
    let input_text = prepare_input(&raw_input, settings.summary.max_input_chars)?;

    let mode = args.mode.unwrap_or(settings.summary.default_mode);
    let instruction = match mode {
        SummarizationMode::Customize => args
            .instruction
            .clone()
            .or_else(|| settings.custom_prompt()),
        _ => None,
    };

    let request = SummarizationRequest::new(input_text, mode)
        .with_instruction(instruction)
        .with_source_mime(source_mime);
    request.validate()?;
    Ok(request)
}

async fn summarize_via_daemon(
    settings: &Settings,
    request: DaemonRequest,
) -> Result<SummarizationResult> {
    let mut client = DaemonClient::connect(settings).await?;

    match client.send(request).await? {
        DaemonResponse::Summary(result) => Ok(result),
        DaemonResponse::Superseded => {
            anyhow::bail!("Request was superseded by a newer one")
        }
        DaemonResponse::Error { message } => anyhow::bail!("{}", message),
        _ => anyhow::bail!("Unexpected response from daemon"),
    }
}

/// List summarization modes
pub fn list_modes(settings: &Settings) {
    for mode in SummarizationMode::ALL {
        let marker = if mode == settings.summary.default_mode {
            "*"
        } else {
            " "
        };
        println!("{} {:<14} {}", marker, mode.as_str(), mode.description());
    }
}

/// Handle daemon subcommands
pub async fn daemon_command(settings: &Settings, cmd: DaemonCommand) -> Result<()> {
    match cmd {
        DaemonCommand::Start { foreground } => {
            if foreground {
                crate::daemon::run_foreground(settings).await?;
            } else {
                crate::daemon::start_daemon(settings)?;
                println!("Daemon started");
            }
        }
        DaemonCommand::Stop => {
            let mut client = DaemonClient::connect(settings).await?;
            client.send(DaemonRequest::Shutdown).await?;
            println!("Daemon stopped");
        }
        DaemonCommand::Status => match DaemonClient::connect(settings).await {
            Ok(mut client) => match client.send(DaemonRequest::GetStatus).await? {
                DaemonResponse::Status(status) => print_status(&status),
                _ => anyhow::bail!("Unexpected response from daemon"),
            },
            Err(_) => {
                println!("Daemon is not running");
            }
        },
        DaemonCommand::Cancel => {
            let mut client = DaemonClient::connect(settings).await?;
            match client.send(DaemonRequest::Cancel).await? {
                DaemonResponse::Cancelled { was_in_flight: true } => {
                    println!("Cancelled the summary in flight")
                }
                DaemonResponse::Cancelled {
                    was_in_flight: false,
                } => println!("Nothing to cancel"),
                _ => anyhow::bail!("Unexpected response from daemon"),
            }
        }
    }

    Ok(())
}

/// Handle config subcommands
pub fn config_command(settings: &Settings, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let toml = toml::to_string_pretty(&redacted(settings))?;
            println!("{}", toml);
        }
        ConfigCommand::Path => {
            let path = Settings::config_path()?;
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

/// Print completion script for the requested shell to stdout.
pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let command_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, command_name, &mut io::stdout());
}

// Helper functions

fn read_input(args: &SummarizeArgs) -> Result<(String, Option<String>)> {
    if let Some(text) = &args.text {
        return Ok((text.clone(), None));
    }

    if let Some(path) = &args.file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return Ok((text, Some(mime_hint(path))));
    }

    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read standard input")?;
    Ok((text, None))
}

fn mime_hint(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_text_plain()
        .essence_str()
        .to_string()
}

fn translation_target(settings: &Settings, requested: Option<&str>) -> Option<String> {
    if let Some(target) = requested.map(str::trim).filter(|t| !t.is_empty()) {
        return Some(target.to_string());
    }

    let configured = settings.translation.target_language.trim();
    (settings.translation.enabled && !configured.is_empty()).then(|| configured.to_string())
}

fn render_text(result: &SummarizationResult) -> String {
    let mut output = String::new();
    output.push_str(&result.summary);
    output.push('\n');

    if !result.takeaways.is_empty() {
        output.push_str("\nKey Takeaways:\n");
        for takeaway in &result.takeaways {
            output.push_str("- ");
            output.push_str(takeaway);
            output.push('\n');
        }
    }

    output
}

fn print_status(status: &GuardStatus) {
    match status {
        GuardStatus::Idle => println!("Status: Idle"),
        GuardStatus::InFlight {
            id,
            mode,
            started_at,
        } => {
            println!("Status: Summarizing");
            println!("  ID: {}", truncate(id, 8));
            println!("  Mode: {}", mode);
            println!(
                "  Started: {}",
                started_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
            );
        }
    }
}

fn redacted(settings: &Settings) -> Settings {
    let mut settings = settings.clone();
    if !settings.llm.api_key.is_empty() {
        settings.llm.api_key = "********".to_string();
    }
    settings
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((cut, _)) => &s[..cut],
        None => s,
    }
}
