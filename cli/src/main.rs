//! CLI entrypoint for shoplens
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use shoplens_application::{
    AnalysisGateway, AnalysisWorkflow, ConversationLogger, HealthMonitor, NoConversationLogger,
    NoProgress, WorkflowError, WorkflowProgressNotifier,
};
use shoplens_domain::{ImageAsset, OutputFormat};
use shoplens_infrastructure::{
    ConfigLoader, EnvTokenProvider, FileConfig, HttpAnalysisGateway, ImageLoader,
    JsonlConversationLogger,
};
use shoplens_presentation::{ChatRepl, Cli, ConsoleFormatter, OutputFormatter, ProgressReporter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_FILE_NAME: &str = "shoplens.log";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    config.validate().context("Invalid configuration")?;

    let log_dir = cli
        .log_dir
        .clone()
        .or_else(|| config.logging.log_dir.as_ref().map(PathBuf::from));
    let _log_guard = init_logging(cli.verbose, log_dir.as_deref());

    info!("Starting shoplens");

    if !config.output.color {
        colored::control::set_override(false);
    }
    let format: OutputFormat = cli
        .output
        .map(Into::into)
        .or(config.output.format)
        .unwrap_or_default();

    let Some(image_path) = cli.image.as_deref() else {
        bail!("An image path is required. Run with --help for usage.");
    };

    // === Dependency Injection ===
    let image = ImageLoader::default()
        .load_path(image_path)
        .with_context(|| format!("Cannot use {}", image_path.display()))?;

    let tokens = Arc::new(
        EnvTokenProvider::new(config.auth.token_env.as_str()).with_fallback(config.auth.token.clone()),
    );
    let gateway: Arc<dyn AnalysisGateway> = Arc::new(HttpAnalysisGateway::new(
        config.backend.base_url.as_str(),
        Duration::from_secs(config.backend.timeout_seconds),
    )?);

    let params = config.progress.to_workflow_params();
    let monitor = HealthMonitor::new(Arc::clone(&gateway), params.health_poll_interval);
    if !monitor.check_once().await {
        bail!(
            "The analysis service at {} is not reachable",
            config.backend.base_url
        );
    }

    let mut workflow = AnalysisWorkflow::new(gateway, tokens)
        .with_params(params)
        .with_progress(progress_notifier(&cli, &config, format))
        .with_conversation_logger(conversation_logger(&config));

    run(&cli, &mut workflow, image, format).await
}

async fn run(
    cli: &Cli,
    workflow: &mut AnalysisWorkflow,
    image: ImageAsset,
    format: OutputFormat,
) -> Result<()> {
    let full = format == OutputFormat::Full;

    match workflow.ingest_image(image).await {
        Ok(session) => {
            if full {
                println!("{}", ConsoleFormatter::format_detections(session));
            }
        }
        Err(e) => return Err(fatal_or_message(e)),
    }

    for &index in &cli.select {
        match workflow.select_region(index).await {
            Ok(outcome) => {
                if full && let Some(session) = workflow.session() {
                    println!("{}", ConsoleFormatter::format_selection(session, &outcome));
                }
            }
            Err(e) => report_recoverable(e)?,
        }
    }

    for question in &cli.ask {
        match workflow.submit_chat(question).await {
            Ok(outcome) => {
                if full && let Some(session) = workflow.session() {
                    println!("You: {}", question);
                    println!("{}", ConsoleFormatter::format_chat(session, &outcome));
                }
            }
            Err(e) => report_recoverable(e)?,
        }
    }

    if cli.chat {
        ChatRepl::new(workflow).run().await?;
    } else if full && cli.select.is_empty() && cli.ask.is_empty() {
        println!("Use --select <N> to analyze an object, --ask <TEXT> to ask about the image, or --chat.");
    }

    if format == OutputFormat::Json
        && let Some(session) = workflow.session()
    {
        println!("{}", ConsoleFormatter.render(session, format));
    }

    Ok(())
}

/// Fatal errors abort the run; anything else becomes a plain message.
fn fatal_or_message(error: WorkflowError) -> anyhow::Error {
    if error.is_fatal() {
        anyhow::Error::new(error)
    } else {
        anyhow!(error.user_message())
    }
}

fn report_recoverable(error: WorkflowError) -> Result<()> {
    if error.is_fatal() {
        return Err(error.into());
    }
    warn!("{}", error);
    eprintln!("{}", ConsoleFormatter::format_error(&error.user_message()));
    Ok(())
}

fn progress_notifier(
    cli: &Cli,
    config: &FileConfig,
    format: OutputFormat,
) -> Arc<dyn WorkflowProgressNotifier> {
    if cli.quiet || !config.progress.show_progress || format == OutputFormat::Json {
        Arc::new(NoProgress)
    } else {
        Arc::new(ProgressReporter::new())
    }
}

fn conversation_logger(config: &FileConfig) -> Arc<dyn ConversationLogger> {
    config
        .logging
        .conversation_log
        .as_deref()
        .and_then(JsonlConversationLogger::new)
        .map(|logger| Arc::new(logger) as Arc<dyn ConversationLogger>)
        .unwrap_or_else(|| Arc::new(NoConversationLogger))
}

/// Install the tracing subscriber; logs go to stderr and, with a log
/// directory, to a daily-rolled file as well.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(EnvFilter::new(level))
                .with(stderr_layer)
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(EnvFilter::new(level))
                .with(stderr_layer)
                .init();
            None
        }
    }
}
