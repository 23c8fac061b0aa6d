// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Resumatch: AI Resume Shortlisting
//!
//! Batch-analyzes resumes against a job description through the analysis
//! service, ranks them and exports reports. `serve` starts the web UI.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tracing::{debug, info, warn};

use resumatch::batch::{BatchOrchestrator, Cancellation};
use resumatch::client::AnalysisClient;
use resumatch::config::{AppConfig, FailurePolicy};
use resumatch::controller::{AppController, Session};
use resumatch::render::html::render_document;
use resumatch::render::pdf::export_report;
use resumatch::render::{render_json, render_text};
use resumatch::theme::{Theme, ThemeState, ThemeStore};
use resumatch::upload::{expand_paths, ResumeFile};
use resumatch::{ResumatchError, Result};

/// Resumatch CLI - AI Resume Shortlisting
#[derive(Parser, Debug)]
#[command(name = "resumatch")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "Rank resumes against a job description with an AI analysis service", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json", "html"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Analysis service endpoint (overrides config)
    #[arg(long, global = true)]
    service_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze resumes against a job description and print the ranking
    Analyze {
        /// Resume files or directories (pdf, doc, docx)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Job description text
        #[arg(short, long, conflicts_with = "job_file")]
        job_description: Option<String>,

        /// Read the job description from a file
        #[arg(long)]
        job_file: Option<PathBuf>,

        /// Write a PDF report per resume into this directory
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Keep successful results when some resumes fail
        #[arg(long)]
        partial: bool,

        /// Maximum requests in flight (0 = unlimited)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Per-request timeout in seconds (0 = none)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Light/dark theme preference
    Theme {
        #[command(subcommand)]
        action: ThemeCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Check that the analysis service is reachable
    Status,

    /// Start the web UI
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand, Debug)]
enum ThemeCommands {
    /// Show the current theme
    Show,

    /// Switch between light and dark
    Toggle,

    /// Set the theme explicitly
    Set {
        #[arg(value_enum)]
        mode: ThemeMode,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ThemeMode {
    Light,
    Dark,
}

impl From<ThemeMode> for Theme {
    fn from(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Theme::Light,
            ThemeMode::Dark => Theme::Dark,
        }
    }
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    debug!("Resumatch v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = AppConfig::load(&cli.config)?;
    if let Some(url) = cli.service_url {
        config.service.url = url;
        config.validate()?;
    }

    match cli.command {
        Some(Commands::Analyze {
            paths,
            job_description,
            job_file,
            export,
            partial,
            concurrency,
            timeout,
        }) => {
            if partial {
                config.analysis.failure_policy = FailurePolicy::Partial;
            }
            if let Some(n) = concurrency {
                config.service.max_concurrency = n;
            }
            if let Some(secs) = timeout {
                config.service.timeout_secs = secs;
            }

            let job_description = match (job_description, job_file) {
                (Some(text), _) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path).await?,
                (None, None) => String::new(),
            };

            run_analyze(config, &paths, job_description, export.as_deref(), &cli.format).await
        }
        Some(Commands::Theme { action }) => run_theme_command(config, action),
        Some(Commands::Config { action }) => run_config_command(config, action, &cli.config),
        Some(Commands::Status) => run_status(config).await,
        Some(Commands::Serve { host, port }) => run_serve(config, host, port).await,
        // Default: the web UI
        None => run_serve(config, None, None).await,
    }
}

/// Analyze every resume under `paths` and print the ranking
async fn run_analyze(
    config: AppConfig,
    paths: &[PathBuf],
    job_description: String,
    export: Option<&Path>,
    format: &str,
) -> Result<()> {
    let mut files = Vec::new();
    for path in expand_paths(paths)? {
        files.push(ResumeFile::from_path(&path).await?);
    }
    info!(
        "Analyzing {} resumes against {} ({} max in flight)",
        files.len(),
        config.service.url,
        config.service.max_concurrency
    );

    let client = AnalysisClient::new(&config.service.url)?;
    let orchestrator = BatchOrchestrator::from_config(Arc::new(client), &config.service);
    let theme = ThemeState::init(ThemeStore::new(&config.theme.store_path));

    let mut session = Session::new(&config, theme);
    session.add_picked(files);
    session.set_job_description(job_description);

    // Ctrl+C drops the requests still in flight
    let cancellation = Cancellation::new();
    let cancel = cancellation.signal();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, cancelling analysis...");
            cancellation.cancel();
        }
    });

    session.controller.analyze(&orchestrator, &cancel).await?;
    let controller = &session.controller;

    for failure in controller.failures() {
        eprintln!("Skipped {}: {}", failure.file_name, failure.message);
    }

    run_outcome(controller, cancel.is_cancelled())?;

    let results = controller.results();
    match format {
        "json" => println!("{}", render_json(results)?),
        "html" => println!("{}", render_document(results, controller.theme().is_dark())?),
        _ => print!("{}", render_text(results)),
    }

    if let Some(dir) = export {
        for result in results {
            let path = export_report(result, dir)?;
            if format == "text" {
                println!("Saved {}", path.display());
            }
        }
    }

    Ok(())
}

/// A failed run becomes the command's error; the cause was already logged
fn run_outcome(controller: &AppController, cancelled: bool) -> Result<()> {
    match controller.error() {
        Some(_) if cancelled => Err(ResumatchError::Cancelled),
        Some(message) => Err(ResumatchError::Server(message.to_string())),
        None => Ok(()),
    }
}

/// Run theme commands
fn run_theme_command(config: AppConfig, action: ThemeCommands) -> Result<()> {
    let store = ThemeStore::new(&config.theme.store_path);
    let mut state = ThemeState::init(store.clone());

    match action {
        ThemeCommands::Show => {
            let source = if store.load()?.is_some() { "saved" } else { "platform default" };
            println!("{:?} ({})", state.theme(), source);
        }
        ThemeCommands::Toggle => {
            let theme = state.toggle()?;
            println!("Switched to {:?}", theme);
        }
        ThemeCommands::Set { mode } => {
            state.set(mode.into())?;
            println!("Theme set to {:?}", state.theme());
        }
    }

    Ok(())
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output, force } => {
            if output.exists() && !force {
                return Err(ResumatchError::Config(format!(
                    "{} already exists. Use --force to overwrite",
                    output.display()
                )));
            }
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  Service: {}", config.service.url);
            println!("  Failure policy: {:?}", config.analysis.failure_policy);
            println!("  Web UI: {}:{}", config.web.host, config.web.port);
        }
    }

    Ok(())
}

/// Run status check
async fn run_status(config: AppConfig) -> Result<()> {
    let client = AnalysisClient::new(&config.service.url)?;

    println!("Resumatch v{} Status", env!("CARGO_PKG_VERSION"));
    println!("======================");

    match client.health_check().await {
        Ok(()) => println!("Analysis service: Running ({})", client.endpoint()),
        Err(e) => println!("Analysis service: Error - {}", e),
    }

    let theme = ThemeState::init(ThemeStore::new(&config.theme.store_path));

    println!("\nConfiguration:");
    println!("  Endpoint: {}", config.service.url);
    println!("  Timeout: {}s", config.service.timeout_secs);
    println!("  Max concurrency: {}", config.service.max_concurrency);
    println!("  Failure policy: {:?}", config.analysis.failure_policy);
    println!("  Theme: {:?} ({})", theme.theme(), config.theme.store_path.display());

    Ok(())
}

async fn run_serve(mut config: AppConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.web.host = host;
    }
    if let Some(port) = port {
        config.web.port = port;
    }

    resumatch::web::start_server(config).await
}
