/*
[INPUT]:  CLI arguments, YAML configuration file, GEOTASK__* environment, OS shutdown signals
[OUTPUT]: Interactive TUI session or one-shot task commands
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

mod cli;
mod tui;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use geotask::AppConfig;
use geotask::config::default_config_path;
use geotask_gateway::{GeotaskClient, TaskGateway, TaskId};

use crate::tui::{LOG_BUFFER_CAPACITY, LogBuffer, LogWriterFactory};

#[derive(Parser, Debug)]
#[command(name = "geotask", version, about = "Geo-tagged to-do list client")]
struct Cli {
    #[arg(long = "config", value_name = "PATH", global = true)]
    config_path: Option<PathBuf>,
    /// Overrides api.base_url from the configuration
    #[arg(long = "api-url", value_name = "URL", global = true)]
    api_url: Option<String>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info", global = true)]
    log_level: String,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Interactive terminal UI (default)
    Tui,
    /// Print all tasks
    List,
    /// Print one task
    Show { id: TaskId },
    /// Create a task
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<String>,
    },
    /// Mark a task done (or open again with --undo)
    Done {
        id: TaskId,
        #[arg(long)]
        undo: bool,
    },
    /// Delete a task
    Delete {
        id: TaskId,
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Write a configuration file interactively
    Init {
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let command = args.command.clone().unwrap_or(Command::Tui);

    if let Command::Init { output } = command {
        init_tracing(&args.log_level)?;
        let output = output
            .or_else(|| args.config_path.clone())
            .or_else(default_config_path)
            .context("cannot determine a config directory; pass --output")?;
        return cli::run_init(output);
    }

    let config_path = args.config_path.clone().or_else(default_config_path);
    let mut config = AppConfig::load(config_path.as_deref()).context("load config")?;
    if let Some(api_url) = &args.api_url {
        config.api.base_url = api_url.clone();
    }
    let client = GeotaskClient::with_base_url(config.api.client_config(), &config.api.base_url)
        .context("create task gateway")?;

    match command {
        Command::Tui => run_tui(&args.log_level, config, client).await,
        other => {
            init_tracing(&args.log_level)?;
            info!(base_url = %config.api.base_url, "running command");
            run_command(other, &client).await
        }
    }
}

async fn run_command(command: Command, gateway: &dyn TaskGateway) -> Result<()> {
    match command {
        Command::List => cli::run_list(gateway).await,
        Command::Show { id } => cli::run_show(gateway, id).await,
        Command::Add {
            title,
            description,
            lat,
            lon,
        } => cli::run_add(
            gateway,
            &title,
            description.as_deref(),
            lat.as_deref(),
            lon.as_deref(),
        )
        .await
        .map(|_| ()),
        Command::Done { id, undo } => cli::run_done(gateway, id, undo).await.map(|_| ()),
        Command::Delete { id, yes } => cli::run_delete(gateway, id, yes).await.map(|_| ()),
        Command::Tui | Command::Init { .. } => Err(anyhow!("not a one-shot command")),
    }
}

async fn run_tui(log_level: &str, config: AppConfig, client: GeotaskClient) -> Result<()> {
    let log_buffer = Arc::new(Mutex::new(LogBuffer::new(LOG_BUFFER_CAPACITY)));
    let _file_guard = init_tui_tracing(log_level, LogWriterFactory::new(log_buffer.clone()))?;
    info!(base_url = %config.api.base_url, "starting geotask tui");

    let shutdown = CancellationToken::new();
    setup_signal_handlers(shutdown.clone());

    let gateway: Arc<dyn TaskGateway> = Arc::new(client);
    tui::run_tui_with_log(config, gateway, log_buffer, shutdown).await?;
    info!("tui closed");
    Ok(())
}

/// CLI commands log to stderr so stdout stays parseable
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

/// TUI mode logs into the in-memory buffer and a daily rolling file
fn init_tui_tracing(log_level: &str, writer: LogWriterFactory) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    let buffer_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer);

    let (file_layer, guard) = match dirs::data_dir() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir.join("geotask").join("logs"), "geotask.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(buffer_layer)
        .with(file_layer)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(guard)
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
