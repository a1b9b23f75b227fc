use anyhow::{Context, Result};
use clap::Parser;
use playground::config::{self, PlaygroundConfig};
use playground::harness;
use playground::kernel::context::ServerContext;
use playground::kernel::telemetry::{Exporter, TableRenderer};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Console driver: one JSON request per stdin line, one JSON reply per stdout line.
#[derive(Parser, Debug)]
#[command(name = "playground", version, about = "Local driver for the MCP playground operations")]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override telemetry.capacity
    #[arg(long)]
    capacity: Option<usize>,

    /// Override telemetry.export_dir
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Render a previously exported log file and exit
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Export the log when the input ends or on Ctrl+C
    #[arg(long)]
    export_on_exit: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries replies, so diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("playground=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(path) = &cli.replay {
        let entries =
            Exporter::load(path).with_context(|| format!("replaying {}", path.display()))?;
        println!("{}", TableRenderer.render(&entries, None));
        return Ok(());
    }

    let config = build_config(&cli)?;
    let ctx = Arc::new(ServerContext::new(config));
    tracing::info!(
        instance = %ctx.instance_id,
        capacity = ctx.telemetry.store().capacity(),
        "{} {} ready",
        ctx.config.server.name,
        ctx.config.server.version
    );

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, shutting down");
            ctrl_c.cancel();
        }
    });

    let input = BufReader::new(tokio::io::stdin());
    harness::serve(Arc::clone(&ctx), input, tokio::io::stdout(), shutdown).await?;

    if cli.export_on_exit {
        let path = ctx.telemetry.export(None).context("exporting log on exit")?;
        tracing::info!(path = %path.display(), entries = ctx.telemetry.len(), "Log exported");
    }
    Ok(())
}

fn build_config(cli: &Cli) -> Result<PlaygroundConfig> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => PlaygroundConfig::default(),
    };
    if let Some(capacity) = cli.capacity {
        config.telemetry.capacity = capacity;
    }
    if let Some(dir) = &cli.export_dir {
        config.telemetry.export_dir = dir.clone();
    }
    config::validate(&config).map_err(config::ConfigError::Validation)?;
    Ok(config)
}
