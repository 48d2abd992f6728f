//! wow-exporter: Prometheus exporter for AzerothCore realms.
//!
//! Connects to the characters, auth and world databases and serves gauges
//! describing players, accounts, instances, PvP and server state on
//! `/metrics`. Every scrape runs a fresh collection cycle.
//!
//! # Usage
//!
//! ```text
//! WOW_DB_USER=acore WOW_DB_PASS=acore wow-exporter --port 7000
//! wow-exporter --config /etc/wow-exporter.toml --log-format json
//! ```

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use wowmon_collect::{Exporter, default_collectors};
use wowmon_core::Config;
use wowmon_metrics::{Registry, definitions};
use wowmon_source::MySqlSource;

const DEFAULT_LOG_FILTER: &str = "info,wow_exporter=debug,wowmon=debug";

#[derive(Parser, Debug)]
#[command(name = "wow-exporter", about = "Prometheus exporter for AzerothCore realms", version)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, env = "WOW_EXPORTER_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on. Overrides `PORT` and the configuration file.
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind.
    #[arg(long)]
    bind: Option<IpAddr>,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    if let Err(e) = run(cli).await {
        error!(error = format!("{e:#}"), "wow-exporter failed");
        return Err(e);
    }
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    apply_overrides(&mut config, &cli);

    info!(
        host = %config.database.host,
        port = config.database.port,
        url = config.database.dsn_url().is_some(),
        "connecting to databases"
    );

    // ── Initialize subsystems ──────────────────────────────────

    let source = Arc::new(
        MySqlSource::connect(&config.database)
            .await
            .context("connecting to databases")?,
    );

    let registry = Arc::new(Registry::with_metrics(definitions::ALL)?);
    info!(metrics = registry.len(), "metric registry initialized");

    let exporter = Arc::new(Exporter::new(
        registry,
        source.clone(),
        default_collectors(&config.collection),
        config.collection.group_timeout(),
    ));
    info!(
        collectors = exporter.collector_names().count(),
        group_timeout_secs = config.collection.group_timeout_secs,
        "exporter initialized"
    );

    // ── Start HTTP server ──────────────────────────────────────

    let router = wowmon_api::build_router(exporter);
    let addr = SocketAddr::new(config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(%addr, "WoW Private Server Exporter listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    source.close().await;
    info!("wow-exporter stopped");
    Ok(())
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_loaded_config() {
        let cli = Cli::try_parse_from([
            "wow-exporter",
            "--port",
            "9100",
            "--bind",
            "127.0.0.1",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);

        let mut config = Config::default();
        apply_overrides(&mut config, &cli);
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.bind, "127.0.0.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn defaults_keep_config_values() {
        let cli = Cli::try_parse_from(["wow-exporter"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Text);

        let mut config = Config::default();
        apply_overrides(&mut config, &cli);
        assert_eq!(config.server.port, 7000);
    }
}
