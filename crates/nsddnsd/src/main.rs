// # nsddnsd - Dynamic DNS Update Daemon
//
// The nsddnsd daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Loading the credential file (fatal on failure)
// 3. Binding the HTTP listener (fatal on failure)
// 4. Serving update requests through the nsddns-core pipeline
//
// All update logic lives in nsddns-core; this binary only wires it up.
//
// ## Configuration
//
// All configuration is done via environment variables, read once at start:
//
// - `NSDDNS_LISTEN`: Listen address (default `127.0.0.1:8080`)
// - `NSDDNS_DOMAIN_SUFFIX`: Domain suffix (default `.dyn.example.com`)
// - `NSDDNS_TTL`: Record TTL in seconds (default 180)
// - `NSDDNS_TIMEOUT_SECS`: nsupdate time budget in seconds (default 3)
// - `NSDDNS_MAX_ADDRESSES`: Maximum addresses per hostname (default 32)
// - `NSDDNS_CREDENTIALS`: Password file (default `/var/named/ddns-hosts.json`)
// - `NSDDNS_NSUPDATE`: nsupdate executable (default `/usr/bin/nsupdate`)
// - `NSDDNS_NSUPDATE_ARGS`: Space-separated nsupdate arguments (default `-l`)
// - `NSDDNS_LOG_LEVEL`: trace, debug, info, warn, error (default `info`)
//
// ## Example
//
// ```bash
// export NSDDNS_LISTEN=127.0.0.1:8080
// export NSDDNS_DOMAIN_SUFFIX=.dyn.example.com
// export NSDDNS_CREDENTIALS=/var/named/ddns-hosts.json
//
// nsddnsd
// ```

mod http;

use anyhow::{Context, Result};
use nsddns_core::credentials::StaticCredentials;
use nsddns_core::traits::CredentialStore;
use nsddns_core::{ChangeCache, ServerConfig, UpdatePipeline};
use nsddns_nsupdate::NsupdateUpdater;
use std::env;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DaemonExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DaemonExitCode> for ExitCode {
    fn from(code: DaemonExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Build the server configuration from environment variables
fn config_from_env() -> Result<ServerConfig> {
    let mut config = ServerConfig::new();

    if let Some(listen) = env_parse("NSDDNS_LISTEN")? {
        config.listen = listen;
    }
    if let Ok(suffix) = env::var("NSDDNS_DOMAIN_SUFFIX") {
        config.domain_suffix = suffix;
    }
    if let Some(ttl) = env_parse("NSDDNS_TTL")? {
        config.ttl = ttl;
    }
    if let Some(timeout) = env_parse("NSDDNS_TIMEOUT_SECS")? {
        config.timeout_secs = timeout;
    }
    if let Some(max) = env_parse("NSDDNS_MAX_ADDRESSES")? {
        config.max_addresses = max;
    }
    if let Ok(path) = env::var("NSDDNS_CREDENTIALS") {
        config.credentials_path = path.into();
    }
    if let Ok(path) = env::var("NSDDNS_NSUPDATE") {
        config.nsupdate_path = path.into();
    }
    if let Ok(args) = env::var("NSDDNS_NSUPDATE_ARGS") {
        config.nsupdate_args = args.split_whitespace().map(str::to_string).collect();
    }
    if let Ok(level) = env::var("NSDDNS_LOG_LEVEL") {
        config.log_level = level;
    }

    Ok(config)
}

/// Parse an optional environment variable
fn env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{} has an invalid value {:?}: {}", name, raw, e)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(anyhow::anyhow!("{} is not readable: {}", name, e)),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match config_from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DaemonExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DaemonExitCode::ConfigError.into();
    }

    info!("Starting nsddnsd");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DaemonExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_daemon(config)).into()
}

/// Run the daemon
async fn run_daemon(config: ServerConfig) -> DaemonExitCode {
    let (pipeline, listener) = match startup(&config).await {
        Ok(ready) => ready,
        Err(e) => {
            error!("Startup failed: {:#}", e);
            return DaemonExitCode::ConfigError;
        }
    };

    match http::serve(pipeline, listener, shutdown_signal()).await {
        Ok(()) => {
            info!("Shutting down daemon");
            DaemonExitCode::CleanShutdown
        }
        Err(e) => {
            error!("Daemon error: {:#}", e);
            DaemonExitCode::RuntimeError
        }
    }
}

/// Load credentials and bind the listener; either failing aborts startup
async fn startup(config: &ServerConfig) -> Result<(Arc<UpdatePipeline>, tokio::net::TcpListener)> {
    let credentials = StaticCredentials::load(&config.credentials_path).await?;
    info!(
        "Loaded {} credential(s) from {}",
        credentials.len(),
        config.credentials_path.display()
    );

    let updater = NsupdateUpdater::from_config(config);
    info!(
        "Zone updates via {} (ttl {}s, timeout {:?})",
        updater.program().display(),
        config.ttl,
        updater.timeout()
    );

    let pipeline = Arc::new(UpdatePipeline::new(
        config.pipeline_settings(),
        Arc::new(credentials),
        Arc::new(updater),
        ChangeCache::new(),
    ));

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen))?;

    Ok((pipeline, listener))
}

/// Resolve on SIGTERM or SIGINT
#[cfg(unix)]
async fn shutdown_signal() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to setup SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    let received = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = tokio::signal::ctrl_c() => "SIGINT",
    };
    info!("Received shutdown signal: {}", received);
}

/// Resolve on CTRL-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to wait for CTRL-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal: SIGINT");
}
