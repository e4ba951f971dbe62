//! hostdash - host metrics dashboard server.
//!
//! Serves the JSON API and the embedded dashboard page. Collection happens on
//! request; each domain's result is cached for the collection interval.

mod handlers;
mod openapi;
mod pidfile;
mod router;
mod state;

use std::fs::OpenOptions;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use hostdash_core::collector::{RealFs, SystemRunner};
use hostdash_core::config::{
    DEFAULT_COLLECTION_INTERVAL, DEFAULT_COMMAND_TIMEOUT, DEFAULT_HISTORY_CAPACITY,
    DEFAULT_MAX_TOP_PROCESSES,
};
use hostdash_core::{DashConfig, Orchestrator};

use pidfile::{PidFile, PidFileError};

// ============================================================
// CLI
// ============================================================

#[derive(Parser, Debug)]
#[command(name = "hostdash", about = "Host metrics dashboard server", version = hostdash_core::VERSION)]
struct Args {
    /// Listen host.
    #[arg(long, default_value = "0.0.0.0", env = "HOSTDASH_HOST")]
    host: String,

    /// Listen port.
    #[arg(long, default_value_t = 8080, env = "HOSTDASH_PORT")]
    port: u16,

    /// Debug mode: implies debug-level logging.
    #[arg(long, env = "HOSTDASH_DEBUG")]
    debug: bool,

    /// Seconds a collected domain stays cached (0 disables caching).
    #[arg(long, default_value_t = DEFAULT_COLLECTION_INTERVAL.as_secs(), env = "HOSTDASH_INTERVAL")]
    interval: u64,

    /// Number of snapshots kept in history (0 selects the default).
    #[arg(long, default_value_t = DEFAULT_HISTORY_CAPACITY, env = "HOSTDASH_HISTORY_SIZE")]
    history_size: usize,

    /// Timeout in seconds for each external command.
    #[arg(long, default_value_t = DEFAULT_COMMAND_TIMEOUT.as_secs(), env = "HOSTDASH_COMMAND_TIMEOUT")]
    command_timeout: u64,

    /// Maximum rows in the top-processes table.
    #[arg(long, default_value_t = DEFAULT_MAX_TOP_PROCESSES, env = "HOSTDASH_MAX_PROCESSES")]
    max_processes: usize,

    /// PID file path [default: ~/dashboard.pid].
    #[arg(long, env = "HOSTDASH_PID_FILE")]
    pid_file: Option<PathBuf>,

    /// Append logs to this file instead of stderr.
    #[arg(long, env = "HOSTDASH_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn log_level(&self) -> Level {
        if self.quiet {
            return Level::ERROR;
        }
        match (self.verbose, self.debug) {
            (0, false) => Level::INFO,
            (0, true) | (1, _) => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    fn dash_config(&self) -> DashConfig {
        DashConfig::default()
            .with_collection_interval(Duration::from_secs(self.interval))
            .with_history_capacity(self.history_size)
            .with_command_timeout(Duration::from_secs(self.command_timeout))
            .with_max_top_processes(self.max_processes)
    }
}

#[derive(Debug, thiserror::Error)]
enum ServeError {
    #[error("invalid listen address {addr}: {source}")]
    Address {
        addr: String,
        source: std::net::AddrParseError,
    },
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },
    #[error(transparent)]
    PidFile(#[from] PidFileError),
    #[error("server error: {0}")]
    Serve(io::Error),
}

// ============================================================
// Main
// ============================================================

fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(&args) {
        eprintln!("hostdash: cannot open log file: {e}");
        process::exit(1);
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(serve(args)) {
        error!(error = %e, "hostdash stopped");
        process::exit(1);
    }
}

/// Installs the tracing subscriber.
///
/// The level applies to this binary and the core crate; `RUST_LOG`
/// directives are layered on top.
fn init_logging(args: &Args) -> io::Result<()> {
    let level = args.log_level();
    let mut directives = format!("warn,hostdash={level},hostdash_core={level}");
    if let Ok(env) = std::env::var(EnvFilter::DEFAULT_ENV)
        && !env.trim().is_empty()
    {
        directives.push(',');
        directives.push_str(&env);
    }
    let filter = EnvFilter::builder().parse_lossy(directives);

    match &args.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .init();
        }
    }
    Ok(())
}

async fn serve(args: Args) -> Result<(), ServeError> {
    let config = args.dash_config();
    info!(
        version = hostdash_core::VERSION,
        interval_secs = config.collection_interval.as_secs(),
        history = config.effective_history_capacity(),
        "starting hostdash"
    );

    let addr_str = format!("{}:{}", args.host, args.port);
    let addr: SocketAddr = addr_str.parse().map_err(|source| ServeError::Address {
        addr: addr_str.clone(),
        source,
    })?;

    let _pid_file = PidFile::create(args.pid_file.clone().unwrap_or_else(pidfile::default_path))?;

    let orchestrator = Arc::new(Orchestrator::new(
        &config,
        RealFs::new(),
        SystemRunner::new(config.command_timeout),
    ));
    let app = router::build_router(orchestrator);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind { addr, source })?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServeError::Serve)?;

    info!("shutdown complete");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["hostdash"]);
        assert_eq!(args.host, "0.0.0.0");
        assert_eq!(args.port, 8080);
        assert_eq!(args.log_level(), Level::INFO);
        assert_eq!(args.dash_config(), DashConfig::default());
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(Args::parse_from(["hostdash", "-v"]).log_level(), Level::DEBUG);
        assert_eq!(Args::parse_from(["hostdash", "-vv"]).log_level(), Level::TRACE);
        assert_eq!(Args::parse_from(["hostdash", "--debug"]).log_level(), Level::DEBUG);
        assert_eq!(Args::parse_from(["hostdash", "-q", "-v"]).log_level(), Level::ERROR);
    }

    #[test]
    fn test_config_from_flags() {
        let args = Args::parse_from([
            "hostdash",
            "--interval",
            "0",
            "--history-size",
            "10",
            "--command-timeout",
            "7",
            "--max-processes",
            "5",
        ]);
        let config = args.dash_config();
        assert_eq!(config.collection_interval, Duration::ZERO);
        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.command_timeout, Duration::from_secs(7));
        assert_eq!(config.max_top_processes, 5);
    }

    #[test]
    fn test_zero_history_size_uses_default() {
        let args = Args::parse_from(["hostdash", "--history-size", "0"]);
        assert_eq!(args.dash_config().history_capacity, DEFAULT_HISTORY_CAPACITY);
    }
}
