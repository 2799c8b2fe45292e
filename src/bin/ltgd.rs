//! LTG daemon - lottery ticket generation server
//!
//! This binary runs as a background daemon, accepting ticket generation
//! requests over TCP and replying with formatted ticket text.
//!
//! # Usage
//!
//! ```bash
//! # Start the daemon (foreground)
//! ltgd start
//!
//! # Start the daemon (background/daemonized)
//! ltgd start -d
//!
//! # Stop the daemon
//! ltgd stop
//!
//! # Check daemon status
//! ltgd status
//! ```

use std::fs::{self, File};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ltgd::control::{self, DaemonStatus, StopOutcome};
use ltgd::monitor::spawn_monitor;
use ltgd::privileges::running_as_root;
use ltgd::{DaemonConfig, PidFile, TargetIdentity, TicketServer};

/// LTG daemon - lottery ticket generation server
#[derive(Parser, Debug)]
#[command(name = "ltgd", version, about)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the daemon
    Start {
        /// Run as a background daemon (fork to background)
        #[arg(short = 'd', long)]
        daemon: bool,

        /// Listen port, overriding the config file
        #[arg(long, value_parser = clap::value_parser!(u16).range(1024..))]
        port: Option<u16>,

        /// Path to a TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Stop the running daemon
    Stop {
        /// Path to a TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show daemon status
    Status {
        /// Path to a TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let command = args.command.unwrap_or(Command::Start {
        daemon: false,
        port: None,
        config: None,
    });

    match command {
        Command::Start {
            daemon,
            port,
            config: config_path,
        } => {
            let mut config = DaemonConfig::load(config_path.as_deref())?;
            if let Some(port) = port {
                config.port = port;
            }
            config.validate()?;

            if let DaemonStatus::Running { pid } = control::daemon_status(&config.pid_file) {
                eprintln!("Daemon is already running (PID {pid})");
                eprintln!("Use 'ltgd stop' to stop it first.");
                process::exit(1);
            }

            // Resolve the target identity while error output still reaches
            // the terminal; the actual drop happens after the PID file is
            // written.
            let identity = if running_as_root() {
                Some(TargetIdentity::resolve(&config.user, &config.group)?)
            } else {
                None
            };

            if daemon {
                daemonize(&config)?;
            }

            run_daemon(config, identity)
        }
        Command::Stop {
            config: config_path,
        } => {
            let config = DaemonConfig::load(config_path.as_deref())?;

            if let DaemonStatus::Running { pid } = control::daemon_status(&config.pid_file) {
                println!("Stopping daemon (PID {pid})...");
            }

            match control::stop_daemon(&config.pid_file) {
                StopOutcome::NotRunning => {
                    println!("Daemon is not running.");
                }
                StopOutcome::Stopped { .. } => {
                    println!("Daemon stopped.");
                }
                StopOutcome::StillRunning { pid } => {
                    eprintln!("Daemon (PID {pid}) did not stop within 5 seconds.");
                    process::exit(1);
                }
                StopOutcome::SignalFailed { pid, error } => {
                    eprintln!("Failed to signal daemon (PID {pid}): {error}");
                    process::exit(1);
                }
            }

            Ok(())
        }
        Command::Status {
            config: config_path,
        } => {
            let config = DaemonConfig::load(config_path.as_deref())?;

            match control::daemon_status(&config.pid_file) {
                DaemonStatus::Running { pid } => {
                    println!("Daemon is running (PID {pid})");
                    println!("Configured endpoint: {}", config.socket_addr());
                    Ok(())
                }
                DaemonStatus::NotRunning => {
                    println!("Daemon is not running.");
                    process::exit(1);
                }
            }
        }
    }
}

fn daemonize(config: &DaemonConfig) -> Result<()> {
    use daemonize::Daemonize;

    if let Some(parent) = config.log_file.parent() {
        fs::create_dir_all(parent).context("Failed to create log directory")?;
    }

    let stdout = File::create(&config.log_file).context("Failed to create log file")?;
    let stderr = stdout
        .try_clone()
        .context("Failed to clone log file handle for stderr")?;

    println!("Starting daemon, logging to {}", config.log_file.display());

    let daemonize = Daemonize::new()
        .working_directory("/")
        .umask(0o000)
        .stdout(stdout)
        .stderr(stderr);

    daemonize.start().context("Failed to daemonize")?;

    Ok(())
}

#[tokio::main]
async fn run_daemon(config: DaemonConfig, identity: Option<TargetIdentity>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("ltgd=info".parse()?)
                .add_directive("ltg_core=info".parse()?)
                .add_directive("ltg_protocol=info".parse()?),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        pid = process::id(),
        config = %config,
        "Ticket daemon starting"
    );

    let pid_file = PidFile::acquire(&config.pid_file)?;
    info!(
        path = %pid_file.path().display(),
        pid = pid_file.pid(),
        "PID file acquired"
    );

    match &identity {
        Some(identity) => identity.drop_privileges()?,
        None => info!(
            user = %config.user,
            group = %config.group,
            "Not running as root, keeping current identity"
        ),
    }

    let cancel_token = CancellationToken::new();

    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown_signal().await {
            error!(error = %e, "Error waiting for shutdown signal");
        }
        info!("Shutdown signal received");
        shutdown_token.cancel();
    });

    let _monitor_handle = spawn_monitor(cancel_token.clone());

    info!(addr = %config.socket_addr(), "Starting server");
    let server = TicketServer::bind(config.socket_addr(), cancel_token)?;
    server.serve().await;

    drop(pid_file);
    info!("Ticket daemon stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sighup = signal(SignalKind::hangup())?;

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
                return Ok(());
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
                return Ok(());
            }
            _ = sighup.recv() => {
                info!("Received SIGHUP, ignoring");
            }
        }
    }
}
