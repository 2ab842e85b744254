//! LincStation LEDs - front-panel activity daemon binary.
//!
//! Runs the LED loop until SIGINT or SIGTERM, then clears the panel.

use clap::{Parser, Subcommand};
use lincstation_leds::{Daemon, DaemonConfig};
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "lincstation_leds")]
#[command(about = "Disk and network activity LEDs for the LincStation front panel")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the LEDs until interrupted (default)
    Run,

    /// Locate the LED controller and exit
    Probe,

    /// Sample the counters over one interval and print the derived state
    Snapshot,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    let daemon = Daemon::new(DaemonConfig::default())?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_command(daemon).await?,
        Commands::Probe => probe_command(&daemon)?,
        Commands::Snapshot => snapshot_command(daemon).await?,
    }

    Ok(())
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = log_level(cli);

    let subscriber = build_subscriber(level, std::env::var("RUST_LOG").ok().as_deref());
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

fn log_level(cli: &Cli) -> Level {
    if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    }
}

/// Compact subscriber filtered by `RUST_LOG` when it parses, else by `level`.
fn build_subscriber(level: Level, directives: Option<&str>) -> impl tracing::Subscriber {
    let filter = directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| {
            EnvFilter::default().add_directive(LevelFilter::from_level(level).into())
        });

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .finish()
}

async fn run_command(daemon: Daemon) -> anyhow::Result<()> {
    info!("LED Disk & Network Activity Monitor");

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_on_signal(cancel.clone()));

    daemon.run(cancel).await?;
    Ok(())
}

fn probe_command(daemon: &Daemon) -> anyhow::Result<()> {
    let bus = daemon.discover_bus()?;
    println!("LED controller found on /dev/i2c-{}", bus);
    Ok(())
}

async fn snapshot_command(mut daemon: Daemon) -> anyhow::Result<()> {
    let snapshot = daemon.snapshot().await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

/// Cancel `token` on the first SIGINT or SIGTERM.
async fn shutdown_on_signal(token: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("Received shutdown signal");
    token.cancel();
}
