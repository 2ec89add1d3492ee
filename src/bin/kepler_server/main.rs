//! `kepler-server`: answers PGN 0xFF14 eccentric-anomaly requests on a
//! SocketCAN interface until Ctrl-C or SIGTERM.
//!
//! Usage:
//!   kepler-server <can_interface>
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

mod socketcan_bus;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use korri_kepler::protocol::server::{KeplerServer, ServerConfig};
use socketcan_bus::{SocketCanBus, TokioTimer};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Raised once the process is asked to terminate.
static SHUTDOWN: Signal<CriticalSectionRawMutex, ()> = Signal::new();

#[derive(Parser, Debug)]
#[command(
    name = "kepler-server",
    version,
    about = "J1939 node solving Kepler's equation over CAN"
)]
struct Args {
    /// CAN interface to bind (e.g. can0, vcan0)
    can_interface: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let bus = SocketCanBus::open(&args.can_interface)
        .inspect_err(|err| error!("Cannot open {}: {}", args.can_interface, err))
        .with_context(|| format!("failed to open CAN interface {}", args.can_interface))?;
    info!("Listening on {}", args.can_interface);

    tokio::spawn(async {
        wait_for_termination().await;
        info!("Termination requested");
        SHUTDOWN.signal(());
    });

    let mut server = KeplerServer::new(bus, TokioTimer, ServerConfig::default());
    let stats = server
        .run(&SHUTDOWN)
        .await
        .map_err(|err| anyhow!("server stopped: {err:?}"))?;

    info!(
        "Served {} requests out of {} frames",
        stats.replied, stats.received
    );
    Ok(())
}

async fn wait_for_termination() {
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(err) => {
            warn!("SIGTERM handler unavailable: {}", err);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}
