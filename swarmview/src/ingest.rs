use std::io::{BufRead, BufReader};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use shared::AgentReport;

use crate::state::WorldState;

/// How often the accept loop wakes to check the shutdown flag.
const ACCEPT_POLL: Duration = Duration::from_millis(100);

/// Strict decode of one wire line. Anything that does not match the
/// `AgentReport` shape, a missing `id` included, is an error; the caller
/// drops the line without touching the world state.
pub fn parse_report(line: &str) -> Result<AgentReport> {
    serde_json::from_str(line).context("malformed agent report")
}

/// Handle to the running listener thread.
pub struct IngestListener {
    local_addr: SocketAddr,
    thread: JoinHandle<()>,
}

impl IngestListener {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Waits for the accept loop to exit; call after setting the shutdown
    /// flag.
    pub fn join(self) {
        if self.thread.join().is_err() {
            error!("ingestion listener thread panicked");
        }
    }
}

/// Binds the report socket and spawns the accept loop. Every connection
/// gets its own reader thread feeding `WorldState::ingest`; reader threads
/// end when their peer disconnects and are not joined on shutdown.
pub fn spawn_listener(
    addr: &str,
    state: Arc<WorldState>,
    shutdown: Arc<AtomicBool>,
) -> Result<IngestListener> {
    let listener =
        TcpListener::bind(addr).with_context(|| format!("failed to bind report socket on {addr}"))?;
    listener
        .set_nonblocking(true)
        .context("failed to set report socket non-blocking")?;
    let local_addr = listener
        .local_addr()
        .context("failed to read report socket address")?;

    let thread = thread::spawn(move || accept_loop(listener, state, shutdown));
    Ok(IngestListener { local_addr, thread })
}

fn accept_loop(listener: TcpListener, state: Arc<WorldState>, shutdown: Arc<AtomicBool>) {
    while !shutdown.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, peer)) => {
                info!("agent feed connected from {peer}");
                let state = Arc::clone(&state);
                let shutdown = Arc::clone(&shutdown);
                thread::spawn(move || read_reports(stream, state, shutdown));
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL);
            }
            Err(e) => {
                warn!("accept failed on report socket: {e}");
                thread::sleep(ACCEPT_POLL);
            }
        }
    }
    info!("report listener closed");
}

fn read_reports(stream: TcpStream, state: Arc<WorldState>, shutdown: Arc<AtomicBool>) {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown peer".to_string());
    let reader = BufReader::new(stream);
    let mut dropped: u64 = 0;

    for line in reader.lines() {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                debug!("read error from {peer}: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_report(&line) {
            Ok(report) => state.ingest(report),
            Err(e) => {
                dropped += 1;
                warn!("dropping malformed report from {peer}: {e:#}");
            }
        }
    }

    if dropped > 0 {
        info!("agent feed from {peer} closed, {dropped} malformed reports dropped");
    } else {
        info!("agent feed from {peer} closed");
    }
}
