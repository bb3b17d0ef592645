//! Best-effort market-data connectivity probe.
//!
//! A single TCP connect against the Bloomberg endpoint decides whether the
//! dashboard will have live data or falls back to synthetic data. The
//! probe is capability detection only: on success the connection is
//! dropped immediately (the dashboard opens its own session later), and
//! no failure mode of any kind aborts the bootstrap.

use std::fmt;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Outcome of the market-data probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Service reachable; the dashboard can use live market data.
    Live,
    /// Service unreachable; the dashboard falls back to synthetic data.
    Synthetic { reason: String },
}

impl ProbeOutcome {
    pub fn is_live(&self) -> bool {
        matches!(self, ProbeOutcome::Live)
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Live => write!(f, "live market data available"),
            ProbeOutcome::Synthetic { reason } => {
                write!(f, "using synthetic data ({})", reason)
            }
        }
    }
}

/// Probe the market-data service with a connect timeout.
///
/// Infallible by design: address resolution failures, refused
/// connections, and timeouts all map to `Synthetic` with a readable
/// reason.
pub fn probe_market_data(host: &str, port: u16, timeout: Duration) -> ProbeOutcome {
    log::debug!("probing market data service at {}:{}", host, port);

    let addr = match (host, port).to_socket_addrs() {
        Ok(mut addrs) => match addrs.next() {
            Some(addr) => addr,
            None => {
                return ProbeOutcome::Synthetic {
                    reason: format!("no address found for {}", host),
                };
            }
        },
        Err(e) => {
            return ProbeOutcome::Synthetic {
                reason: format!("address resolution failed: {}", e),
            };
        }
    };

    match TcpStream::connect_timeout(&addr, timeout) {
        Ok(stream) => {
            // Reachability confirmed; the probe session is never reused.
            drop(stream);
            log::info!("market data service reachable at {}", addr);
            ProbeOutcome::Live
        }
        Err(e) => {
            log::warn!("market data service unreachable at {}: {}", addr, e);
            ProbeOutcome::Synthetic {
                reason: e.to_string(),
            }
        }
    }
}
