//! Concurrent host scanning
//!
//! [`ConcurrentHostScanner`] runs one discovery sweep, then fans a detailed
//! scan per discovered address out over a [`WorkerPool`], and folds the
//! per-host [`HostOutcome`]s into a [`ScanResult`](crate::models::ScanResult).

pub mod engine;
pub mod pool;

use crate::models::Host;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use engine::ConcurrentHostScanner;
pub use pool::WorkerPool;

/// Result of one detailed-scan unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOutcome {
    Scanned(Host),
    Failed { address: String, reason: String },
}

impl HostOutcome {
    pub fn address(&self) -> &str {
        match self {
            HostOutcome::Scanned(host) => &host.address,
            HostOutcome::Failed { address, .. } => address,
        }
    }

    pub fn is_scanned(&self) -> bool {
        matches!(self, HostOutcome::Scanned(_))
    }

    /// The scanned host, or an `error` placeholder carrying the address
    pub fn into_host(self) -> Host {
        match self {
            HostOutcome::Scanned(host) => host,
            HostOutcome::Failed { address, .. } => Host::placeholder(address),
        }
    }
}

/// Which top-level scan to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    /// Discovery only
    #[default]
    Quick,
    /// Discovery plus a detailed scan of every host found
    Full,
}

impl FromStr for ScanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quick" => Ok(ScanType::Quick),
            "full" => Ok(ScanType::Full),
            other => Err(format!("scan type must be 'quick' or 'full', got '{}'", other)),
        }
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanType::Quick => f.write_str("quick"),
            ScanType::Full => f.write_str("full"),
        }
    }
}
