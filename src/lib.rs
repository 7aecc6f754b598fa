//! hostsweep - network device discovery and per-host service enumeration
//!
//! Drives nmap: one discovery sweep over a CIDR range, then a bounded pool of
//! concurrent detailed scans, one per discovered host.

pub mod config;
pub mod error;
pub mod executor;
pub mod models;
pub mod network;
pub mod output;
pub mod parser;
pub mod scanner;

// Re-export commonly used types
pub use config::ScanConfig;
pub use error::{ExecutorError, ScanError};
pub use executor::{NmapExecutor, ScanExecutor, ScanMode};
pub use models::{Host, HostStatus, Port, PortState, ScanOutcome, ScanResult, Transport};
pub use network::{detect_local_range, TargetSpec};
pub use scanner::{ConcurrentHostScanner, HostOutcome, ScanType, WorkerPool};

pub type Result<T> = std::result::Result<T, ScanError>;
