//! Scan executor - runs the external scanning tool for one target
//!
//! The scanner never touches processes directly; it talks to a
//! [`ScanExecutor`]. [`NmapExecutor`] is the production implementation,
//! tests plug in scripted executors.

pub mod nmap;

use crate::error::ExecutorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub use nmap::NmapExecutor;

/// What kind of probe to run against a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Liveness sweep over a range, no port enumeration
    Discovery,
    /// Port, service and version enumeration of one address
    Detailed,
    /// Liveness check of one address
    Ping,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScanMode::Discovery => "discovery",
            ScanMode::Detailed => "detailed",
            ScanMode::Ping => "ping",
        };
        f.write_str(s)
    }
}

/// Runs one invocation of the scanning tool.
///
/// Implementations return the combined stdout/stderr lines. Lines of one
/// stream keep their relative order; how the two streams interleave is
/// unspecified. Implementations must stop (and clean up) the underlying
/// work once `timeout` elapses.
/// Dropping the returned future must also stop it.
#[async_trait]
pub trait ScanExecutor: Send + Sync {
    async fn invoke(
        &self,
        target: &str,
        mode: ScanMode,
        timeout: Duration,
    ) -> Result<Vec<String>, ExecutorError>;
}

#[async_trait]
impl<T: ScanExecutor + ?Sized> ScanExecutor for std::sync::Arc<T> {
    async fn invoke(
        &self,
        target: &str,
        mode: ScanMode,
        timeout: Duration,
    ) -> Result<Vec<String>, ExecutorError> {
        (**self).invoke(target, mode, timeout).await
    }
}
