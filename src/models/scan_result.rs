//! Aggregate result of one top-level scan

use super::Host;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScanOutcome {
    Success,
    Partial,
    Failed,
}

impl fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScanOutcome::Success => "SUCCESS",
            ScanOutcome::Partial => "PARTIAL",
            ScanOutcome::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// A scan that has started but not been finalized.
///
/// Created when an operation begins; consumed by exactly one of
/// [`succeed`](ScanRun::succeed), [`partial`](ScanRun::partial) or
/// [`fail`](ScanRun::fail), so an outcome can only be decided once.
#[derive(Debug)]
pub struct ScanRun {
    range: String,
    started_at: DateTime<Utc>,
}

impl ScanRun {
    pub fn start(range: impl Into<String>) -> Self {
        Self {
            range: range.into(),
            started_at: Utc::now(),
        }
    }

    pub fn range(&self) -> &str {
        &self.range
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn succeed(self, hosts: Vec<Host>, total_scanned: usize) -> ScanResult {
        self.finish(ScanOutcome::Success, hosts, total_scanned, None)
    }

    pub fn partial(self, hosts: Vec<Host>, total_scanned: usize) -> ScanResult {
        self.finish(ScanOutcome::Partial, hosts, total_scanned, None)
    }

    pub fn fail(self, message: impl Into<String>) -> ScanResult {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = "scan failed".to_string();
        }
        self.finish(ScanOutcome::Failed, Vec::new(), 0, Some(message))
    }

    fn finish(
        self,
        outcome: ScanOutcome,
        hosts: Vec<Host>,
        total_scanned: usize,
        error_message: Option<String>,
    ) -> ScanResult {
        // Wall clock can step backwards; never report a negative duration.
        let finished_at = Utc::now().max(self.started_at);
        let duration_ms = (finished_at - self.started_at).num_milliseconds();

        ScanResult {
            range: self.range,
            started_at: self.started_at,
            finished_at,
            duration_ms,
            active_found: hosts.len(),
            hosts,
            total_scanned,
            outcome,
            error_message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    #[serde(rename = "networkRange")]
    range: String,
    #[serde(rename = "scanStartTime")]
    started_at: DateTime<Utc>,
    #[serde(rename = "scanEndTime")]
    finished_at: DateTime<Utc>,
    #[serde(rename = "durationMs")]
    duration_ms: i64,
    #[serde(rename = "devices", default)]
    hosts: Vec<Host>,
    #[serde(rename = "totalHostsScanned")]
    total_scanned: usize,
    #[serde(rename = "activeHostsFound")]
    active_found: usize,
    #[serde(rename = "status")]
    outcome: ScanOutcome,
    #[serde(rename = "errorMessage", default, skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
}

impl ScanResult {
    pub fn range(&self) -> &str {
        &self.range
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    pub fn duration(&self) -> Duration {
        self.finished_at - self.started_at
    }

    pub fn duration_ms(&self) -> i64 {
        self.duration_ms
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    pub fn total_scanned(&self) -> usize {
        self.total_scanned
    }

    pub fn active_found(&self) -> usize {
        self.active_found
    }

    pub fn outcome(&self) -> ScanOutcome {
        self.outcome
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.outcome == ScanOutcome::Success
    }

    /// Total open ports across every host in the result
    pub fn open_port_count(&self) -> usize {
        self.hosts.iter().map(|h| h.ports.len()).sum()
    }
}
