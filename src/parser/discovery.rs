//! Discovery-mode interpretation (`nmap -sn`)
//!
//! nmap prints one `Nmap scan report for ...` line per responding host,
//! optionally followed by a `MAC Address:` line. Hosts without a hardware
//! line (the scanning machine itself, hosts behind a router) are still real
//! and must be emitted, so the parser keeps one host pending until it sees
//! what comes next.

use super::patterns;
use crate::models::{Host, HostStatus};
use log::{debug, trace};
use std::collections::HashSet;

/// A host announcement still waiting for its hardware-address line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingHost {
    pub address: String,
    pub hostname: Option<String>,
    pub latency_ms: Option<u64>,
}

impl PendingHost {
    fn into_host(self) -> Host {
        let mut host = Host::new(self.address, HostStatus::Up).with_hostname(self.hostname);
        host.response_time_ms = self.latency_ms;
        host
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryState {
    Idle,
    Pending(PendingHost),
}

/// Single-pass state machine over discovery output
#[derive(Debug)]
pub struct DiscoveryMachine {
    state: DiscoveryState,
    hosts: Vec<Host>,
    seen: HashSet<String>,
}

impl Default for DiscoveryMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoveryMachine {
    pub fn new() -> Self {
        Self {
            state: DiscoveryState::Idle,
            hosts: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn state(&self) -> &DiscoveryState {
        &self.state
    }

    /// Feed one line of output
    pub fn feed(&mut self, line: &str) {
        if let Some(announced) = patterns::announcement(line) {
            trace!("announcement for {}", announced.address);
            self.flush();
            self.state = DiscoveryState::Pending(PendingHost {
                address: announced.address.to_string(),
                hostname: announced.hostname.map(str::to_string),
                latency_ms: None,
            });
            return;
        }

        if let Some(hw) = patterns::hardware(line) {
            if let DiscoveryState::Pending(pending) =
                std::mem::replace(&mut self.state, DiscoveryState::Idle)
            {
                let host = pending
                    .into_host()
                    .with_hardware(hw.hardware_address, hw.vendor);
                self.emit(host);
            }
        } else if let Some(up) = patterns::host_up(line) {
            if let DiscoveryState::Pending(pending) = &mut self.state {
                if up.latency_ms.is_some() {
                    pending.latency_ms = up.latency_ms;
                }
            }
        }
    }

    /// End of input: emit whatever is still pending and return the hosts
    pub fn finish(mut self) -> Vec<Host> {
        self.flush();
        self.hosts
    }

    fn flush(&mut self) {
        if let DiscoveryState::Pending(pending) =
            std::mem::replace(&mut self.state, DiscoveryState::Idle)
        {
            self.emit(pending.into_host());
        }
    }

    fn emit(&mut self, host: Host) {
        if self.seen.insert(host.address.clone()) {
            self.hosts.push(host);
        } else {
            debug!("duplicate report for {} ignored", host.address);
        }
    }
}

/// Turn discovery output into hosts with status `up` and no ports.
///
/// Never fails: lines that match nothing are skipped.
pub fn parse_discovery<S: AsRef<str>>(lines: &[S]) -> Vec<Host> {
    let mut machine = DiscoveryMachine::new();
    for line in lines {
        machine.feed(line.as_ref());
    }
    let hosts = machine.finish();
    debug!("discovery output: {} lines, {} hosts", lines.len(), hosts.len());
    hosts
}
