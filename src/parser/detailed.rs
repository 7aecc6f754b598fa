//! Detailed single-host interpretation (`nmap -sV --top-ports N <addr>`)

use super::patterns;
use crate::models::{Host, HostStatus};
use log::debug;

/// Build the record for `requested_address` from detailed scan output.
///
/// The record starts as `unknown` and is only ever enriched: a host-up line
/// marks it `up`, the last `MAC Address:` line wins, the first `OS details:`
/// line wins, and every port line in state `open` is appended in input
/// order. Closed and filtered ports are recognized but dropped.
pub fn parse_detailed<S: AsRef<str>>(lines: &[S], requested_address: &str) -> Host {
    let mut host = Host::new(requested_address, HostStatus::Unknown);
    let mut skipped_ports = 0usize;

    for line in lines {
        let line = line.as_ref();

        if let Some(announced) = patterns::announcement(line) {
            if announced.address == requested_address && announced.hostname.is_some() {
                host.hostname = announced.hostname.map(str::to_string);
            }
        }

        if let Some(up) = patterns::host_up(line) {
            host.status = HostStatus::Up;
            if up.latency_ms.is_some() {
                host.response_time_ms = up.latency_ms;
            }
        }

        if let Some(hw) = patterns::hardware(line) {
            host.hardware_address = Some(hw.hardware_address.to_string());
            host.vendor = Some(hw.vendor.to_string());
        }

        if host.operating_system.is_none() {
            if let Some(os) = patterns::operating_system(line) {
                host.operating_system = Some(os.to_string());
            }
        }

        if let Some(port) = patterns::port(line) {
            if port.is_open() {
                host.ports.push(port);
            } else {
                skipped_ports += 1;
            }
        }
    }

    debug!(
        "{}: status {}, {} open ports, {} non-open ports dropped",
        requested_address,
        host.status,
        host.ports.len(),
        skipped_ports
    );

    host
}

/// True when any line carries the host-up indicator
pub fn host_is_up<S: AsRef<str>>(lines: &[S]) -> bool {
    lines.iter().any(|line| patterns::host_up(line.as_ref()).is_some())
}
