//! Output formatting for scan results

use crate::models::{Host, HostStatus, ScanOutcome, ScanResult};
use colored::*;
use std::fmt::Write;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Compact JSON using the wire field names
pub fn to_json(result: &ScanResult) -> serde_json::Result<String> {
    serde_json::to_string(result)
}

pub fn to_json_pretty(result: &ScanResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

pub fn from_json(json: &str) -> serde_json::Result<ScanResult> {
    serde_json::from_str(json)
}

/// Human-readable report of a whole scan
pub fn render_text(result: &ScanResult) -> String {
    let mut out = String::new();

    let marker = match result.outcome() {
        ScanOutcome::Success => "[✓]".bright_green(),
        ScanOutcome::Partial => "[~]".bright_yellow(),
        ScanOutcome::Failed => "[!]".bright_red(),
    };

    let _ = writeln!(
        out,
        "{} Scan of {} {} in {}ms",
        marker,
        result.range().bold(),
        result.outcome(),
        result.duration_ms()
    );

    if let Some(message) = result.error_message() {
        let _ = writeln!(out, "    {}", message.red());
        return out;
    }

    let _ = writeln!(
        out,
        "    {} active of {} discovered, {} open ports",
        result.active_found(),
        result.total_scanned(),
        result.open_port_count()
    );

    for host in result.hosts() {
        out.push('\n');
        out.push_str(&render_host(host));
    }

    out
}

/// Report for one host and its open ports
pub fn render_host(host: &Host) -> String {
    let mut out = String::new();

    let status = match host.status {
        HostStatus::Up => host.status.to_string().bright_green(),
        HostStatus::Error => host.status.to_string().bright_red(),
        _ => host.status.to_string().bright_yellow(),
    };

    let _ = write!(out, "{} {}", "[+]".bright_cyan(), host.address.bold());
    if let Some(hostname) = &host.hostname {
        let _ = write!(out, " ({})", hostname);
    }
    let _ = write!(out, " {}", status);
    if let Some(ms) = host.response_time_ms {
        let _ = write!(out, " {}ms", ms);
    }
    out.push('\n');

    if let Some(mac) = &host.hardware_address {
        let vendor = host.vendor.as_deref().unwrap_or("unknown vendor");
        let _ = writeln!(out, "    MAC: {} ({})", mac, vendor);
    }
    if let Some(os) = &host.operating_system {
        let _ = writeln!(out, "    OS:  {}", os);
    }

    for port in &host.ports {
        let _ = write!(
            out,
            "    {:<10} {:<8} {}",
            format!("{}/{}", port.number, port.transport),
            port.state.to_string().green(),
            port.service.as_deref().unwrap_or("unknown")
        );
        if let Some(version) = &port.version {
            let _ = write!(out, " {}", version.dimmed());
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Port, PortState, ScanRun, Transport};

    fn sample() -> ScanResult {
        let mut host = Host::new("192.168.1.10", HostStatus::Up)
            .with_hostname(Some("nas.lan".to_string()))
            .with_hardware("AA:BB:CC:DD:EE:FF", "Synology");
        host.response_time_ms = Some(2);
        host.ports.push(
            Port::new(445, Transport::Tcp, PortState::Open)
                .with_service("microsoft-ds")
                .with_version("Samba smbd 4"),
        );
        ScanRun::start("192.168.1.0/24").succeed(vec![host], 1)
    }

    #[test]
    fn test_text_report_lists_hosts_and_ports() {
        colored::control::set_override(false);
        let text = render_text(&sample());

        assert!(text.contains("[✓] Scan of 192.168.1.0/24 SUCCESS"));
        assert!(text.contains("1 active of 1 discovered, 1 open ports"));
        assert!(text.contains("192.168.1.10 (nas.lan) up 2ms"));
        assert!(text.contains("MAC: AA:BB:CC:DD:EE:FF (Synology)"));
        assert!(text.contains("445/tcp"));
        assert!(text.contains("Samba smbd 4"));
    }

    #[test]
    fn test_failed_report_shows_message() {
        colored::control::set_override(false);
        let result = ScanRun::start("10.0.0.0/8").fail("nmap is not installed");
        let text = render_text(&result);

        assert!(text.starts_with("[!]"));
        assert!(text.contains("nmap is not installed"));
        assert!(!text.contains("[+]"));
    }

    #[test]
    fn test_json_output_round_trips() {
        let result = sample();
        let json = to_json_pretty(&result).unwrap();
        assert!(json.contains("\"networkRange\": \"192.168.1.0/24\""));
        assert_eq!(from_json(&json).unwrap(), result);
    }
}
