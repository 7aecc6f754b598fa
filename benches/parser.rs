//! Performance benchmarks for output parsing and scan orchestration

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hostsweep::{
    config::ScanConfig,
    parser::{parse_detailed, parse_discovery},
    ConcurrentHostScanner, ExecutorError, ScanExecutor, ScanMode,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

fn discovery_lines(hosts: usize) -> Vec<String> {
    let mut lines = vec!["Starting Nmap 7.94 ( https://nmap.org )".to_string()];
    for i in 0..hosts {
        let (hi, lo) = (i / 256, i % 256);
        lines.push(format!("Nmap scan report for host-{}.lan (10.{}.{}.{})", i, hi / 256, hi % 256, lo));
        lines.push("Host is up (0.0012s latency).".to_string());
        lines.push(format!("MAC Address: 02:00:00:00:{:02X}:{:02X} (Private)", hi % 256, lo));
    }
    lines.push(format!("Nmap done: {} IP addresses scanned", hosts));
    lines
}

fn detailed_lines(ports: usize) -> Vec<String> {
    let mut lines = vec![
        "Nmap scan report for 10.0.0.1".to_string(),
        "Host is up (0.00031s latency).".to_string(),
        "PORT     STATE  SERVICE VERSION".to_string(),
    ];
    for port in 1..=ports {
        let state = if port % 3 == 0 { "closed" } else { "open" };
        lines.push(format!("{}/tcp {} svc-{} Example Server {}.0", port, state, port, port % 10));
    }
    lines.push("MAC Address: 02:00:00:00:00:01 (Private)".to_string());
    lines.push("OS details: Linux 5.0 - 5.14".to_string());
    lines
}

/// Benchmark discovery parsing across network sizes
fn bench_parse_discovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_discovery");

    for hosts in [16, 254, 4096] {
        let lines = discovery_lines(hosts);
        group.bench_with_input(BenchmarkId::from_parameter(hosts), &lines, |b, lines| {
            b.iter(|| black_box(parse_discovery(black_box(lines))))
        });
    }

    group.finish();
}

/// Benchmark detailed parsing with growing port tables
fn bench_parse_detailed(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_detailed");

    for ports in [20, 100, 1000] {
        let lines = detailed_lines(ports);
        group.bench_with_input(BenchmarkId::from_parameter(ports), &lines, |b, lines| {
            b.iter(|| black_box(parse_detailed(black_box(lines), "10.0.0.1")))
        });
    }

    group.finish();
}

/// Executor that answers instantly from canned output
struct CannedExecutor {
    discovery: Vec<String>,
    detailed: Vec<String>,
}

#[async_trait]
impl ScanExecutor for CannedExecutor {
    async fn invoke(
        &self,
        _target: &str,
        mode: ScanMode,
        _timeout: Duration,
    ) -> Result<Vec<String>, ExecutorError> {
        Ok(match mode {
            ScanMode::Discovery => self.discovery.clone(),
            _ => self.detailed.clone(),
        })
    }
}

/// Benchmark orchestration overhead with an instant executor
fn bench_full_scan(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("full_scan");
    group.sample_size(20);

    for hosts in [16, 254] {
        let executor = Arc::new(CannedExecutor {
            discovery: discovery_lines(hosts),
            detailed: detailed_lines(20),
        });

        for workers in [1, 20, 100] {
            let config = ScanConfig::default().with_worker_pool_size(workers);
            let scanner = ConcurrentHostScanner::new(config, executor.clone()).unwrap();

            group.bench_function(format!("{}_hosts_{}_workers", hosts, workers), |b| {
                b.to_async(&rt).iter(|| async {
                    black_box(scanner.full_scan("10.0.0.0/16").await)
                })
            });
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_discovery,
    bench_parse_detailed,
    bench_full_scan
);
criterion_main!(benches);
