//! Main scanning engine implementation

use super::{HostOutcome, ScanType, WorkerPool};
use crate::config::ScanConfig;
use crate::error::ExecutorError;
use crate::executor::{NmapExecutor, ScanExecutor, ScanMode};
use crate::models::{Host, ScanResult, ScanRun};
use crate::network::{detect_local_range, TargetSpec};
use crate::parser::{host_is_up, parse_detailed, parse_discovery};
use crate::{Result, ScanError};
use futures::future::join_all;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Discovery sweep followed by bounded-concurrency detailed scans
pub struct ConcurrentHostScanner {
    config: ScanConfig,
    executor: Arc<dyn ScanExecutor>,
    pool: WorkerPool,
    shutdown: CancellationToken,
}

impl ConcurrentHostScanner {
    /// Create a scanner over any executor
    pub fn new(config: ScanConfig, executor: Arc<dyn ScanExecutor>) -> Result<Self> {
        config.validate()?;

        info!(
            "Host scanner ready: {} workers, {}s per host, top {} ports",
            config.worker_pool_size, config.host_timeout_seconds, config.top_ports
        );

        Ok(Self {
            pool: WorkerPool::new(config.worker_pool_size),
            config,
            executor,
            shutdown: CancellationToken::new(),
        })
    }

    /// Create a scanner that drives the nmap binary named in `config`
    pub fn with_nmap(config: ScanConfig) -> Result<Self> {
        let executor = Arc::new(NmapExecutor::from_config(&config));
        Self::new(config, executor)
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Stop accepting work and interrupt every in-flight host scan
    pub fn shutdown(&self) {
        if !self.pool.is_shut_down() {
            info!("Shutting down host scanner");
        }
        self.pool.shutdown();
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.pool.is_shut_down()
    }

    /// Scan `range`, detecting the local network when none is given
    pub async fn scan_network(&self, range: Option<&str>, scan_type: ScanType) -> ScanResult {
        self.scan_network_with_cancel(range, scan_type, CancellationToken::new())
            .await
    }

    /// [`scan_network`](Self::scan_network) that stops early when `cancel` fires
    pub async fn scan_network_with_cancel(
        &self,
        range: Option<&str>,
        scan_type: ScanType,
        cancel: CancellationToken,
    ) -> ScanResult {
        let range = match range.map(str::trim).filter(|r| !r.is_empty()) {
            Some(range) => range.to_string(),
            None => detect_local_range(),
        };

        info!("Starting {} scan of {}", scan_type, range);
        match scan_type {
            ScanType::Quick => self.quick_scan_with_cancel(&range, cancel).await,
            ScanType::Full => self.full_scan_with_cancel(&range, cancel).await,
        }
    }

    /// Discovery only; every discovered host counts as active
    pub async fn quick_scan(&self, range: &str) -> ScanResult {
        self.quick_scan_with_cancel(range, CancellationToken::new()).await
    }

    /// [`quick_scan`](Self::quick_scan) that fails once `cancel` fires
    pub async fn quick_scan_with_cancel(&self, range: &str, cancel: CancellationToken) -> ScanResult {
        let run = ScanRun::start(range);

        let hosts = match self.discover(range, &cancel).await {
            Ok(hosts) => hosts,
            Err(e) => return self.fail(run, e),
        };

        let total = hosts.len();
        info!("Quick scan of {} found {} hosts", range, total);
        run.succeed(hosts, total)
    }

    /// Discovery followed by a detailed scan of every discovered host
    pub async fn full_scan(&self, range: &str) -> ScanResult {
        self.full_scan_with_cancel(range, CancellationToken::new()).await
    }

    /// [`full_scan`](Self::full_scan) that stops early when `cancel` fires.
    ///
    /// Hosts interrupted by cancellation are treated like timed-out hosts
    /// and the result is reported as partial. Cancelling during discovery
    /// fails the scan, since no host list exists yet.
    pub async fn full_scan_with_cancel(&self, range: &str, cancel: CancellationToken) -> ScanResult {
        let run = ScanRun::start(range);
        let start = Instant::now();

        let discovered = match self.discover(range, &cancel).await {
            Ok(hosts) => hosts,
            Err(e) => return self.fail(run, e),
        };

        if discovered.is_empty() {
            warn!("No active hosts found in {}", range);
            return run.succeed(Vec::new(), 0);
        }

        let total = discovered.len();
        info!(
            "Scanning {} hosts in {} with {} workers",
            total,
            range,
            self.pool.size()
        );

        let addresses: Vec<String> = discovered.into_iter().map(|h| h.address).collect();
        let outcomes = self.scan_hosts_concurrently(addresses, &cancel).await;

        let failed = outcomes.iter().filter(|o| !o.is_scanned()).count();
        let hosts: Vec<Host> = outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                HostOutcome::Scanned(host) => Some(host),
                HostOutcome::Failed { .. } => None,
            })
            .collect();

        info!(
            "Full scan of {} finished in {:?}: {}/{} hosts detailed, {} failed",
            range,
            start.elapsed(),
            hosts.len(),
            total,
            failed
        );

        if cancel.is_cancelled() || self.shutdown.is_cancelled() {
            run.partial(hosts, total)
        } else {
            run.succeed(hosts, total)
        }
    }

    /// Detailed scan of one address, outside the pool.
    ///
    /// Unlike batch scans, executor failures are returned to the caller.
    pub async fn scan_single_host(&self, address: &str) -> Result<Host> {
        let address = TargetSpec::parse_address(address)?.to_string();
        if self.is_shut_down() {
            return Err(ScanError::ShutDown);
        }

        info!("Scanning host {}", address);
        let limit = self.config.host_timeout();
        let lines = bounded(self.executor.invoke(&address, ScanMode::Detailed, limit), limit).await?;

        let host = parse_detailed(&lines, &address);
        info!("Host {} scanned, {} open ports", address, host.ports.len());
        Ok(host)
    }

    /// Liveness probe; any failure counts as "not alive"
    pub async fn is_host_alive(&self, address: &str) -> bool {
        let address = match TargetSpec::parse_address(address) {
            Ok(address) => address.to_string(),
            Err(e) => {
                warn!("Not probing {}: {}", address, e);
                return false;
            }
        };

        let limit = self.config.host_timeout();
        match bounded(self.executor.invoke(&address, ScanMode::Ping, limit), limit).await {
            Ok(lines) => host_is_up(&lines),
            Err(e) => {
                warn!("Liveness check of {} failed: {}", address, e);
                false
            }
        }
    }

    async fn discover(&self, range: &str, cancel: &CancellationToken) -> Result<Vec<Host>> {
        if self.is_shut_down() {
            return Err(ScanError::ShutDown);
        }

        let target = TargetSpec::parse(range)?;
        debug!("Discovery sweep over {} ({} addresses)", target, target.size());

        let limit = self.config.discovery_timeout();
        let target = target.to_string();
        let invocation = bounded(self.executor.invoke(&target, ScanMode::Discovery, limit), limit);

        // dropping the invocation kills the discovery process
        let result = tokio::select! {
            _ = cancel.cancelled() => Err(ExecutorError::Cancelled),
            _ = self.shutdown.cancelled() => Err(ExecutorError::Cancelled),
            result = invocation => result,
        };
        let lines = result?;

        Ok(parse_discovery(&lines))
    }

    /// One unit per address; results come back in submission order
    async fn scan_hosts_concurrently(
        &self,
        addresses: Vec<String>,
        cancel: &CancellationToken,
    ) -> Vec<HostOutcome> {
        let limit = self.config.host_timeout();

        let handles: Vec<_> = addresses
            .iter()
            .map(|address| {
                let unit = detail_unit(
                    self.executor.clone(),
                    address.clone(),
                    limit,
                    cancel.clone(),
                    self.shutdown.clone(),
                );
                self.pool.submit(unit)
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .zip(addresses)
            .map(|(joined, address)| match joined {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => {
                    warn!("Host {} was not scanned: {}", address, e);
                    HostOutcome::Failed {
                        address,
                        reason: e.to_string(),
                    }
                }
                Err(e) => {
                    error!("Scan task for {} aborted: {}", address, e);
                    HostOutcome::Failed {
                        address,
                        reason: format!("scan task aborted: {}", e),
                    }
                }
            })
            .collect()
    }

    fn fail(&self, run: ScanRun, err: ScanError) -> ScanResult {
        error!("Scan of {} failed: {}", run.range(), err);
        run.fail(err.to_string())
    }
}

impl Drop for ConcurrentHostScanner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Detailed scan of one address, never failing
async fn detail_unit(
    executor: Arc<dyn ScanExecutor>,
    address: String,
    limit: Duration,
    cancel: CancellationToken,
    shutdown: CancellationToken,
) -> HostOutcome {
    let invocation = bounded(executor.invoke(&address, ScanMode::Detailed, limit), limit);

    let result = tokio::select! {
        _ = cancel.cancelled() => Err(ExecutorError::Cancelled),
        _ = shutdown.cancelled() => Err(ExecutorError::Cancelled),
        result = invocation => result,
    };

    match result {
        Ok(lines) => HostOutcome::Scanned(parse_detailed(&lines, &address)),
        Err(e) => {
            if e.is_interrupted() {
                info!("Gave up on host {}: {}", address, e);
            } else {
                warn!("Error scanning host {}: {}", address, e);
            }
            HostOutcome::Failed {
                address,
                reason: e.to_string(),
            }
        }
    }
}

/// Enforce `limit` even on executors that ignore their timeout argument
async fn bounded<F>(invocation: F, limit: Duration) -> std::result::Result<Vec<String>, ExecutorError>
where
    F: std::future::Future<Output = std::result::Result<Vec<String>, ExecutorError>>,
{
    tokio::time::timeout(limit, invocation)
        .await
        .unwrap_or(Err(ExecutorError::Timeout(limit)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every invocation and answers from a fixed script
    struct RecordingExecutor {
        discovery: Vec<String>,
        calls: Mutex<Vec<(String, ScanMode)>>,
    }

    #[async_trait]
    impl ScanExecutor for RecordingExecutor {
        async fn invoke(
            &self,
            target: &str,
            mode: ScanMode,
            _timeout: Duration,
        ) -> std::result::Result<Vec<String>, ExecutorError> {
            self.calls.lock().unwrap().push((target.to_string(), mode));
            match mode {
                ScanMode::Discovery => Ok(self.discovery.clone()),
                ScanMode::Detailed => Ok(vec![
                    format!("Nmap scan report for {}", target),
                    "Host is up (0.0010s latency).".to_string(),
                    "22/tcp open ssh OpenSSH 9.6".to_string(),
                ]),
                ScanMode::Ping => Ok(vec!["Host is up.".to_string()]),
            }
        }
    }

    fn scanner(discovery: &[&str]) -> (ConcurrentHostScanner, Arc<RecordingExecutor>) {
        let executor = Arc::new(RecordingExecutor {
            discovery: discovery.iter().map(|s| s.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        });
        let scanner = ConcurrentHostScanner::new(
            ScanConfig::default().with_worker_pool_size(2),
            executor.clone(),
        )
        .unwrap();
        (scanner, executor)
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let executor = Arc::new(NmapExecutor::new("nmap", 20));
        let result = ConcurrentHostScanner::new(ScanConfig::default().with_worker_pool_size(0), executor);
        assert!(matches!(result, Err(ScanError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_full_scan_keeps_discovery_order() {
        let (scanner, executor) = scanner(&[
            "Nmap scan report for 10.0.0.7",
            "Nmap scan report for 10.0.0.2",
            "Nmap scan report for 10.0.0.5",
        ]);

        let result = scanner.full_scan("10.0.0.0/24").await;
        assert!(result.is_success());
        let order: Vec<&str> = result.hosts().iter().map(|h| h.address.as_str()).collect();
        assert_eq!(order, vec!["10.0.0.7", "10.0.0.2", "10.0.0.5"]);
        assert_eq!(result.open_port_count(), 3);

        let calls = executor.calls.lock().unwrap();
        assert_eq!(calls[0], ("10.0.0.0/24".to_string(), ScanMode::Discovery));
        assert_eq!(calls.iter().filter(|(_, m)| *m == ScanMode::Detailed).count(), 3);
    }

    #[tokio::test]
    async fn test_invalid_range_fails_without_invoking() {
        let (scanner, executor) = scanner(&[]);
        let result = scanner.quick_scan("10.0.0.0/99").await;

        assert_eq!(result.outcome(), crate::models::ScanOutcome::Failed);
        assert!(result.error_message().unwrap().contains("Invalid target"));
        assert!(executor.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scan_after_shutdown_fails() {
        let (scanner, _) = scanner(&["Nmap scan report for 10.0.0.1"]);
        scanner.shutdown();

        let result = scanner.full_scan("10.0.0.0/24").await;
        assert_eq!(result.outcome(), crate::models::ScanOutcome::Failed);
        assert_eq!(result.error_message(), Some("scanner has been shut down"));
        assert!(matches!(
            scanner.scan_single_host("10.0.0.1").await,
            Err(ScanError::ShutDown)
        ));
    }

    #[tokio::test]
    async fn test_is_host_alive_uses_ping_mode() {
        let (scanner, executor) = scanner(&[]);
        assert!(scanner.is_host_alive("10.0.0.1").await);
        assert!(!scanner.is_host_alive("not-an-ip").await);
        assert_eq!(
            executor.calls.lock().unwrap().as_slice(),
            &[("10.0.0.1".to_string(), ScanMode::Ping)]
        );
    }

    #[tokio::test]
    async fn test_scan_network_with_explicit_range() {
        let (scanner, executor) = scanner(&["Nmap scan report for 10.9.0.1"]);
        let result = scanner.scan_network(Some(" 10.9.0.0/24 "), ScanType::Quick).await;

        assert_eq!(result.range(), "10.9.0.0/24");
        assert_eq!(result.active_found(), 1);
        assert_eq!(executor.calls.lock().unwrap().len(), 1);
    }
}
