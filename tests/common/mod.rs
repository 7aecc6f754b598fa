//! Scripted scan executor shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use hostsweep::{ExecutorError, ScanExecutor, ScanMode};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Canned behaviour for one (target, mode) pair
#[derive(Debug, Clone)]
pub enum Reply {
    Lines(Vec<String>),
    Delayed(Duration, Vec<String>),
    Hang,
    ToolMissing,
    Exit(i32, String),
}

pub fn lines(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

/// Discovery output listing `addresses`, each with a MAC line
pub fn discovery_output(addresses: &[&str]) -> Vec<String> {
    let mut out = vec!["Starting Nmap 7.94 ( https://nmap.org )".to_string()];
    for (i, address) in addresses.iter().enumerate() {
        out.push(format!("Nmap scan report for {}", address));
        out.push("Host is up (0.0021s latency).".to_string());
        out.push(format!("MAC Address: 00:11:22:33:44:{:02X} (Acme Networks)", i));
    }
    out.push(format!(
        "Nmap done: 256 IP addresses ({} hosts up) scanned in 2.10 seconds",
        addresses.len()
    ));
    out
}

/// Detailed output for one host with an open ssh port and a closed http port
pub fn detailed_output(address: &str) -> Vec<String> {
    lines(&[
        "Starting Nmap 7.94 ( https://nmap.org )",
        &format!("Nmap scan report for {}", address),
        "Host is up (0.00042s latency).",
        "Not shown: 18 closed tcp ports (reset)",
        "PORT   STATE  SERVICE VERSION",
        "22/tcp open   ssh     OpenSSH 9.6p1 Ubuntu 3ubuntu13 (Ubuntu Linux; protocol 2.0)",
        "80/tcp closed http",
        "MAC Address: 00:11:22:33:44:55 (Acme Networks)",
        "Service detection performed.",
    ])
}

#[derive(Default)]
pub struct ScriptedExecutor {
    replies: HashMap<(String, ScanMode), Reply>,
    fallback_detailed: Option<Reply>,
    calls: Mutex<Vec<(String, ScanMode)>>,
    running: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, target: &str, mode: ScanMode, reply: Reply) -> Self {
        self.replies.insert((target.to_string(), mode), reply);
        self
    }

    /// Reply used for detailed scans of addresses without an explicit script
    pub fn detailed_default(mut self, reply: Reply) -> Self {
        self.fallback_detailed = Some(reply);
        self
    }

    pub fn calls(&self) -> Vec<(String, ScanMode)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, mode: ScanMode) -> usize {
        self.calls().iter().filter(|(_, m)| *m == mode).count()
    }

    /// Highest number of invocations observed in flight at once
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn reply_for(&self, target: &str, mode: ScanMode) -> Reply {
        if let Some(reply) = self.replies.get(&(target.to_string(), mode)) {
            return reply.clone();
        }
        match (mode, &self.fallback_detailed) {
            (ScanMode::Detailed, Some(reply)) => reply.clone(),
            (ScanMode::Detailed, None) => Reply::Lines(detailed_output(target)),
            _ => Reply::Lines(Vec::new()),
        }
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ScanExecutor for ScriptedExecutor {
    async fn invoke(
        &self,
        target: &str,
        mode: ScanMode,
        _timeout: Duration,
    ) -> Result<Vec<String>, ExecutorError> {
        self.calls.lock().unwrap().push((target.to_string(), mode));

        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.running);

        match self.reply_for(target, mode) {
            Reply::Lines(lines) => Ok(lines),
            Reply::Delayed(delay, lines) => {
                tokio::time::sleep(delay).await;
                Ok(lines)
            }
            Reply::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            Reply::ToolMissing => Err(ExecutorError::ToolMissing {
                tool: "nmap".to_string(),
            }),
            Reply::Exit(code, tail) => Err(ExecutorError::ExitStatus {
                code: Some(code),
                output_tail: tail,
            }),
        }
    }
}
