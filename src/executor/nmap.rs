//! nmap subprocess adapter

use super::{ScanExecutor, ScanMode};
use crate::config::ScanConfig;
use crate::error::ExecutorError;
use async_trait::async_trait;
use log::{debug, trace, warn};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Runs nmap directly (no shell) and captures its output line by line.
///
/// stdout and stderr are read from separate pipes as lines arrive, so each
/// stream stays in order but lines of the two may interleave differently
/// than on a terminal. nmap writes every report line to stdout; stderr only
/// carries warnings and errors.
#[derive(Debug, Clone)]
pub struct NmapExecutor {
    nmap_path: String,
    top_ports: u16,
}

impl NmapExecutor {
    pub fn new(nmap_path: impl Into<String>, top_ports: u16) -> Self {
        Self {
            nmap_path: nmap_path.into(),
            top_ports,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.nmap_path.clone(), config.top_ports)
    }

    pub fn nmap_path(&self) -> &str {
        &self.nmap_path
    }

    /// Command-line arguments for one invocation
    pub fn arguments(&self, target: &str, mode: ScanMode) -> Vec<String> {
        let mut args: Vec<String> = match mode {
            // ping sweep, ARP on local segments
            ScanMode::Discovery => vec!["-sn".into(), "-PR".into()],
            ScanMode::Detailed => vec![
                "-sV".into(),
                "--top-ports".into(),
                self.top_ports.to_string(),
            ],
            ScanMode::Ping => vec!["-sn".into()],
        };
        args.push(target.to_string());
        args
    }
}

#[async_trait]
impl ScanExecutor for NmapExecutor {
    async fn invoke(
        &self,
        target: &str,
        mode: ScanMode,
        limit: Duration,
    ) -> Result<Vec<String>, ExecutorError> {
        let args = self.arguments(target, mode);
        debug!("Executing: {} {}", self.nmap_path, args.join(" "));

        let start = Instant::now();
        let mut child = Command::new(&self.nmap_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecutorError::from_spawn(&self.nmap_path, e))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let run = async {
            let (tx, mut rx) = mpsc::unbounded_channel();
            let collect = async {
                let mut lines = Vec::new();
                while let Some(line) = rx.recv().await {
                    trace!("nmap: {}", line);
                    lines.push(line);
                }
                lines
            };

            let (_, _, lines) = tokio::join!(
                forward_lines(stdout, tx.clone()),
                forward_lines(stderr, tx),
                collect
            );

            let status = child.wait().await.map_err(ExecutorError::Spawn)?;
            Ok::<_, ExecutorError>((status, lines))
        };

        let (status, lines) = match timeout(limit, run).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("nmap {} against {} exceeded {:?}, killing it", mode, target, limit);
                if let Err(e) = child.start_kill() {
                    debug!("kill after timeout failed: {}", e);
                }
                return Err(ExecutorError::Timeout(limit));
            }
        };

        debug!(
            "nmap {} against {} finished with {:?} in {:?}, {} lines",
            mode,
            target,
            status.code(),
            start.elapsed(),
            lines.len()
        );

        if !status.success() {
            return Err(ExecutorError::from_exit(&self.nmap_path, status.code(), &lines));
        }

        Ok(lines)
    }
}

/// Forward every line of `reader` into `tx`, decoding lossily
async fn forward_lines<R>(reader: Option<R>, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return;
    };

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf)
                    .trim_end_matches(|c: char| c == '\r' || c == '\n')
                    .to_string();
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!("stopped reading scan output: {}", e);
                break;
            }
        }
    }
}
