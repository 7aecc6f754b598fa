//! Fixed-size worker pool for detailed host scans

use crate::ScanError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Bounds how many units of work run at once.
///
/// Units are spawned onto the tokio runtime immediately but each one waits
/// for a permit before starting, so at most `size` run concurrently.
/// After [`shutdown`](WorkerPool::shutdown) queued and future units resolve
/// to [`ScanError::ShutDown`] without running.
#[derive(Debug)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Permits not currently held by a running unit
    pub fn idle_slots(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn is_shut_down(&self) -> bool {
        self.semaphore.is_closed()
    }

    pub fn shutdown(&self) {
        self.semaphore.close();
    }

    pub fn submit<F, T>(&self, work: F) -> JoinHandle<Result<T, ScanError>>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let semaphore = self.semaphore.clone();
        tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| ScanError::ShutDown)?; // Keep permit alive
            Ok(work.await)
        })
    }
}
