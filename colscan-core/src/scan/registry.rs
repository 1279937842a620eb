//! Tracking of background scan tasks.

use futures::future::join_all;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::warn;
use uuid::Uuid;

/// Owns the task handle of every scan started by an orchestrator.
///
/// Finished tasks are pruned lazily whenever the registry is touched.
#[derive(Debug, Default)]
pub struct ScanRegistry {
    tasks: Mutex<HashMap<Uuid, JoinHandle<()>>>,
}

impl ScanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking the task running `scan_id`.
    pub fn track(&self, scan_id: Uuid, handle: JoinHandle<()>) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|_, task| !task.is_finished());
        tasks.insert(scan_id, handle);
    }

    /// Ids of scans whose task is still running.
    pub fn active(&self) -> Vec<Uuid> {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|_, task| !task.is_finished());
        tasks.keys().copied().collect()
    }

    /// True if the task for `scan_id` is tracked and not finished.
    pub fn is_running(&self, scan_id: Uuid) -> bool {
        let tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.get(&scan_id).is_some_and(|task| !task.is_finished())
    }

    /// Waits for the task of `scan_id` to finish.
    ///
    /// Returns `false` immediately if the scan is not tracked, e.g. because
    /// it already finished and was pruned or was waited for before.
    pub async fn wait_for(&self, scan_id: Uuid) -> bool {
        let handle = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&scan_id);

        match handle {
            Some(handle) => {
                if let Err(e) = handle.await {
                    warn!(scan_id = %scan_id, error = %e, "Scan task ended abnormally");
                }
                true
            }
            None => false,
        }
    }

    /// Waits for every tracked task to finish.
    pub async fn wait_all(&self) {
        let handles: Vec<(Uuid, JoinHandle<()>)> = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .collect();

        let (ids, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
        for (scan_id, outcome) in ids.into_iter().zip(join_all(handles).await) {
            if let Err(e) = outcome {
                warn!(scan_id = %scan_id, error = %e, "Scan task ended abnormally");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_wait_for_tracked_task() {
        let registry = ScanRegistry::new();
        let scan_id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel::<()>();

        registry.track(
            scan_id,
            tokio::spawn(async move {
                let _ = rx.await;
            }),
        );
        assert_eq!(registry.active(), vec![scan_id]);
        assert!(registry.is_running(scan_id));

        tx.send(()).unwrap();
        assert!(registry.wait_for(scan_id).await);
        assert!(!registry.wait_for(scan_id).await);
        assert!(registry.active().is_empty());
    }

    #[tokio::test]
    async fn test_wait_for_unknown_scan_returns_immediately() {
        let registry = ScanRegistry::new();
        assert!(!registry.wait_for(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn test_finished_tasks_are_pruned() {
        let registry = ScanRegistry::new();
        let scan_id = Uuid::new_v4();
        let handle = tokio::spawn(async {});

        while !handle.is_finished() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        registry.track(scan_id, handle);

        assert!(registry.active().is_empty());
        assert!(!registry.is_running(scan_id));
    }

    #[tokio::test]
    async fn test_wait_all_drains_registry() {
        let registry = ScanRegistry::new();
        for _ in 0..3 {
            registry.track(
                Uuid::new_v4(),
                tokio::spawn(async {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }),
            );
        }
        registry.wait_all().await;
        assert!(registry.active().is_empty());
    }
}
