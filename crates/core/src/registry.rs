//! Registry of live stream workers keyed by OS pid.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::worker::{WorkerHandle, WorkerState};

/// Authoritative map of live worker handles.
///
/// A pid is present exactly while its process is believed to be running:
/// entries are inserted on successful spawn and removed by the exit monitor
/// once the process is reaped. All methods are atomic with respect to each
/// other, so concurrent start/stop requests and exit notifications never
/// observe a half-updated map.
#[derive(Default)]
pub struct WorkerRegistry {
    workers: RwLock<HashMap<u32, Arc<WorkerHandle>>>,
}

impl WorkerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly spawned handle.
    ///
    /// Panics if the pid is already registered: live pids are unique, so a
    /// collision means a stale entry survived an exit.
    pub async fn register(&self, handle: Arc<WorkerHandle>) {
        let pid = handle.pid;
        let prev = self.workers.write().await.insert(pid, handle);
        assert!(prev.is_none(), "pid {} registered twice", pid);
    }

    /// Look up a live worker.
    pub async fn lookup(&self, pid: u32) -> Option<Arc<WorkerHandle>> {
        self.workers.read().await.get(&pid).cloned()
    }

    /// Remove a worker.
    ///
    /// Idempotent: duplicate exit/stop notifications for the same pid return
    /// `None` rather than failing.
    pub async fn remove(&self, pid: u32) -> Option<Arc<WorkerHandle>> {
        self.workers.write().await.remove(&pid)
    }

    /// Update a worker's state. No-op when the pid has already been cleaned up.
    pub async fn update_state(&self, pid: u32, state: WorkerState) {
        if let Some(handle) = self.lookup(pid).await {
            handle.set_state(state).await;
        }
    }

    /// Snapshot of all live handles.
    pub async fn active(&self) -> Vec<Arc<WorkerHandle>> {
        self.workers.read().await.values().cloned().collect()
    }

    /// Number of live workers.
    pub async fn len(&self) -> usize {
        self.workers.read().await.len()
    }

    /// Whether any workers are live.
    pub async fn is_empty(&self) -> bool {
        self.workers.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(pid: u32) -> Arc<WorkerHandle> {
        Arc::new(WorkerHandle::detached(
            pid,
            format!("rtsp://example/{}", pid),
        ))
    }

    #[tokio::test]
    async fn register_and_lookup() {
        let registry = WorkerRegistry::new();
        registry.register(handle(42)).await;

        let found = registry.lookup(42).await.unwrap();
        assert_eq!(found.pid, 42);
        assert_eq!(found.stream_url, "rtsp://example/42");
        assert!(registry.lookup(43).await.is_none());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let registry = WorkerRegistry::new();
        registry.register(handle(42)).await;

        assert!(registry.remove(42).await.is_some());
        assert!(registry.remove(42).await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    #[should_panic(expected = "registered twice")]
    async fn duplicate_register_panics() {
        let registry = WorkerRegistry::new();
        registry.register(handle(42)).await;
        registry.register(handle(42)).await;
    }

    #[tokio::test]
    async fn update_state_on_absent_pid_is_noop() {
        let registry = WorkerRegistry::new();
        registry.update_state(42, WorkerState::Running).await;
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn update_state_mutates_live_handle() {
        let registry = WorkerRegistry::new();
        registry.register(handle(42)).await;
        registry.update_state(42, WorkerState::Stopping).await;

        let found = registry.lookup(42).await.unwrap();
        assert_eq!(found.state().await, WorkerState::Stopping);
    }

    #[tokio::test]
    async fn active_snapshots_all_handles() {
        let registry = WorkerRegistry::new();
        registry.register(handle(1)).await;
        registry.register(handle(2)).await;
        registry.register(handle(3)).await;

        let mut pids: Vec<u32> = registry.active().await.iter().map(|h| h.pid).collect();
        pids.sort_unstable();
        assert_eq!(pids, vec![1, 2, 3]);
        assert_eq!(registry.len().await, 3);
    }
}
