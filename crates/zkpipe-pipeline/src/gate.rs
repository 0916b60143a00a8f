//! # Concurrency Gate
//!
//! The on-disk workspace has no locking of its own: two compiles of the
//! same circuit name race on the same artifact directory, and two key
//! derivations race on the same key file. The gate supplies the
//! discipline a server deployment needs:
//!
//! - a per-circuit-name mutex serializing artifact-writing operations,
//! - a bounded semaphore over every external tool spawn, and
//! - one dedicated lock collapsing concurrent universal-setup downloads
//!   into a single fetch.
//!
//! Lock entries are created on first use and kept for the process
//! lifetime; circuit names are operator-bounded, so the table stays
//! small.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{AcquireError, Mutex, OwnedSemaphorePermit, Semaphore};

use zkpipe_core::CircuitName;

/// Concurrency bounds shared by all pipeline operations.
pub struct CircuitGate {
    circuits: DashMap<String, Arc<Mutex<()>>>,
    tools: Arc<Semaphore>,
    setup_fetch: Arc<Mutex<()>>,
}

impl CircuitGate {
    /// Create a gate allowing at most `max_concurrent_tools` external
    /// processes at once. A bound of zero is clamped to one.
    pub fn new(max_concurrent_tools: usize) -> Self {
        Self {
            circuits: DashMap::new(),
            tools: Arc::new(Semaphore::new(max_concurrent_tools.max(1))),
            setup_fetch: Arc::new(Mutex::new(())),
        }
    }

    /// The mutex serializing artifact writes for one circuit name.
    pub fn circuit(&self, name: &CircuitName) -> Arc<Mutex<()>> {
        self.circuits
            .entry(name.as_str().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Acquire a permit to run one external tool process. Waits when the
    /// bound is reached; fails only if the gate is closed at shutdown.
    pub async fn tool_permit(&self) -> Result<OwnedSemaphorePermit, AcquireError> {
        self.tools.clone().acquire_owned().await
    }

    /// The lock serializing universal-setup downloads.
    pub fn setup_lock(&self) -> Arc<Mutex<()>> {
        self.setup_fetch.clone()
    }

    /// Currently available tool permits.
    pub fn available_tool_permits(&self) -> usize {
        self.tools.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn same_name_shares_one_lock() {
        let gate = CircuitGate::new(4);
        let name = CircuitName::new("m").unwrap();
        let other = CircuitName::new("other").unwrap();
        assert!(Arc::ptr_eq(&gate.circuit(&name), &gate.circuit(&name)));
        assert!(!Arc::ptr_eq(&gate.circuit(&name), &gate.circuit(&other)));
    }

    #[tokio::test]
    async fn tool_bound_limits_concurrency() {
        let gate = Arc::new(CircuitGate::new(1));
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..4 {
            let gate = gate.clone();
            let running = running.clone();
            let peak = peak.clone();
            tasks.push(tokio::spawn(async move {
                let _permit = gate.tool_permit().await.unwrap();
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(peak.load(Ordering::SeqCst), 1, "permit bound must hold");
        assert_eq!(gate.available_tool_permits(), 1);
    }

    #[tokio::test]
    async fn circuit_lock_serializes_critical_sections() {
        let gate = Arc::new(CircuitGate::new(8));
        let name = CircuitName::new("m").unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..4 {
            let lock = gate.circuit(&name);
            let counter = counter.clone();
            tasks.push(tokio::spawn(async move {
                let _guard = lock.lock().await;
                let seen = counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                // No other task entered while we held the lock.
                assert_eq!(counter.load(Ordering::SeqCst), seen + 1);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
    }
}
