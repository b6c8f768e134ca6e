//! # Tracker of running tasks.
//!
//! The runtime's task wrapper marks a task alive before its first poll and dead when
//! it returns. On a grace timeout the runtime reports whatever is still alive as stuck.
//!
//! ```text
//! run_task() ── enter(name) ──► RwLock<HashMap<name, count>> ◄── snapshot() ── grace timeout
//!            └─ leave(name) ──┘
//! ```

use std::collections::HashMap;

use tokio::sync::RwLock;

/// Thread-safe multiset of running task names.
#[derive(Debug, Default)]
pub(crate) struct AliveTracker {
    state: RwLock<HashMap<String, usize>>,
}

impl AliveTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn enter(&self, name: &str) {
        *self.state.write().await.entry(name.to_string()).or_insert(0) += 1;
    }

    pub(crate) async fn leave(&self, name: &str) {
        let mut state = self.state.write().await;
        if let Some(count) = state.get_mut(name) {
            *count -= 1;
            if *count == 0 {
                state.remove(name);
            }
        }
    }

    /// Sorted names of running tasks.
    pub(crate) async fn snapshot(&self) -> Vec<String> {
        let mut alive: Vec<String> = self.state.read().await.keys().cloned().collect();
        alive.sort_unstable();
        alive
    }
}
