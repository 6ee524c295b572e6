//! Counters shared between a controller and its bus pumps.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use media_player_types::{LifecycleState, PlayerStatus};

/// Lifetime counters for one controller, updated from both threads.
#[derive(Debug, Default)]
pub struct PlayerStatusState {
    pumps_spawned: AtomicU64,
    end_of_stream: AtomicU64,
}

impl PlayerStatusState {
    /// Create a shared counter block.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn record_pump_spawned(&self) {
        self.pumps_spawned.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_end_of_stream(&self) {
        self.end_of_stream.fetch_add(1, Ordering::Relaxed);
    }

    pub fn pumps_spawned(&self) -> u64 {
        self.pumps_spawned.load(Ordering::Relaxed)
    }

    pub fn end_of_stream_count(&self) -> u64 {
        self.end_of_stream.load(Ordering::Relaxed)
    }

    /// Combine the counters with the controller-owned fields.
    pub fn snapshot(&self, state: LifecycleState, pump_running: bool) -> PlayerStatus {
        PlayerStatus {
            state,
            pump_running,
            pumps_spawned: self.pumps_spawned(),
            end_of_stream_count: self.end_of_stream_count(),
        }
    }
}
