use serde::{Deserialize, Serialize};

/// Message kinds delivered to the application callback.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlayerMessage {
    /// The pipeline reached the end of its stream.
    EndOfStream,
}

/// Lifecycle of a player, ordered from least to most active.
///
/// `Idle` means no inner pipeline exists; every other state owns a pipeline, a bus
/// and exactly one running bus pump.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    #[default]
    Idle,
    Ready,
    Paused,
    Playing,
}

impl LifecycleState {
    /// Next state one step closer to `target`, or `None` when already there.
    pub fn step_toward(self, target: LifecycleState) -> Option<LifecycleState> {
        use LifecycleState::*;
        if self == target {
            return None;
        }
        let up = target > self;
        Some(match (self, up) {
            (Idle, _) => Ready,
            (Ready, true) => Paused,
            (Ready, false) => Idle,
            (Paused, true) => Playing,
            (Paused, false) => Ready,
            (Playing, _) => Paused,
        })
    }

    /// Whether this state keeps a pipeline (and its bus pump) alive.
    pub fn is_active(self) -> bool {
        self != LifecycleState::Idle
    }
}

/// Point-in-time view of a player, suitable for logging or returning from an API.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerStatus {
    /// Last confirmed lifecycle state.
    pub state: LifecycleState,
    /// `true` while the current bus pump has not yet seen its shutdown sentinel.
    pub pump_running: bool,
    /// Number of bus pumps spawned over the player's lifetime.
    pub pumps_spawned: u64,
    /// Number of end-of-stream messages forwarded to the callback.
    pub end_of_stream_count: u64,
}
