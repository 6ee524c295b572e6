//! Error types for player construction and lifecycle transitions.

use media_player_types::LifecycleState;
use thiserror::Error;

/// Result alias used by the controller and facade.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced to callers. Teardown never produces one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The engine could not produce a player pipeline.
    #[error("pipeline engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Attaching to the engine's message notifications failed.
    #[error("failed to connect to pipeline message notifications")]
    SignalWiringFailed,

    /// The engine reported failure for a requested transition.
    #[error("state change {from:?} -> {to:?} rejected by engine")]
    StateChangeRejected {
        from: LifecycleState,
        to: LifecycleState,
    },

    /// A player was requested before `init()`.
    #[error("media player library is not initialized")]
    NotInitialized,
}
