//! Capability contract with the external pipeline engine.
//!
//! The engine owns decoding, rendering and the bus implementation details. The player
//! only asks it to change state and to hand out the bus of the pipeline it builds.

use media_player_types::LifecycleState;

use crate::bus::EventBus;

/// States understood by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineState {
    Null,
    Ready,
    Paused,
    Playing,
}

impl EngineState {
    /// Engine-style upper-case name, used in logs.
    pub fn name(self) -> &'static str {
        match self {
            EngineState::Null => "NULL",
            EngineState::Ready => "READY",
            EngineState::Paused => "PAUSED",
            EngineState::Playing => "PLAYING",
        }
    }
}

impl From<LifecycleState> for EngineState {
    fn from(state: LifecycleState) -> Self {
        match state {
            LifecycleState::Idle => EngineState::Null,
            LifecycleState::Ready => EngineState::Ready,
            LifecycleState::Paused => EngineState::Paused,
            LifecycleState::Playing => EngineState::Playing,
        }
    }
}

/// Outcome of a `set_state` request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateChangeReturn {
    Success,
    /// The engine accepted the change but completes it asynchronously.
    Async,
    Failure,
}

impl StateChangeReturn {
    /// Collapse `Async` into `Success`.
    ///
    /// Whether the engine reached the state synchronously is not reported to callers.
    pub fn normalize(self) -> StateChangeReturn {
        match self {
            StateChangeReturn::Failure => StateChangeReturn::Failure,
            StateChangeReturn::Success | StateChangeReturn::Async => StateChangeReturn::Success,
        }
    }

    pub fn is_failure(self) -> bool {
        self == StateChangeReturn::Failure
    }
}

/// Token returned by [`PipelineHandle::connect_messages`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Factory for player pipelines.
pub trait PipelineEngine: Send + Sync {
    /// Create the player element. `None` when the engine cannot provide one.
    fn create_player(&self) -> Option<Box<dyn PipelineHandle>>;
}

/// The engine-side player element owned by a single controller.
///
/// Never touched by the bus pump; only the controller's thread calls into it.
pub trait PipelineHandle: Send {
    /// Attach to the element's message notifications.
    fn connect_messages(&mut self) -> Option<SubscriptionId>;

    /// Detach a subscription made by `connect_messages`.
    fn disconnect_messages(&mut self, id: SubscriptionId);

    /// Build the inner pipeline for `description` and return its bus.
    ///
    /// Called on every Idle -> Ready step; each call may return a fresh bus.
    fn build(&mut self, description: &str) -> Option<EventBus>;

    /// Request a state change of the inner pipeline.
    fn set_state(&mut self, target: EngineState) -> StateChangeReturn;

    /// Drop the inner pipeline built by `build`.
    fn release(&mut self);
}
