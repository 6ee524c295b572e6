//! Player lifecycle state machine.
//!
//! The controller walks `Idle -> Ready -> Paused -> Playing` one step at a time and is
//! the only code that asks the engine for state changes. Entering `Ready` builds the
//! inner pipeline and spawns a bus pump; leaving `Ready` for `Idle` posts the shutdown
//! sentinel before the engine is taken to `NULL`.
//!
//! A failed step leaves the recorded state at the last confirmed state. Teardown
//! (`stop`, `destroy`, drop) ignores failures and always reaches `Idle`.

use std::sync::Arc;

use media_player_types::{LifecycleState, PlayerStatus};

use crate::bus::{Event, EventBus, EventSource};
use crate::config::PlayerConfig;
use crate::engine::{EngineState, PipelineEngine, PipelineHandle, StateChangeReturn, SubscriptionId};
use crate::error::{Error, Result};
use crate::pump::{self, MessageCallback, PumpHandle};
use crate::status::PlayerStatusState;

/// Owns one engine player element and drives its lifecycle.
pub struct PlayerController {
    pipeline: Box<dyn PipelineHandle>,
    subscription: Option<SubscriptionId>,
    bus: Option<EventBus>,
    pump: Option<PumpHandle>,
    callback: MessageCallback,
    state: LifecycleState,
    config: PlayerConfig,
    status: Arc<PlayerStatusState>,
}

impl std::fmt::Debug for PlayerController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerController")
            .field("state", &self.state)
            .field("subscription", &self.subscription)
            .field("pump", &self.pump)
            .finish_non_exhaustive()
    }
}

impl PlayerController {
    /// Create a controller in `Idle`. No thread is started yet.
    ///
    /// Nothing obtained from the engine outlives a failed call.
    pub fn create(
        engine: &dyn PipelineEngine,
        config: PlayerConfig,
        callback: MessageCallback,
    ) -> Result<Self> {
        let Some(mut pipeline) = engine.create_player() else {
            tracing::error!("failed to create media player element");
            return Err(Error::EngineUnavailable(
                "engine did not provide a player element".to_string(),
            ));
        };
        let Some(subscription) = pipeline.connect_messages() else {
            tracing::error!("failed to connect media player messages");
            return Err(Error::SignalWiringFailed);
        };

        Ok(Self {
            pipeline,
            subscription: Some(subscription),
            bus: None,
            pump: None,
            callback,
            state: LifecycleState::Idle,
            config,
            status: PlayerStatusState::shared(),
        })
    }

    /// Last confirmed lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Bus of the current inner pipeline, present in every state but `Idle`.
    pub fn bus(&self) -> Option<&EventBus> {
        self.bus.as_ref()
    }

    pub fn status(&self) -> PlayerStatus {
        let pump_running = self.pump.as_ref().is_some_and(PumpHandle::is_running);
        self.status.snapshot(self.state, pump_running)
    }

    /// Drive forward to `Playing`. No-op when already playing.
    pub fn play(&mut self) -> Result<()> {
        self.transition_to(LifecycleState::Playing)
    }

    /// Drive to `Paused` from any state. No-op when already paused.
    pub fn pause(&mut self) -> Result<()> {
        self.transition_to(LifecycleState::Paused)
    }

    /// Tear down to `Idle` but keep the controller usable.
    pub fn stop(&mut self) {
        self.teardown();
    }

    /// Tear down and release the engine element. Never fails.
    pub fn destroy(mut self) {
        self.shutdown();
    }

    /// Walk one step at a time toward `target`, stopping at the first failure.
    pub fn transition_to(&mut self, target: LifecycleState) -> Result<()> {
        if target == LifecycleState::Idle {
            self.teardown();
            return Ok(());
        }
        while let Some(next) = self.state.step_toward(target) {
            self.step(next)?;
        }
        Ok(())
    }

    fn step(&mut self, next: LifecycleState) -> Result<()> {
        let from = self.state;
        let ret = match (from, next) {
            (LifecycleState::Idle, LifecycleState::Ready) => self.enter_ready(),
            _ => self.pipeline.set_state(next.into()).normalize(),
        };

        if ret.is_failure() {
            tracing::warn!(from = ?from, to = ?next, "state change rejected");
            return Err(Error::StateChangeRejected { from, to: next });
        }

        self.state = next;
        debug_assert_eq!(self.pump.is_some(), self.state.is_active());
        self.post_state_changed(from, next);
        tracing::debug!(from = ?from, to = ?next, "state change confirmed");
        Ok(())
    }

    /// Idle -> Ready: build the inner pipeline, start its pump, then ask for READY.
    fn enter_ready(&mut self) -> StateChangeReturn {
        let Some(bus) = self.pipeline.build(&self.config.pipeline) else {
            tracing::warn!(pipeline = %self.config.pipeline, "failed to build pipeline");
            return StateChangeReturn::Failure;
        };

        let pump = match pump::spawn_pump(
            bus.clone(),
            self.callback.clone(),
            self.status.clone(),
            &self.config.pump_thread_name,
        ) {
            Ok(pump) => pump,
            Err(e) => {
                tracing::warn!("failed to spawn bus pump: {e}");
                self.pipeline.release();
                return StateChangeReturn::Failure;
            }
        };

        let ret = self.pipeline.set_state(EngineState::Ready).normalize();
        if ret.is_failure() {
            pump.shutdown();
            if self.pipeline.set_state(EngineState::Null).normalize().is_failure() {
                tracing::warn!("engine rejected NULL after failed READY; releasing anyway");
            }
            self.pipeline.release();
            return ret;
        }

        self.bus = Some(bus);
        self.pump = Some(pump);
        ret
    }

    /// Ready -> Idle. The sentinel goes out before the engine is asked for NULL.
    fn leave_ready(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.shutdown();
        }
        let ret = self.pipeline.set_state(EngineState::Null).normalize();
        if ret.is_failure() {
            tracing::warn!("engine rejected NULL during teardown; continuing");
        }
        self.pipeline.release();
        self.bus = None;
        self.state = LifecycleState::Idle;
    }

    fn teardown(&mut self) {
        while let Some(next) = self.state.step_toward(LifecycleState::Idle) {
            if next == LifecycleState::Idle {
                self.leave_ready();
                break;
            }
            let from = self.state;
            let ret = self.pipeline.set_state(next.into()).normalize();
            if ret.is_failure() {
                tracing::warn!(from = ?from, to = ?next, "state change failed during teardown; continuing");
            }
            self.state = next;
            self.post_state_changed(from, next);
        }
    }

    fn shutdown(&mut self) {
        self.teardown();
        if let Some(id) = self.subscription.take() {
            self.pipeline.disconnect_messages(id);
            tracing::debug!("media player destroyed");
        }
    }

    fn post_state_changed(&self, old: LifecycleState, new: LifecycleState) {
        if let Some(bus) = &self.bus {
            bus.post(Event::StateChanged {
                source: EventSource::Player,
                old: old.into(),
                new: new.into(),
            });
        }
    }
}

impl Drop for PlayerController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
