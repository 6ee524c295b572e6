//! Bus pump: the background thread that drains a player's bus.
//!
//! The pump blocks on the bus without a timeout and acts on three event kinds:
//! - end-of-stream is forwarded to the application callback on the pump thread
//! - state changes of the player element are logged
//! - the shutdown sentinel ends the loop and drops the pump's bus handle
//!
//! The pump is never joined. The controller stops it by posting the sentinel through
//! the same bus, so the sentinel is read only after everything posted before it.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use media_player_types::PlayerMessage;

use crate::bus::{Event, EventBus, EventSource};
use crate::status::PlayerStatusState;

/// Application callback. Receives only the message, never controller state.
pub type MessageCallback = Arc<dyn Fn(PlayerMessage) + Send + Sync>;

/// Controller-side handle to a detached pump.
#[derive(Debug)]
pub struct PumpHandle {
    bus: EventBus,
    running: Arc<AtomicBool>,
}

impl PumpHandle {
    /// `true` until the pump has read its sentinel.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Shared flag cleared by the pump on exit.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Post the shutdown sentinel and let the pump finish on its own.
    ///
    /// The handle keeps its own end of the bus, so the post always lands.
    pub fn shutdown(self) {
        self.bus.post(Event::ShutdownSentinel);
    }
}

/// Clears the running flag when the pump thread ends, however it ends.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Totals for one pump run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PumpReport {
    pub events_consumed: u64,
    pub end_of_stream: u64,
}

/// Spawn a detached pump thread draining `bus`.
pub fn spawn_pump(
    bus: EventBus,
    callback: MessageCallback,
    status: Arc<PlayerStatusState>,
    thread_name: &str,
) -> std::io::Result<PumpHandle> {
    let running = Arc::new(AtomicBool::new(true));
    let running_for_thread = running.clone();
    let bus_for_thread = bus.clone();
    let status_for_thread = status.clone();

    // The JoinHandle is dropped on purpose: teardown must not wait on the pump.
    let _detached = thread::Builder::new()
        .name(thread_name.to_string())
        .spawn(move || {
            let _running = RunningGuard(running_for_thread);
            let report = run_pump(bus_for_thread, &callback, &status_for_thread);
            tracing::debug!(
                events = report.events_consumed,
                eos = report.end_of_stream,
                "bus pump finished"
            );
        })?;

    status.record_pump_spawned();
    Ok(PumpHandle { bus, running })
}

/// Drain `bus` until the shutdown sentinel arrives.
///
/// Takes the bus by value so the handle is released when the loop ends. A panicking
/// callback is logged and the loop keeps reading, so the sentinel is still seen.
pub fn run_pump(
    bus: EventBus,
    callback: &MessageCallback,
    status: &PlayerStatusState,
) -> PumpReport {
    let mut report = PumpReport::default();

    while let Some(event) = bus.pop(None) {
        report.events_consumed += 1;
        match event {
            Event::ShutdownSentinel => {
                tracing::info!("exiting bus pump");
                break;
            }
            Event::EndOfStream => {
                report.end_of_stream += 1;
                status.record_end_of_stream();
                let delivered =
                    panic::catch_unwind(AssertUnwindSafe(|| callback(PlayerMessage::EndOfStream)));
                if delivered.is_err() {
                    tracing::error!("message callback panicked on end-of-stream");
                }
            }
            Event::StateChanged {
                source: EventSource::Player,
                old,
                new,
            } => {
                tracing::info!(old = old.name(), new = new.name(), "[MediaPlayer] {}", new.name());
            }
            other => {
                tracing::debug!(kind = other.kind(), "ignored bus event");
            }
        }
    }

    drop(bus);
    report
}
