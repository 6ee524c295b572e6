//! Lifecycle controller for an engine-owned media pipeline.
//!
//! A [`controller::PlayerController`] steps the engine through
//! `Idle -> Ready -> Paused -> Playing` while a detached bus pump forwards
//! end-of-stream to the application callback. [`api`] wraps it in process-wide
//! `init`/`uninit` and a [`api::MediaPlayer`] handle.

pub mod api;
pub mod bus;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod pump;
pub mod status;

#[cfg(test)]
mod testing;

pub use api::{MediaPlayer, active_log_filter, init, is_initialized, uninit};
pub use error::{Error, Result};
pub use media_player_types::{LifecycleState, PlayerMessage, PlayerStatus};
