//! Process-wide entry points.
//!
//! `init` records the engine and config every player will use and applies the log
//! filter; `uninit` turns logging off again. `MediaPlayer` is the thin handle
//! applications hold.

use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use media_player_types::{LifecycleState, PlayerMessage, PlayerStatus};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

use crate::config::PlayerConfig;
use crate::controller::PlayerController;
use crate::engine::PipelineEngine;
use crate::error::{Error, Result};

struct Library {
    engine: Arc<dyn PipelineEngine>,
    config: PlayerConfig,
}

static LIBRARY: Mutex<Option<Library>> = Mutex::new(None);

fn library() -> std::sync::MutexGuard<'static, Option<Library>> {
    LIBRARY.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Initialize the library. Later calls are no-ops until `uninit`.
pub fn init(engine: Arc<dyn PipelineEngine>, config: PlayerConfig) {
    let mut lib = library();
    if lib.is_some() {
        return;
    }
    init_logging(&config.log_filter);
    tracing::debug!(pipeline = %config.pipeline, "media player library initialized");
    *lib = Some(Library { engine, config });
}

/// Forget the engine and config registered by `init`.
///
/// Only meant for leak hunting; no player may be alive when this is called.
pub fn uninit() {
    let mut lib = library();
    if lib.take().is_some() {
        tracing::debug!("media player library uninitialized");
        set_log_filter(EnvFilter::new("off"));
    }
}

pub fn is_initialized() -> bool {
    library().is_some()
}

/// Config registered by `init`, if any.
pub fn current_config() -> Option<PlayerConfig> {
    library().as_ref().map(|lib| lib.config.clone())
}

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Reload handle of the subscriber installed by the first `init`.
///
/// `None` when the application had already installed its own subscriber.
fn log_filter_handle() -> &'static Option<FilterHandle> {
    static HANDLE: OnceLock<Option<FilterHandle>> = OnceLock::new();
    HANDLE.get_or_init(|| {
        let (filter, handle) = reload::Layer::new(EnvFilter::new("off"));
        match tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init()
        {
            Ok(()) => Some(handle),
            Err(_) => None,
        }
    })
}

/// Apply the filter for a new `init`. `RUST_LOG` wins over `default_filter`.
fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    if log_filter_handle().is_none() {
        tracing::debug!("log subscriber already installed; keeping it");
    }
    set_log_filter(filter);
}

fn set_log_filter(filter: EnvFilter) {
    if let Some(handle) = log_filter_handle() {
        if let Err(e) = handle.reload(filter) {
            tracing::warn!("failed to reload log filter: {e}");
        }
    }
}

/// Filter currently applied by the library's subscriber, if it installed one.
pub fn active_log_filter() -> Option<String> {
    log_filter_handle()
        .as_ref()
        .and_then(|handle| handle.with_current(|filter| filter.to_string()).ok())
}

/// Application handle to one player.
#[derive(Debug)]
pub struct MediaPlayer {
    controller: PlayerController,
}

impl MediaPlayer {
    /// Create an idle player whose messages go to `callback`.
    ///
    /// The callback runs on the player's bus thread.
    pub fn new<F>(callback: F) -> Result<Self>
    where
        F: Fn(PlayerMessage) + Send + Sync + 'static,
    {
        let (engine, config) = {
            let lib = library();
            let Some(lib) = lib.as_ref() else {
                return Err(Error::NotInitialized);
            };
            (lib.engine.clone(), lib.config.clone())
        };
        let controller = PlayerController::create(engine.as_ref(), config, Arc::new(callback))?;
        Ok(Self { controller })
    }

    pub fn play(&mut self) -> Result<()> {
        self.controller.play()
    }

    pub fn pause(&mut self) -> Result<()> {
        self.controller.pause()
    }

    /// Return to idle, keeping the player for later use.
    pub fn stop(&mut self) {
        self.controller.stop();
    }

    pub fn state(&self) -> LifecycleState {
        self.controller.state()
    }

    pub fn status(&self) -> PlayerStatus {
        self.controller.status()
    }

    /// Tear the player down. Failures along the way are logged and ignored.
    pub fn destroy(self) {
        self.controller.destroy();
    }
}

#[cfg(test)]
pub(crate) fn test_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Event;
    use crate::engine::{EngineState, StateChangeReturn};
    use crate::testing::ScriptedEngine;
    use std::sync::mpsc;
    use std::time::Duration;

    fn init_with(engine: &ScriptedEngine, config: PlayerConfig) {
        uninit();
        init(Arc::new(engine.clone()), config);
    }

    #[test]
    fn new_before_init_is_rejected() {
        let _guard = test_lock();
        uninit();
        assert!(!is_initialized());
        let err = MediaPlayer::new(|_| {}).unwrap_err();
        assert_eq!(err, Error::NotInitialized);
    }

    #[test]
    fn init_is_idempotent_and_keeps_first_config() {
        let _guard = test_lock();
        let engine = ScriptedEngine::new();
        let first = PlayerConfig {
            pipeline: "playbin uri=file:///first.ogg".to_string(),
            ..PlayerConfig::default()
        };
        init_with(&engine, first.clone());
        init(
            Arc::new(ScriptedEngine::new()),
            PlayerConfig {
                pipeline: "playbin uri=file:///second.ogg".to_string(),
                ..PlayerConfig::default()
            },
        );

        assert!(is_initialized());
        assert_eq!(current_config(), Some(first));

        let mut player = MediaPlayer::new(|_| {}).unwrap();
        player.play().unwrap();
        engine.with(|s| assert_eq!(s.descriptions, vec!["playbin uri=file:///first.ogg"]));
        player.destroy();
        uninit();
    }

    #[test]
    fn log_filter_follows_init_and_uninit() {
        let _guard = test_lock();
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let engine = ScriptedEngine::new();
        init_with(
            &engine,
            PlayerConfig {
                log_filter: "warn".to_string(),
                ..PlayerConfig::default()
            },
        );
        let Some(first) = active_log_filter() else {
            uninit();
            return;
        };
        assert_eq!(first, "warn");

        uninit();
        assert_eq!(active_log_filter().as_deref(), Some("off"));

        init(
            Arc::new(engine.clone()),
            PlayerConfig {
                log_filter: "debug".to_string(),
                ..PlayerConfig::default()
            },
        );
        assert_eq!(active_log_filter().as_deref(), Some("debug"));
        uninit();
    }

    #[test]
    fn uninit_then_new_fails_and_reinit_works() {
        let _guard = test_lock();
        let engine = ScriptedEngine::new();
        init_with(&engine, PlayerConfig::default());
        uninit();
        uninit();
        assert_eq!(MediaPlayer::new(|_| {}).unwrap_err(), Error::NotInitialized);

        init(Arc::new(engine.clone()), PlayerConfig::default());
        assert!(MediaPlayer::new(|_| {}).is_ok());
        uninit();
    }

    #[test]
    fn facade_play_pause_eos_destroy() {
        let _guard = test_lock();
        let engine = ScriptedEngine::new();
        init_with(&engine, PlayerConfig::default());

        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        let mut player = MediaPlayer::new(move |msg| {
            let _ = tx.lock().unwrap().send(msg);
        })
        .unwrap();
        assert_eq!(player.state(), LifecycleState::Idle);

        player.play().unwrap();
        assert_eq!(player.state(), LifecycleState::Playing);
        player.pause().unwrap();
        assert_eq!(player.state(), LifecycleState::Paused);
        player.play().unwrap();

        engine.last_bus().post(Event::EndOfStream);
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(2)).unwrap(),
            PlayerMessage::EndOfStream
        );

        player.destroy();
        engine.with(|s| assert_eq!(s.requested.last(), Some(&EngineState::Null)));
        uninit();
    }

    #[test]
    fn facade_surfaces_rejected_play() {
        let _guard = test_lock();
        let engine = ScriptedEngine::new();
        engine.with(|s| s.push_result(EngineState::Playing, StateChangeReturn::Failure));
        init_with(&engine, PlayerConfig::default());

        let mut player = MediaPlayer::new(|_| {}).unwrap();
        assert!(matches!(player.play(), Err(Error::StateChangeRejected { .. })));
        assert_eq!(player.state(), LifecycleState::Paused);
        assert!(player.status().pump_running);

        player.stop();
        assert_eq!(player.state(), LifecycleState::Idle);
        player.destroy();
        uninit();
    }

    #[test]
    fn facade_create_failure_leaves_no_player() {
        let _guard = test_lock();
        let engine = ScriptedEngine::new();
        engine.with(|s| s.fail_create = true);
        init_with(&engine, PlayerConfig::default());

        assert!(matches!(
            MediaPlayer::new(|_| {}),
            Err(Error::EngineUnavailable(_))
        ));
        uninit();
    }
}
