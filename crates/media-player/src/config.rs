//! Player configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Launch description used when none is configured.
pub const DEFAULT_PIPELINE: &str = "playbin uri=https://www.freedesktop.org/software/gstreamer-sdk/data/media/sintel_trailer-480p.webm";

/// Tunables shared by every player created through the facade.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Launch description handed to the engine when a player enters `Ready`.
    pub pipeline: String,
    /// Log filter used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// Name given to each bus pump thread.
    pub pump_thread_name: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            pipeline: DEFAULT_PIPELINE.to_string(),
            log_filter: "error".to_string(),
            pump_thread_name: "media-player-bus".to_string(),
        }
    }
}

impl PlayerConfig {
    /// Load configuration from a TOML file on disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            std::fs::read_to_string(path).with_context(|| format!("read config {:?}", path))?;
        Self::from_toml_str(&raw).with_context(|| format!("parse config {:?}", path))
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let cfg = toml::from_str::<PlayerConfig>(raw).context("invalid player config")?;
        Ok(cfg)
    }
}
