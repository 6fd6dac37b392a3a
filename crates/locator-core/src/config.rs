// crates/locator-core/src/config.rs
//! Engine tuning knobs, loadable from TOML.

use crate::error::{LocatorError, Result};
use crate::matcher::PARTNER_MARKER;
use crate::recents::DEFAULT_MAX_RECENTS;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 3_000;
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Runtime configuration for [`SearchEngine`](crate::SearchEngine).
///
/// Every field has a default, so a partial TOML document is valid:
///
/// ```
/// use locator_core::EngineConfig;
///
/// let cfg = EngineConfig::from_toml_str("debounce_ms = 500").unwrap();
/// assert_eq!(cfg.debounce_ms, 500);
/// assert_eq!(cfg.max_recents, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Quiet period before a typed query is committed to recents.
    pub debounce_ms: u64,
    pub max_recents: usize,
    /// Virtual tag that restricts server matches to partnered servers.
    pub partner_marker: String,
    /// Broadcast buffer per subscriber; slow subscribers skip ahead.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            max_recents: DEFAULT_MAX_RECENTS,
            partner_marker: PARTNER_MARKER.to_owned(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl EngineConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debounce_ms = delay.as_millis() as u64;
        self
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let cfg: EngineConfig = toml::from_str(raw)?;
        cfg.validate()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            LocatorError::NotFound(format!("config not found at {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    fn validate(self) -> Result<Self> {
        if self.max_recents == 0 {
            return Err(LocatorError::InvalidData("max_recents must be at least 1".into()));
        }
        if self.event_capacity == 0 {
            return Err(LocatorError::InvalidData("event_capacity must be at least 1".into()));
        }
        if self.partner_marker.trim().is_empty() {
            return Err(LocatorError::InvalidData("partner_marker must not be blank".into()));
        }
        Ok(self)
    }
}
