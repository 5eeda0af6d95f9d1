//! API key gate for client applications
//!
//! The active-toggles read path is consumed by client applications that carry no
//! operator identity. They present a shared key in the `x-api-key` header,
//! which must match one of the configured keys.
//!
//! Enforcement can be switched off as an emergency kill-switch. The settings
//! live behind an `ArcSwap` so they can be replaced at runtime (see
//! [`ApiKeyGate::reload`]) and the next request sees the new values.
//!
//! # Example Usage
//!
//! ```rust,ignore
//! let gate = ApiKeyGate::new(ApiKeySettings::new(vec!["secret".into()], true));
//! gate.check(req.headers().get(API_KEY_HEADER).and_then(|v| v.to_str().ok()))?;
//! ```

use crate::app_config::ApiKeyConfig;
use arc_swap::ArcSwap;
use derive_more::Display;
use std::sync::Arc;

/// Header carrying the client application's key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Keys are stored as digests so comparisons take the same time however much
/// of a wrong key matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKeySettings {
    key_hashes: Vec<blake3::Hash>,
    enforcement_enabled: bool,
}

impl ApiKeySettings {
    pub fn new(keys: Vec<String>, enforcement_enabled: bool) -> Self {
        Self {
            key_hashes: keys
                .iter()
                .filter(|k| !k.is_empty())
                .map(|k| blake3::hash(k.as_bytes()))
                .collect(),
            enforcement_enabled,
        }
    }

    pub fn from_config(config: &ApiKeyConfig) -> Self {
        Self::new(config.keys.clone(), config.enforcement_enabled)
    }

    pub fn enforcement_enabled(&self) -> bool {
        self.enforcement_enabled
    }

    pub fn key_count(&self) -> usize {
        self.key_hashes.len()
    }

    fn accepts(&self, candidate: &str) -> bool {
        let candidate = blake3::hash(candidate.as_bytes());
        // blake3::Hash equality is constant time.
        self.key_hashes.iter().any(|h| *h == candidate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ApiKeyError {
    #[display(fmt = "API key missing")]
    Missing,
    #[display(fmt = "API key invalid")]
    Invalid,
}

impl std::error::Error for ApiKeyError {}

/// Shared, hot-swappable API key gate
pub struct ApiKeyGate {
    settings: ArcSwap<ApiKeySettings>,
}

impl ApiKeyGate {
    pub fn new(settings: ApiKeySettings) -> Self {
        Self {
            settings: ArcSwap::from_pointee(settings),
        }
    }

    pub fn from_config(config: &ApiKeyConfig) -> Self {
        Self::new(ApiKeySettings::from_config(config))
    }

    /// Check the credential presented with a request.
    pub fn check(&self, presented: Option<&str>) -> Result<(), ApiKeyError> {
        let settings = self.settings.load();

        if !settings.enforcement_enabled {
            log::debug!("API key enforcement disabled, allowing request");
            return Ok(());
        }

        match presented {
            None => {
                log::warn!("Rejected active toggle read without API key");
                Err(ApiKeyError::Missing)
            }
            Some(key) if settings.accepts(key) => Ok(()),
            Some(_) => {
                log::warn!("Rejected active toggle read with unknown API key");
                Err(ApiKeyError::Invalid)
            }
        }
    }

    /// Current settings snapshot
    pub fn settings(&self) -> Arc<ApiKeySettings> {
        self.settings.load_full()
    }

    /// Replace keys and enforcement flag in one step.
    pub fn replace(&self, settings: ApiKeySettings) {
        let previous = self.settings.swap(Arc::new(settings));
        self.log_change(&previous);
    }

    /// Apply freshly loaded configuration. Returns false when nothing changed.
    pub fn reload(&self, config: &ApiKeyConfig) -> bool {
        let settings = ApiKeySettings::from_config(config);
        if *self.settings.load_full() == settings {
            return false;
        }
        self.replace(settings);
        true
    }

    /// Flip the kill-switch, keeping the configured keys.
    pub fn set_enforcement(&self, enabled: bool) {
        let previous = self.settings.rcu(|current| ApiKeySettings {
            key_hashes: current.key_hashes.clone(),
            enforcement_enabled: enabled,
        });
        self.log_change(&previous);
    }

    fn log_change(&self, previous: &ApiKeySettings) {
        let current = self.settings.load();
        if previous.enforcement_enabled != current.enforcement_enabled {
            log::warn!(
                "API key enforcement {}",
                if current.enforcement_enabled {
                    "enabled"
                } else {
                    "DISABLED"
                }
            );
        }
        log::info!("API key gate reloaded with {} key(s)", current.key_count());
    }
}
