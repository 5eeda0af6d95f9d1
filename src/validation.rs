//! Toggle identity validation
//!
//! A toggle key is the stable name client applications switch on, so it is kept
//! to lowercase letters and underscores and must end in a letter. Names are free
//! text but may not be blank.

use derive_more::Display;
use once_cell::sync::Lazy;
use regex::Regex;

/// Pattern every toggle key must fully match.
pub const TOGGLE_KEY_PATTERN: &str = "^[a-z_]*[a-z]$";

static TOGGLE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(TOGGLE_KEY_PATTERN).expect("toggle key pattern is valid"));

/// Rejected toggle identity.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ToggleError {
    #[display(fmt = "Feature key '{}' is invalid", _0)]
    InvalidKey(String),
    #[display(fmt = "Feature name must not be blank")]
    InvalidName,
}

impl std::error::Error for ToggleError {}

/// Check a key and name pair. The key is checked first.
pub fn check_toggle_identity(key: &str, name: &str) -> Result<(), ToggleError> {
    check_key(key)?;
    check_name(name)
}

pub fn check_key(key: &str) -> Result<(), ToggleError> {
    if TOGGLE_KEY.is_match(key) {
        Ok(())
    } else {
        Err(ToggleError::InvalidKey(key.to_owned()))
    }
}

pub fn check_name(name: &str) -> Result<(), ToggleError> {
    if name.trim().is_empty() {
        Err(ToggleError::InvalidName)
    } else {
        Ok(())
    }
}
