//! Settings for rewriting commits, layered: command line or environment first, then the
//! repository's git config, then defaults.

use std::collections::HashMap;

use tracing::*;

use crate::message::{CleanupMode, UnknownCleanupMode, DEFAULT_COMMENT};
use crate::store::{GitCliStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Cleanup(#[from] UnknownCleanupMode),

    #[error("{key} = {value:?} is not a boolean")]
    InvalidBool { key: &'static str, value: String },

    #[error("could not read git config: {0}")]
    Store(#[from] StoreError),
}

/// Anything git config values can be read from.
pub trait ConfigSource {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
}

impl ConfigSource for GitCliStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.config_get(key)
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(HashMap::get(self, key).cloned())
    }
}

/// Values given explicitly, which beat anything in git config.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub cleanup: Option<String>,
    pub comment: Option<String>,
    pub sign: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `None` means git's `default`, which cleans up like [`CleanupMode::Space`].
    pub cleanup: Option<CleanupMode>,
    pub comment: String,
    pub sign: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cleanup: None,
            comment: DEFAULT_COMMENT.to_owned(),
            sign: false,
        }
    }
}

impl Config {
    pub fn resolve(overrides: &Overrides, source: &impl ConfigSource) -> Result<Self, ConfigError> {
        let cleanup = match &overrides.cleanup {
            Some(mode) => Some(mode.clone()),
            None => source.get("commit.cleanup")?,
        };
        let cleanup = match cleanup.as_deref() {
            None | Some("default") => None,
            Some(mode) => Some(mode.parse()?),
        };

        let comment = match &overrides.comment {
            Some(comment) => comment.clone(),
            None => match source.get("core.commentChar")? {
                Some(c) if !c.is_empty() && c != "auto" => c,
                _ => DEFAULT_COMMENT.to_owned(),
            },
        };

        let sign = match overrides.sign {
            Some(sign) => sign,
            None => match source.get("commit.gpgSign")? {
                Some(value) => parse_bool("commit.gpgSign", &value)?,
                None => false,
            },
        };

        let config = Self {
            cleanup,
            comment,
            sign,
        };
        debug!(?config, "Resolved configuration");
        Ok(config)
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" | "" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: value.to_owned(),
        }),
    }
}
