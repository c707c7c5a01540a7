//! Client settings, loaded from the environment

use super::constants;
use crate::error::{OteError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Settings shared by every strategy a client creates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Application route prefix
    pub prefix: String,
    /// Connect and read timeouts in seconds
    pub timeout: (f64, f64),
    /// Append raw backend responses to error messages
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prefix: constants::DEFAULT_PREFIX.to_string(),
            timeout: (
                constants::DEFAULT_CONNECT_TIMEOUT,
                constants::DEFAULT_READ_TIMEOUT,
            ),
            debug: false,
        }
    }
}

impl Settings {
    /// Load settings from `OTEAPI_PREFIX`, `OTEAPI_TIMEOUT` and `OTELIB_DEBUG`
    pub fn from_env() -> Result<Self> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Load settings from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(prefix) = vars.get(constants::ENV_PREFIX) {
            settings.prefix = prefix.clone();
        }

        if let Some(timeout) = vars.get(constants::ENV_TIMEOUT) {
            settings.timeout = parse_timeout(timeout)?;
        }

        settings.debug = vars
            .get(constants::ENV_DEBUG)
            .is_some_and(|value| !value.is_empty());

        Ok(settings)
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn connect_timeout(&self) -> Result<Duration> {
        to_duration("connect", self.timeout.0)
    }

    pub fn read_timeout(&self) -> Result<Duration> {
        to_duration("read", self.timeout.1)
    }
}

/// Upper bound for either timeout, in seconds
const MAX_TIMEOUT: f64 = u32::MAX as f64;

fn valid_timeout(seconds: f64) -> bool {
    seconds.is_finite() && seconds > 0.0 && seconds <= MAX_TIMEOUT
}

fn to_duration(which: &str, seconds: f64) -> Result<Duration> {
    if !valid_timeout(seconds) {
        return Err(OteError::config(format!(
            "{which} timeout must be a positive number of seconds up to {MAX_TIMEOUT}, got {seconds}"
        )));
    }
    Duration::try_from_secs_f64(seconds)
        .map_err(|e| OteError::config(format!("invalid {which} timeout {seconds}: {e}")))
}

fn parse_timeout(raw: &str) -> Result<(f64, f64)> {
    let invalid = || {
        OteError::config(format!(
            "{} must be two comma-separated seconds, got {raw:?}",
            constants::ENV_TIMEOUT
        ))
    };

    let trimmed = raw.trim().trim_start_matches(['(', '[']).trim_end_matches([')', ']']);
    let mut parts = trimmed.split(',').map(str::trim);

    let connect = parts.next().and_then(|p| p.parse::<f64>().ok());
    let read = parts.next().and_then(|p| p.parse::<f64>().ok());

    match (connect, read, parts.next()) {
        (Some(connect), Some(read), None) if valid_timeout(connect) && valid_timeout(read) => {
            Ok((connect, read))
        }
        _ => Err(invalid()),
    }
}

/// Client-level configuration
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub settings: Settings,
    /// Extra HTTP headers sent with every request to the OTE service
    pub headers: HashMap<String, String>,
}

impl ClientConfig {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            headers: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}
