//! Runtime configuration for the stack and its sockets.

use serde::{Deserialize, Serialize};

use crate::network::error::Error;

/// Idle-poll interval registered on every connection, in transport poll ticks.
pub const DEFAULT_IDLE_POLL_TICKS: u8 = 20;

/// Minimum spacing of the diagnostic report, in milliseconds.
pub const DEFAULT_REPORT_INTERVAL_MS: u32 = 2000;

/// Stack-wide settings.
///
/// Missing fields take their defaults when loaded from JSON, so a device can
/// ship a partial blob in flash:
///
/// ```rust
/// use nbhttp::network::config::Config;
///
/// let config = Config::from_json(r#"{"idle_poll_ticks": 8}"#).unwrap();
/// assert_eq!(config.idle_poll_ticks, 8);
/// assert_eq!(config.report_interval_ms, 2000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Poll intervals a connection may sit idle before it is force-closed.
    pub idle_poll_ticks: u8,
    /// Minimum spacing of the periodic diagnostic report. `0` disables it.
    pub report_interval_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            idle_poll_ticks: DEFAULT_IDLE_POLL_TICKS,
            report_interval_ms: DEFAULT_REPORT_INTERVAL_MS,
        }
    }
}

impl Config {
    /// Parse a configuration from a JSON object.
    ///
    /// An idle-poll interval of zero is rejected, as it would never time out.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let (config, _): (Config, usize) =
            serde_json_core::from_str(json).map_err(|_| Error::InvalidConfig)?;
        if config.idle_poll_ticks == 0 {
            return Err(Error::InvalidConfig);
        }
        Ok(config)
    }

    /// Serialize into `buf`, returning the number of bytes written.
    pub fn to_json(&self, buf: &mut [u8]) -> Result<usize, Error> {
        serde_json_core::to_slice(self, buf).map_err(|_| Error::InvalidConfig)
    }
}
