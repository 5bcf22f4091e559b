use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use onmark_logging::{onmark_info, onmark_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "onmark.ron";

/// Longest accepted timer setting: one day.
pub const MAX_TIMER_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Runtime settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Where the progress record and clipboard file live.
    pub data_dir: PathBuf,
    pub log_file: PathBuf,
    pub log_level: String,
    pub hide_after_ms: u64,
    pub stream_tick_ms: u64,
    pub upload_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".onmark"),
            log_file: PathBuf::from("./onmark.log"),
            log_level: "info".to_string(),
            hide_after_ms: 10_000,
            stream_tick_ms: 60,
            upload_delay_ms: 2_000,
        }
    }
}

impl EngineConfig {
    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                onmark_info!("No config at {:?}; using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses RON text. Out-of-range timer settings are replaced, with a
    /// warning, so every timer value fits a millisecond timestamp.
    pub fn parse(text: &str) -> Result<Self, ron::error::SpannedError> {
        let mut config: Self = ron::from_str(text)?;
        let defaults = Self::default();
        if config.stream_tick_ms == 0 {
            onmark_warn!("stream_tick_ms must be positive; using 1");
            config.stream_tick_ms = 1;
        }
        bound_timer("hide_after_ms", &mut config.hide_after_ms, defaults.hide_after_ms);
        bound_timer(
            "stream_tick_ms",
            &mut config.stream_tick_ms,
            defaults.stream_tick_ms,
        );
        bound_timer(
            "upload_delay_ms",
            &mut config.upload_delay_ms,
            defaults.upload_delay_ms,
        );
        Ok(config)
    }

    /// The auto-hide window as a signed millisecond span.
    pub fn hide_after_millis(&self) -> i64 {
        i64::try_from(self.hide_after_ms.min(MAX_TIMER_MS)).unwrap_or(i64::MAX)
    }
}

fn bound_timer(name: &str, value: &mut u64, default: u64) {
    if *value > MAX_TIMER_MS {
        onmark_warn!(
            "{} = {} exceeds {} ms; using {}",
            name,
            value,
            MAX_TIMER_MS,
            default
        );
        *value = default;
    }
}
