//! Runtime configuration
//!
//! Every setting has a default and can be overridden with an `EVBRIDGE_*`
//! environment variable.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::backend::platform::WindowSpec;
use crate::protocol::REGION_MIN_SIZE;

const PAGE_SIZE: usize = 4096;

/// Bridge configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub title: String,
    pub width: i32,
    pub height: i32,
    /// Negative means OS default
    pub x: i32,
    /// Negative means OS default
    pub y: i32,
    pub region_path: PathBuf,
    pub region_size: usize,
    /// Consecutive missed polls before a controller slot reads disconnected
    pub controller_grace: u32,
    pub poll_interval: Duration,
}

impl BridgeConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            title: lookup("EVBRIDGE_TITLE").unwrap_or(defaults.title),
            width: parse(&lookup, "EVBRIDGE_WIDTH", defaults.width)?,
            height: parse(&lookup, "EVBRIDGE_HEIGHT", defaults.height)?,
            x: parse(&lookup, "EVBRIDGE_X", defaults.x)?,
            y: parse(&lookup, "EVBRIDGE_Y", defaults.y)?,
            region_path: lookup("EVBRIDGE_REGION_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.region_path),
            region_size: parse(&lookup, "EVBRIDGE_REGION_SIZE", defaults.region_size)?,
            controller_grace: parse(&lookup, "EVBRIDGE_CONTROLLER_GRACE", defaults.controller_grace)?,
            poll_interval: Duration::from_millis(parse(
                &lookup,
                "EVBRIDGE_POLL_INTERVAL_MS",
                defaults.poll_interval.as_millis() as u64,
            )?),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ConfigError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        if self.region_size < REGION_MIN_SIZE {
            return Err(ConfigError::RegionTooSmall(self.region_size));
        }
        Ok(())
    }

    /// Window creation parameters
    pub fn window_spec(&self) -> WindowSpec {
        WindowSpec::new(self.title.clone(), self.width, self.height).at(self.x, self.y)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            title: "evbridge".to_string(),
            width: 1280,
            height: 720,
            x: -1,
            y: -1,
            region_path: std::env::temp_dir().join("evbridge.region"),
            region_size: REGION_MIN_SIZE.div_ceil(PAGE_SIZE) * PAGE_SIZE,
            controller_grace: 1,
            poll_interval: Duration::from_millis(1),
        }
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
    #[error("Window size {width}x{height} must be positive")]
    InvalidSize { width: i32, height: i32 },
    #[error("Region size {0} is smaller than {min}", min = REGION_MIN_SIZE)]
    RegionTooSmall(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<BridgeConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BridgeConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.title, "evbridge");
        assert_eq!((config.width, config.height), (1280, 720));
        assert_eq!(config.region_size, 4096);
        assert_eq!(config.controller_grace, 1);
        assert_eq!(config.poll_interval, Duration::from_millis(1));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("EVBRIDGE_TITLE", "Game"),
            ("EVBRIDGE_WIDTH", "800"),
            ("EVBRIDGE_X", "40"),
            ("EVBRIDGE_REGION_PATH", "/tmp/other.region"),
            ("EVBRIDGE_CONTROLLER_GRACE", " 3 "),
        ])
        .unwrap();
        assert_eq!(config.title, "Game");
        assert_eq!(config.width, 800);
        assert_eq!(config.region_path, PathBuf::from("/tmp/other.region"));
        assert_eq!(config.controller_grace, 3);

        let spec = config.window_spec();
        assert_eq!(spec.x, Some(40));
        assert_eq!(spec.y, None);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("EVBRIDGE_HEIGHT", "tall")]),
            Err(ConfigError::Invalid {
                key: "EVBRIDGE_HEIGHT",
                ..
            })
        ));
        assert!(matches!(
            load(&[("EVBRIDGE_WIDTH", "0")]),
            Err(ConfigError::InvalidSize { .. })
        ));
        assert!(matches!(
            load(&[("EVBRIDGE_REGION_SIZE", "64")]),
            Err(ConfigError::RegionTooSmall(64))
        ));
    }
}
