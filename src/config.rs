//! Configuration file for howlerctl
//!
//! Settings live in `~/.config/howler/config.toml`. Every key is optional;
//! command-line flags override whatever the file says.

use std::path::{Path, PathBuf};
use std::time::Duration;

use howler_device::ContextOptions;
use howler_transport::MonitorConfig;
use serde::{Deserialize, Serialize};

fn default_prime_leds() -> bool {
    true
}

/// Persistent driver settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Device index used when `--device` is not given
    #[serde(default)]
    pub device: usize,

    /// Transfer timeout in milliseconds; absent blocks until the device answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Read every LED back on open so the first writes are diffed correctly
    #[serde(default = "default_prime_leds")]
    pub prime_leds: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: 0,
            timeout_ms: None,
            prime_leds: default_prime_leds(),
        }
    }
}

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub device: Option<usize>,
    pub timeout_ms: Option<u64>,
    pub no_prime: bool,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("howler")
            .join("config.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(device) = overrides.device {
            self.device = device;
        }
        if overrides.timeout_ms.is_some() {
            self.timeout_ms = overrides.timeout_ms;
        }
        if overrides.no_prime {
            self.prime_leds = false;
        }
        self
    }

    /// How the USB context should open devices
    pub fn context_options(&self, monitor: Option<MonitorConfig>) -> ContextOptions {
        ContextOptions {
            timeout: self.timeout_ms.map(Duration::from_millis),
            prime_leds: self.prime_leds,
            monitor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.prime_leds);
        assert_eq!(config.timeout_ms, None);
    }

    #[test]
    fn test_partial_file() {
        let file = write_config("timeout_ms = 2000\n");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.timeout_ms, Some(2000));
        assert_eq!(config.device, 0);
        assert!(config.prime_leds);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let file = write_config("device = \"first\"\n");
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }

    #[test]
    fn test_overrides_win() {
        let file = write_config("device = 1\ntimeout_ms = 500\n");
        let config = Config::load(file.path()).unwrap().with_overrides(&Overrides {
            device: Some(2),
            timeout_ms: None,
            no_prime: true,
        });
        assert_eq!(config.device, 2);
        assert_eq!(config.timeout_ms, Some(500));
        assert!(!config.prime_leds);

        let options = config.context_options(None);
        assert_eq!(options.timeout, Some(Duration::from_millis(500)));
        assert!(!options.prime_leds);
    }

    #[test]
    fn test_roundtrip() {
        let config = Config {
            device: 3,
            timeout_ms: Some(100),
            prime_leds: false,
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }
}
