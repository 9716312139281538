//! Application settings and device profiles

use crate::core::transport::SerialSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Device used when no profile or port is named
    pub device: SerialSettings,
    /// Saved device profiles
    pub profiles: Vec<DeviceProfile>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device: SerialSettings::default(),
            profiles: Vec::new(),
        }
    }
}

/// A named, saved device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Profile name
    pub name: String,
    /// Serial settings for the device
    pub serial: SerialSettings,
}

impl AppConfig {
    /// Load config from the platform config directory
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = super::config_dir()
            .ok_or("Could not determine config directory")?
            .join("config.toml");
        Self::load_from(&config_path)
    }

    /// Load config from an explicit path, falling back to defaults when the
    /// file does not exist
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the platform config directory
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_path = super::config_dir()
            .ok_or("Could not determine config directory")?
            .join("config.toml");
        self.save_to(&config_path)
    }

    /// Save config to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Look up a saved profile by name
    pub fn find_profile(&self, name: &str) -> Option<&DeviceProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.profiles.push(DeviceProfile {
            name: "bench".to_string(),
            serial: SerialSettings::new("/dev/ttyACM1", 9600).response_timeout_ms(500),
        });
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.profiles.len(), 1);
        let profile = loaded.find_profile("bench").unwrap();
        assert_eq!(profile.serial.port, "/dev/ttyACM1");
        assert_eq!(profile.serial.response_timeout_ms, 500);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.device.baud_rate, 9600);
        assert!(config.profiles.is_empty());
    }
}
