//! Configuration for the settlement engine

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settlement engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Share rounding configuration
    pub rounding: RoundingConfig,

    /// Result snapshot configuration
    pub snapshot: SnapshotConfig,

    /// Output configuration
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "settle-engine".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            rounding: RoundingConfig::default(),
            snapshot: SnapshotConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Share rounding configuration
///
/// Both modes truncate toward zero; they only differ in precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundingConfig {
    /// Decimal places kept for the equal share in default mode
    pub share_scale: u32,

    /// Decimal places kept for the equal share when a remainder override is given
    pub override_scale: u32,
}

impl Default for RoundingConfig {
    fn default() -> Self {
        Self {
            share_scale: 2,
            override_scale: 0,
        }
    }
}

/// Result snapshot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Persist every calculated result
    pub enabled: bool,

    /// Directory holding one JSON-lines file per settlement
    pub data_dir: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            data_dir: PathBuf::from("./data/snapshots"),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty print JSON
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse from a TOML document
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(dir) = std::env::var("SETTLE_SNAPSHOT_DIR") {
            config.snapshot.data_dir = PathBuf::from(dir);
        }

        if let Ok(enabled) = std::env::var("SETTLE_SNAPSHOT_ENABLED") {
            config.snapshot.enabled = parse_flag("SETTLE_SNAPSHOT_ENABLED", &enabled)?;
        }

        if let Ok(pretty) = std::env::var("SETTLE_PRETTY") {
            config.output.pretty = parse_flag("SETTLE_PRETTY", &pretty)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject scales `Decimal` cannot represent
    pub fn validate(&self) -> crate::Result<()> {
        const MAX_SCALE: u32 = 28;
        if self.rounding.share_scale > MAX_SCALE || self.rounding.override_scale > MAX_SCALE {
            return Err(crate::Error::Config(format!(
                "rounding scale must be at most {}",
                MAX_SCALE
            )));
        }
        Ok(())
    }
}

fn parse_flag(name: &str, value: &str) -> crate::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(crate::Error::Config(format!(
            "{} must be a boolean, got {:?}",
            name, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rounding() {
        let config = Config::default();
        assert_eq!(config.rounding.share_scale, 2);
        assert_eq!(config.rounding.override_scale, 0);
        assert!(!config.snapshot.enabled);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [snapshot]
            enabled = true
            data_dir = "/tmp/settle"
            "#,
        )
        .unwrap();

        assert!(config.snapshot.enabled);
        assert_eq!(config.snapshot.data_dir, PathBuf::from("/tmp/settle"));
        assert_eq!(config.rounding, RoundingConfig::default());
        assert!(config.output.pretty);
    }

    #[test]
    fn test_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("settle.toml");
        std::fs::write(
            &path,
            "service_name = \"settle-test\"\n\n[rounding]\nshare_scale = 3\n\n[output]\npretty = false\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.service_name, "settle-test");
        assert_eq!(config.rounding.share_scale, 3);
        assert_eq!(config.rounding.override_scale, 0);
        assert!(!config.output.pretty);
        assert!(!config.snapshot.enabled);
    }

    #[test]
    fn test_from_file_errors() {
        let temp_dir = tempfile::tempdir().unwrap();

        let missing = Config::from_file(temp_dir.path().join("absent.toml"));
        assert!(matches!(missing, Err(crate::Error::Io(_))));

        let path = temp_dir.path().join("broken.toml");
        std::fs::write(&path, "[rounding\n").unwrap();
        assert!(matches!(Config::from_file(&path), Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_rejects_oversized_scale() {
        let result = Config::from_toml("[rounding]\nshare_scale = 40\n");
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("X", "Yes").unwrap());
        assert!(!parse_flag("X", "0").unwrap());
        assert!(parse_flag("X", "maybe").is_err());
    }
}
