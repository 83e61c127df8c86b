//! Configuration loading from abyss.toml
//!
//! AbyssBench configuration can be specified in an `abyss.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.

use abyssbench_core::MemorySource;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name looked up by [`AbyssConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "abyss.toml";

/// AbyssBench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AbyssConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Runner configuration for benchmark execution
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunnerConfig {
    /// Memory source: "auto", "allocator", or "resident"
    #[serde(default)]
    pub memory: MemorySource,
    /// Default operation name filter (regex)
    #[serde(default)]
    pub filter: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Report file; stdout when unset
    #[serde(default)]
    pub path: Option<String>,
}

impl AbyssConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory.
    ///
    /// A file that exists but fails to parse is an error, not a silent default.
    pub fn discover() -> anyhow::Result<Option<Self>> {
        let mut dir = std::env::current_dir()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                tracing::debug!(path = %config_path.display(), "loading configuration");
                return Self::load(&config_path).map(Some);
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# AbyssBench Configuration

[runner]
# Memory source: "auto", "allocator" (requires TrackingAllocator), or "resident"
memory = "auto"
# Only run operations whose name matches (uncomment to enable)
# filter = "^sha"

[output]
# Write reports to a file instead of stdout (uncomment to enable)
# path = "target/abyssbench/report.txt"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AbyssConfig::default();
        assert_eq!(config.runner.memory, MemorySource::Auto);
        assert!(config.runner.filter.is_none());
        assert!(config.output.path.is_none());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [runner]
            memory = "resident"
            filter = "sha"
        "#;

        let config: AbyssConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.runner.memory, MemorySource::Resident);
        assert_eq!(config.runner.filter.as_deref(), Some("sha"));
        // Defaults should still apply
        assert!(config.output.path.is_none());
    }

    #[test]
    fn test_unknown_memory_source_rejected() {
        let result: Result<AbyssConfig, _> = toml::from_str("[runner]\nmemory = \"gc\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_default_toml_parses() {
        let default_toml = AbyssConfig::default_toml();
        let config: AbyssConfig = toml::from_str(&default_toml).unwrap();
        assert_eq!(config.runner.memory, MemorySource::Auto);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("abyss-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[output]\npath = \"report.txt\"\n").unwrap();

        let config = AbyssConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.output.path.as_deref(), Some("report.txt"));
    }
}
