use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use uc_sdk::{FileStoreConfig, ProofConfig, UnichainConfig};

/// Node configuration, read from `unichain.toml`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Segment file directory. Relative paths resolve against the config
    /// file's directory.
    pub data_dir: PathBuf,
    pub store: FileStoreConfig,
    pub proofs: ProofConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            store: FileStoreConfig::default(),
            proofs: ProofConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Load `path`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// `data_dir` made absolute relative to the directory holding `config_path`.
    pub fn resolve_data_dir(&self, config_path: &Path) -> PathBuf {
        if self.data_dir.is_absolute() {
            return self.data_dir.clone();
        }
        match config_path.parent() {
            Some(parent) => parent.join(&self.data_dir),
            None => self.data_dir.clone(),
        }
    }

    pub fn unichain(&self) -> UnichainConfig {
        UnichainConfig {
            store: self.store.clone(),
            proofs: self.proofs.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use uc_sdk::SyncMode;

    use super::*;

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = NodeConfig::load(&dir.path().join("unichain.toml")).unwrap();
        assert_eq!(config, NodeConfig::default());
        assert_eq!(config.store.sync_mode, SyncMode::EveryWrite);
    }

    #[test]
    fn partial_file_overrides_only_what_it_names() {
        let config = NodeConfig::parse(
            r#"
            data_dir = "/var/lib/unichain"

            [store]
            sync_mode = "os_default"

            [proofs.quality.temperature]
            min = 2.0
            max = 8.0
            "#,
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/unichain"));
        assert_eq!(config.store.sync_mode, SyncMode::OsDefault);
        assert_eq!(config.proofs.quality.temperature.max, 8.0);
        assert_eq!(config.proofs.quality.moisture.max, 11.0);
        assert_eq!(config.proofs.route.max_speed_kmh, 120.0);
    }

    #[test]
    fn written_config_reads_back() {
        let config = NodeConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(NodeConfig::parse(&text).unwrap(), config);
    }

    #[test]
    fn relative_data_dir_follows_config_file() {
        let config = NodeConfig::default();
        assert_eq!(
            config.resolve_data_dir(Path::new("/srv/node/unichain.toml")),
            PathBuf::from("/srv/node/data")
        );
        assert_eq!(
            config.resolve_data_dir(Path::new("unichain.toml")),
            PathBuf::from("data")
        );
    }

    #[test]
    fn unknown_sync_mode_is_an_error() {
        assert!(NodeConfig::parse("[store]\nsync_mode = \"sometimes\"").is_err());
    }
}
