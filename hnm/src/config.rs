use anyhow::{Context, Result};
use hnmapped::prelude::ViewMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted defaults for the command line. Flags and env vars override them.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Directory of month files
    pub data_dir: Option<PathBuf>,
    /// Base url of a published site; month files are read from `<url>/data/`
    pub url: Option<String>,
    /// View used when `--view` is not given
    pub view: Option<ViewMode>,
    /// Debounce quiet period for `hnm session` (milliseconds)
    pub debounce_ms: Option<u64>,
}

impl CliConfig {
    pub fn path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("hnmapped").join("cli.json")
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let config = serde_json::from_str(&data).context("parse cli config")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let data = serde_json::to_string_pretty(self).context("serialize cli config")?;
        fs::write(path, data).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    pub fn reset() -> Result<()> {
        let path = Self::path();
        if path.exists() {
            fs::remove_file(&path).with_context(|| format!("remove {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = CliConfig::load_from(&dir.path().join("cli.json"))?;
        assert_eq!(config, CliConfig::default());
        Ok(())
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("cli.json");
        let config = CliConfig {
            data_dir: Some("web/data".into()),
            view: Some(ViewMode::List),
            debounce_ms: Some(150),
            ..Default::default()
        };
        config.save_to(&path)?;
        let text = fs::read_to_string(&path)?;
        assert!(text.contains("\"view\": \"list\""), "{text}");
        assert_eq!(CliConfig::load_from(&path)?, config);
        Ok(())
    }
}
