use anyhow::{Context, Result};
use hnmapped::prelude::ViewMode;
use tracing::info;

use crate::{
    cli::{ConfigArgs, ConfigCommands, ConfigKeyArg},
    config::CliConfig,
    output::Output,
};

pub fn handle(args: &ConfigArgs, output: &Output) -> Result<()> {
    match &args.command {
        ConfigCommands::Show => output.emit_json(&CliConfig::load()?),
        ConfigCommands::Set { key, value } => {
            let mut config = CliConfig::load()?;
            set(&mut config, *key, value)?;
            config.save()?;
            info!(path = %CliConfig::path().display(), "config saved");
            output.emit_json(&config)
        }
        ConfigCommands::Reset => {
            CliConfig::reset()?;
            output.emit_json(&CliConfig::default())
        }
    }
}

/// Sets one value. An empty value clears it.
fn set(config: &mut CliConfig, key: ConfigKeyArg, value: &str) -> Result<()> {
    let value = value.trim();
    let value = (!value.is_empty()).then_some(value);
    match key {
        ConfigKeyArg::DataDir => config.data_dir = value.map(Into::into),
        ConfigKeyArg::Url => config.url = value.map(ToString::to_string),
        ConfigKeyArg::View => {
            config.view = value
                .map(str::parse::<ViewMode>)
                .transpose()
                .context("view must be map or list")?;
        }
        ConfigKeyArg::DebounceMs => {
            config.debounce_ms = value
                .map(str::parse::<u64>)
                .transpose()
                .context("debounce-ms must be a number of milliseconds")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_values() -> Result<()> {
        let mut config = CliConfig::default();
        set(&mut config, ConfigKeyArg::View, "List")?;
        set(&mut config, ConfigKeyArg::DebounceMs, "150")?;
        set(&mut config, ConfigKeyArg::Url, "https://example.com")?;
        assert_eq!(config.view, Some(ViewMode::List));
        assert_eq!(config.debounce_ms, Some(150));
        assert_eq!(config.url.as_deref(), Some("https://example.com"));

        set(&mut config, ConfigKeyArg::Url, "")?;
        assert_eq!(config.url, None);

        assert!(set(&mut config, ConfigKeyArg::View, "globe").is_err());
        assert!(set(&mut config, ConfigKeyArg::DebounceMs, "soon").is_err());
        // a rejected value leaves the old one
        assert_eq!(config.view, Some(ViewMode::List));
        Ok(())
    }
}
