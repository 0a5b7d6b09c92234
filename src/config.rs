// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::storage::LocalStorage;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;

fn default_true() -> bool {
    true
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Config {
    /// Run the roll-forward job when the app starts.
    #[serde(default = "default_true")]
    pub advance_on_load: bool,
    /// Hide completed tasks from plain listings.
    #[serde(default)]
    pub hide_completed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            advance_on_load: true,
            hide_completed: false,
        }
    }
}

impl Config {
    /// Loads the configuration, falling back to defaults when no file exists.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        let content = toml::to_string_pretty(self)?;
        LocalStorage::atomic_write(&path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestContext;

    #[test]
    fn missing_file_yields_defaults() {
        let ctx = TestContext::new();
        let config = Config::load(&ctx).unwrap();
        assert!(config.advance_on_load);
        assert!(!config.hide_completed);
    }

    #[test]
    fn save_and_load_round_trip() {
        let ctx = TestContext::new();
        let config = Config {
            advance_on_load: false,
            hide_completed: true,
        };
        config.save(&ctx).unwrap();

        let loaded = Config::load(&ctx).unwrap();
        assert!(!loaded.advance_on_load);
        assert!(loaded.hide_completed);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let ctx = TestContext::new();
        let path = ctx.get_config_file_path().unwrap();
        std::fs::write(&path, "hide_completed = true\n").unwrap();

        let loaded = Config::load(&ctx).unwrap();
        assert!(loaded.advance_on_load);
        assert!(loaded.hide_completed);
    }
}
