//! Session-scoped configuration.
//!
//! Loaded once at startup and passed explicitly through the CLI into the
//! engine; nothing here is process-global.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{PayoffError, Result};
use crate::simulation::{Strategy, DEFAULT_HORIZON_MONTHS};

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub strategy: Strategy,
    /// Budgets always shown in the comparison table.
    pub preset_budgets: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_budget: Option<f64>,
    pub horizon_months: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Avalanche,
            preset_budgets: vec![800.0, 1000.0],
            custom_budget: None,
            horizon_months: DEFAULT_HORIZON_MONTHS,
        }
    }
}

impl SessionConfig {
    /// Preset budgets followed by the custom budget, if any.
    pub fn budgets(&self) -> Vec<f64> {
        let mut budgets = self.preset_budgets.clone();
        if let Some(custom) = self.custom_budget {
            if custom > 0.0 {
                budgets.push(custom);
            }
        }
        budgets
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(base_dir: &Path) -> Self {
        Self {
            path: base_dir.join(CONFIG_FILE),
        }
    }

    pub fn load(&self) -> Result<SessionConfig> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data)
                .map_err(|err| PayoffError::Config(format!("invalid config: {}", err)))
        } else {
            Ok(SessionConfig::default())
        }
    }

    pub fn save(&self, config: &SessionConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_include_both_preset_budgets() {
        let config = SessionConfig::default();
        assert_eq!(config.preset_budgets, vec![800.0, 1000.0]);
        assert_eq!(config.budgets().len(), 2);
    }

    #[test]
    fn custom_budget_is_appended() {
        let config = SessionConfig {
            custom_budget: Some(1250.0),
            ..SessionConfig::default()
        };
        assert_eq!(config.budgets(), vec![800.0, 1000.0, 1250.0]);
    }

    #[test]
    fn roundtrips_through_disk() {
        let temp = TempDir::new().expect("temp dir");
        let manager = ConfigManager::new(temp.path());
        let config = SessionConfig {
            strategy: Strategy::Snowball,
            custom_budget: Some(900.0),
            ..SessionConfig::default()
        };
        manager.save(&config).expect("save config");
        let loaded = manager.load().expect("load config");
        assert_eq!(loaded, config);
    }
}
