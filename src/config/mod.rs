use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::{
    core::utils::{app_data_dir, config_file_in, ensure_dir, write_atomic},
    errors::{LedgerError, Result},
    ledger::calendar::serde_date,
};

pub const DEFAULT_MAX_ASSETS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    /// Upper bound on tracked assets, including loans.
    pub max_assets: usize,
    /// End date offered for open-ended recurrences.
    #[serde(with = "serde_date")]
    pub default_recurrence_end: NaiveDate,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "ko-KR".into(),
            currency: "KRW".into(),
            max_assets: DEFAULT_MAX_ASSETS,
            default_recurrence_end: NaiveDate::from_ymd_opt(2099, 12, 31)
                .unwrap_or(NaiveDate::MAX),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.locale.trim().is_empty() {
            return Err(LedgerError::Config("locale must not be empty".into()));
        }
        if self.currency.trim().is_empty() {
            return Err(LedgerError::Config("currency must not be empty".into()));
        }
        if self.max_assets == 0 {
            return Err(LedgerError::Config("max_assets must be at least 1".into()));
        }
        Ok(())
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
        })
    }

    /// Reads the stored configuration, falling back to defaults on first run.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: Config = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        write_atomic(&self.path, &serde_json::to_string_pretty(config)?)?;
        info!(path = %self.path.display(), "saved configuration");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.max_assets, 10);
        assert_eq!(config.currency, "KRW");
    }

    #[test]
    fn save_then_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = Config {
            locale: "en-US".into(),
            max_assets: 3,
            ..Config::default()
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
        let raw = fs::read_to_string(manager.path()).unwrap();
        assert!(raw.contains("\"defaultRecurrenceEnd\": \"2099-12-31\""));
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{"currency":"USD"}"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.currency, "USD");
        assert_eq!(config.locale, "ko-KR");
    }

    #[test]
    fn zero_asset_limit_is_rejected() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = Config {
            max_assets: 0,
            ..Config::default()
        };
        assert!(matches!(manager.save(&config), Err(LedgerError::Config(_))));
    }
}
