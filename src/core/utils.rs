use dirs::home_dir;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::errors::Result;

const DEFAULT_DIR_NAME: &str = ".ledger_core";
const HOME_ENV: &str = "LEDGER_CORE_HOME";
const LEDGER_FILE: &str = "ledger.json";
const BACKUP_DIR: &str = "backups";
const CONFIG_FILE: &str = "config.json";

/// Returns the application data directory, defaulting to `~/.ledger_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Uses `root` when given, otherwise the application data directory.
pub fn resolve_base(root: Option<PathBuf>) -> PathBuf {
    root.unwrap_or_else(app_data_dir)
}

pub fn ledger_file_in(base: &Path) -> PathBuf {
    base.join(LEDGER_FILE)
}

pub fn backups_dir_in(base: &Path) -> PathBuf {
    base.join(BACKUP_DIR)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Sibling path used while writing, e.g. `ledger.json.tmp`.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.tmp"),
        None => "tmp".to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Writes through a temporary file and renames it over `path`.
pub fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmp_path_keeps_original_extension() {
        assert_eq!(
            tmp_path(Path::new("/data/ledger.json")),
            PathBuf::from("/data/ledger.json.tmp")
        );
        assert_eq!(tmp_path(Path::new("/data/ledger")), PathBuf::from("/data/ledger.tmp"));
    }

    #[test]
    fn write_atomic_leaves_no_temp_file() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("nested").join("ledger.json");
        write_atomic(&target, "{}").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "{}");
        assert!(!tmp_path(&target).exists());
    }
}
