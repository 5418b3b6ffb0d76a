use chrono::{Local, NaiveDate, Utc};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

use crate::{
    core::utils::{backups_dir_in, ensure_dir, ledger_file_in, resolve_base, write_atomic},
    errors::LedgerError,
    ledger::Ledger,
};

use super::{Result, StorageBackend};

pub const BACKUP_PREFIX: &str = "ledger-backup-";
const BACKUP_EXTENSION: &str = "json";
const BACKUP_DATE_FORMAT: &str = "%Y-%m-%d";

/// File-backed storage: `<root>/ledger.json` plus dated copies under `<root>/backups`.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    ledger_file: PathBuf,
    backups_dir: PathBuf,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let app_root = resolve_base(root);
        ensure_dir(&app_root)?;
        let backups_dir = backups_dir_in(&app_root);
        ensure_dir(&backups_dir)?;
        Ok(Self {
            ledger_file: ledger_file_in(&app_root),
            backups_dir,
            root: app_root,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger_file
    }

    pub fn backup_path(&self, backup_name: &str) -> PathBuf {
        self.backups_dir.join(backup_name)
    }

    /// Loads the stored ledger, or `None` on first run.
    pub fn load_or_none(&self) -> Result<Option<Ledger>> {
        if !self.ledger_file.exists() {
            return Ok(None);
        }
        load_ledger_from_path(&self.ledger_file).map(Some)
    }

    fn backup_on(&self, ledger: &Ledger, day: NaiveDate) -> Result<String> {
        ensure_dir(&self.backups_dir)?;
        let name = backup_file_name(day);
        save_ledger_to_path(ledger, &self.backup_path(&name))?;
        info!(backup = %name, "wrote ledger backup");
        Ok(name)
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, ledger: &Ledger) -> Result<()> {
        write_atomic(&self.ledger_file, &serde_json::to_string_pretty(ledger)?)?;
        info!(
            path = %self.ledger_file.display(),
            transactions = ledger.transactions.len(),
            "saved ledger"
        );
        Ok(())
    }

    fn load(&self) -> Result<Ledger> {
        self.load_or_none()?.ok_or_else(|| {
            LedgerError::NotFound(format!("ledger file `{}`", self.ledger_file.display()))
        })
    }

    fn list_backups(&self) -> Result<Vec<String>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(name.to_string());
            }
        }
        entries.sort_by(|a, b| {
            backup_date(b)
                .cmp(&backup_date(a))
                .then_with(|| b.cmp(a))
        });
        Ok(entries)
    }

    fn backup(&self, ledger: &Ledger) -> Result<String> {
        self.backup_on(ledger, Local::now().date_naive())
    }

    fn restore(&self, backup_name: &str) -> Result<Ledger> {
        let path = self.backup_path(backup_name);
        if !path.exists() {
            return Err(LedgerError::Storage(format!(
                "backup `{backup_name}` not found"
            )));
        }
        let ledger = load_ledger_from_path(&path)?;
        self.save(&ledger)?;
        info!(backup = backup_name, "restored ledger from backup");
        Ok(ledger)
    }
}

/// `ledger-backup-YYYY-MM-DD.json`
pub fn backup_file_name(day: NaiveDate) -> String {
    format!(
        "{BACKUP_PREFIX}{}.{BACKUP_EXTENSION}",
        day.format(BACKUP_DATE_FORMAT)
    )
}

fn backup_date(name: &str) -> Option<NaiveDate> {
    let stem = name
        .strip_prefix(BACKUP_PREFIX)?
        .strip_suffix(&format!(".{BACKUP_EXTENSION}"))?;
    NaiveDate::parse_from_str(stem, BACKUP_DATE_FORMAT).ok()
}

/// Serializes the ledger as a pretty-printed backup document stamped with the export time.
pub fn export_ledger(ledger: &Ledger) -> Result<String> {
    let mut document = ledger.clone();
    document.version = Ledger::version_default();
    document.exported_at = Some(Utc::now());
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Parses a backup document, normalizing legacy codes, dates and balances.
///
/// Documents without `assets` and `transactions` arrays are rejected before any field
/// is interpreted. Loan terms longer than the supported maximum are rejected.
pub fn import_ledger(data: &str) -> Result<Ledger> {
    let value: serde_json::Value = serde_json::from_str(data)?;
    let has_array = |key: &str| value.get(key).is_some_and(|field| field.is_array());
    if !has_array("assets") || !has_array("transactions") {
        warn!("rejected backup document without assets/transactions arrays");
        return Err(LedgerError::Storage(
            "backup document must contain `assets` and `transactions` arrays".into(),
        ));
    }
    let mut ledger: Ledger = serde_json::from_value(value)?;
    for asset in &mut ledger.assets {
        asset.normalize_imported()?;
    }
    Ok(ledger)
}

pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<()> {
    write_atomic(path, &export_ledger(ledger)?)
}

pub fn load_ledger_from_path(path: &Path) -> Result<Ledger> {
    let data = fs::read_to_string(path)?;
    import_ledger(&data)
}
