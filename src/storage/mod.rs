pub mod json_backend;

use std::path::Path;

use crate::{errors::LedgerError, ledger::Ledger};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Abstraction over persistence backends capable of storing the ledger and its backups.
pub trait StorageBackend: Send + Sync {
    fn save(&self, ledger: &Ledger) -> Result<()>;
    fn load(&self) -> Result<Ledger>;
    fn list_backups(&self) -> Result<Vec<String>>;
    /// Writes a dated backup and returns its file name.
    fn backup(&self, ledger: &Ledger) -> Result<String>;
    fn restore(&self, backup_name: &str) -> Result<Ledger>;

    /// Ad-hoc export to a user-chosen file.
    fn save_to_path(&self, ledger: &Ledger, path: &Path) -> Result<()> {
        json_backend::save_ledger_to_path(ledger, path)
    }

    fn load_from_path(&self, path: &Path) -> Result<Ledger> {
        json_backend::load_ledger_from_path(path)
    }
}

pub use json_backend::{
    backup_file_name, export_ledger, import_ledger, JsonStorage, BACKUP_PREFIX,
};
