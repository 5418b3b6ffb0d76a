mod common;

use common::date;
use ledger_core::{
    config::{Config, ConfigManager},
    core::utils::tmp_path,
    ledger::{
        AllocationType, Asset, AssetCategory, Ledger, RepaymentMethod, Transaction,
        TransactionType,
    },
    storage::{export_ledger, import_ledger, JsonStorage, StorageBackend},
    LedgerError,
};
use std::fs;
use tempfile::tempdir;

const LEGACY_DOCUMENT: &str = r#"{
  "assets": [
    {"id": "a1", "name": "Wallet", "category": "cash", "balance": 150000, "color": "bg-green-400"},
    {
      "id": "a2",
      "name": "Mortgage",
      "category": "LOAN",
      "balance": 1000000,
      "loanDetails": {"interestRate": "5", "duration": "12", "gracePeriod": "0", "method": "BULK"}
    }
  ],
  "transactions": [
    {
      "id": "t1",
      "type": "expense",
      "amount": 5000,
      "budgetAmount": null,
      "category": "Food",
      "date": "2024-03-05T00:00:00.000Z",
      "isImpulse": true,
      "allocationType": "INVEST_SAFE"
    },
    {
      "id": "t2",
      "type": "Income",
      "amount": 2500000,
      "category": "Salary",
      "description": "March pay",
      "date": "2024-03-25",
      "isImpulse": false,
      "allocationType": "living"
    }
  ]
}"#;

fn sample_ledger() -> Ledger {
    let mut ledger = Ledger::new();
    ledger
        .add_asset(Asset::new("a-1", "Wallet", AssetCategory::Cash, 42.0), 10)
        .unwrap();
    ledger
        .add_transaction(Transaction::expense("t-1", "Food", date(2025, 1, 1), 42.0))
        .unwrap();
    ledger
}

#[test]
fn legacy_document_is_normalized_on_import() {
    let ledger = import_ledger(LEGACY_DOCUMENT).expect("legacy import");
    assert_eq!(ledger.version, "1.0");

    let food = ledger.transaction("t1").unwrap();
    assert_eq!(food.kind, TransactionType::Expense);
    assert_eq!(food.date, date(2024, 3, 5));
    assert_eq!(food.allocation_type, AllocationType::InvestStable);
    assert_eq!(food.budget_amount, None);
    assert!(ledger.transaction("t2").unwrap().is_income());

    let mortgage = ledger.asset("a2").unwrap();
    let details = mortgage.loan_details.as_ref().unwrap();
    assert_eq!(details.method, RepaymentMethod::Bullet);
    assert_eq!(details.duration_months, 12);
    assert_eq!(ledger.net_worth(), -850_000.0);

    let exported = export_ledger(&ledger).unwrap();
    assert!(exported.contains("\"INVEST_STABLE\""));
    assert!(exported.contains("\"BULLET\""));
    assert!(exported.contains("\"2024-03-05\""));
    assert!(exported.contains("\"exportedAt\""));
}

#[test]
fn export_then_import_preserves_records() {
    let ledger = sample_ledger();
    let restored = import_ledger(&export_ledger(&ledger).unwrap()).unwrap();
    assert_eq!(restored.assets, ledger.assets);
    assert_eq!(restored.transactions, ledger.transactions);
}

#[test]
fn malformed_documents_are_rejected() {
    assert!(matches!(
        import_ledger(r#"{"transactions": []}"#),
        Err(LedgerError::Storage(_))
    ));
    assert!(matches!(import_ledger("not json"), Err(LedgerError::Serde(_))));
    let unknown = r#"{"assets": [], "transactions": [{"id":"x","type":"TRANSFER","amount":1,"category":"c","date":"2024-01-01"}]}"#;
    assert!(import_ledger(unknown).is_err());
}

#[test]
fn atomic_save_failure_preserves_original_file() {
    let temp = tempdir().unwrap();
    let storage = JsonStorage::new(Some(temp.path().to_path_buf())).unwrap();

    let mut ledger = sample_ledger();
    storage.save(&ledger).expect("initial save");
    let path = storage.ledger_path().to_path_buf();
    let original = fs::read_to_string(&path).expect("read original file");

    // A directory squatting on the temp name makes the write fail.
    fs::create_dir_all(tmp_path(&path)).unwrap();
    ledger
        .add_transaction(Transaction::expense("t-2", "Food", date(2025, 1, 2), 99.0))
        .unwrap();
    assert!(storage.save(&ledger).is_err());

    let current = fs::read_to_string(&path).expect("read after failure");
    assert_eq!(current, original);
}

#[test]
fn backup_and_restore_cycle() {
    let temp = tempdir().unwrap();
    let storage = JsonStorage::new(Some(temp.path().to_path_buf())).unwrap();
    let ledger = sample_ledger();

    let name = storage.backup(&ledger).unwrap();
    assert!(name.starts_with("ledger-backup-"));
    assert!(name.ends_with(".json"));
    assert_eq!(storage.list_backups().unwrap(), vec![name.clone()]);

    storage.save(&Ledger::new()).unwrap();
    let restored = storage.restore(&name).unwrap();
    assert_eq!(restored.transactions, ledger.transactions);
    assert_eq!(storage.load().unwrap().transactions.len(), 1);
}

#[test]
fn custom_path_export_uses_trait_defaults() {
    let temp = tempdir().unwrap();
    let storage = JsonStorage::new(Some(temp.path().to_path_buf())).unwrap();
    let target = temp.path().join("exports").join("household.json");
    storage.save_to_path(&sample_ledger(), &target).unwrap();
    let loaded = storage.load_from_path(&target).unwrap();
    assert_eq!(loaded.assets.len(), 1);
}

#[test]
fn config_lives_next_to_ledger() {
    let temp = tempdir().unwrap();
    let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
    let config = Config {
        currency: "USD".into(),
        ..Config::default()
    };
    manager.save(&config).unwrap();
    assert_eq!(manager.path(), temp.path().join("config.json"));
    assert_eq!(manager.load().unwrap().currency, "USD");
}
