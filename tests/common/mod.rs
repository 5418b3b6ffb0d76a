#![allow(dead_code)]

use chrono::NaiveDate;
use ledger_core::ledger::{AllocationType, Transaction};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn impulse(id: &str, category: &str, day: NaiveDate, amount: f64) -> Transaction {
    let mut txn = Transaction::expense(id, category, day, amount);
    txn.is_impulse = true;
    txn
}

pub fn allocated(
    id: &str,
    category: &str,
    day: NaiveDate,
    amount: f64,
    allocation: AllocationType,
) -> Transaction {
    let mut txn = Transaction::expense(id, category, day, amount);
    txn.allocation_type = allocation;
    txn
}
