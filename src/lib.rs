#![doc(test(attr(deny(warnings))))]

//! Ledger Core holds the computation engine of a household ledger: recurrence
//! expansion, budget aggregation, spending classification and loan amortization,
//! plus the JSON document and configuration they are persisted with.

pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

pub use errors::{LedgerError, Result};
pub use ledger::{
    aggregate_impulse, aggregate_period, amortization_payment, classify_nature,
    expand_recurrence,
};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Ledger core tracing initialized.");
    });
}
