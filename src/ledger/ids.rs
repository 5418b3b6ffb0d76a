use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Source of identifiers for new transactions, assets and recurrence groups.
pub trait IdProvider {
    fn next_id(&self) -> String;
}

/// Default provider backed by random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdProvider;

impl IdProvider for UuidIdProvider {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic provider yielding `prefix-1`, `prefix-2`, ...
#[derive(Debug)]
pub struct SequentialIdProvider {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIdProvider {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl Default for SequentialIdProvider {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdProvider for SequentialIdProvider {
    fn next_id(&self) -> String {
        let value = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.prefix, value)
    }
}

impl<T: IdProvider + ?Sized> IdProvider for &T {
    fn next_id(&self) -> String {
        (**self).next_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_are_predictable() {
        let ids = SequentialIdProvider::new("txn");
        assert_eq!(ids.next_id(), "txn-1");
        assert_eq!(ids.next_id(), "txn-2");
    }

    #[test]
    fn uuid_ids_do_not_repeat() {
        let ids = UuidIdProvider;
        assert_ne!(ids.next_id(), ids.next_id());
    }
}
