use std::fmt;

use serde::{Deserialize, Serialize};

use super::transaction::{AllocationType, Transaction};

/// Four-way spending classification used by the analysis views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Nature {
    Living,
    Event,
    Invest,
    Impulse,
}

impl Nature {
    pub const ALL: [Nature; 4] = [Nature::Living, Nature::Event, Nature::Invest, Nature::Impulse];

    pub fn label(&self) -> &'static str {
        match self {
            Nature::Living => "Living",
            Nature::Event => "Event",
            Nature::Invest => "Invest",
            Nature::Impulse => "Impulse",
        }
    }
}

impl fmt::Display for Nature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies a transaction; the impulse flag outranks every allocation type.
pub fn classify_nature(transaction: &Transaction) -> Nature {
    if transaction.is_impulse {
        return Nature::Impulse;
    }
    if transaction.allocation_type.is_invest() {
        return Nature::Invest;
    }
    match transaction.allocation_type {
        AllocationType::Event => Nature::Event,
        _ => Nature::Living,
    }
}

/// Coarse split used for budget tracking: event spending versus everything else.
///
/// Impulse and invest entries are not separated here; they count toward `Living`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetPartition {
    Living,
    Event,
}

impl BudgetPartition {
    pub fn of(transaction: &Transaction) -> BudgetPartition {
        if transaction.allocation_type == AllocationType::Event {
            BudgetPartition::Event
        } else {
            BudgetPartition::Living
        }
    }

    pub fn contains(&self, transaction: &Transaction) -> bool {
        BudgetPartition::of(transaction) == *self
    }
}
