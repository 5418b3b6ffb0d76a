//! Normalization of persisted enum codes.
//!
//! Older backups mix `income`, `INCOME` and `Income`, and a few codes were renamed along
//! the way. Every tagged enum in the ledger parses through [`normalize`] exactly once on
//! load and serializes back in canonical `SCREAMING_SNAKE_CASE`.

use tracing::warn;

use crate::errors::LedgerError;

/// Uppercases `raw` and folds spaces, dashes and camel-case humps into underscores.
pub(crate) fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    let mut prev_lower = false;
    for ch in raw.trim().chars() {
        if ch == '-' || ch == ' ' || ch == '_' {
            if !out.ends_with('_') && !out.is_empty() {
                out.push('_');
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = ch.is_lowercase();
        out.extend(ch.to_uppercase());
    }
    out
}

pub(crate) fn unknown(kind: &'static str, value: &str) -> LedgerError {
    LedgerError::UnknownVariant {
        kind,
        value: value.to_string(),
    }
}

pub(crate) fn note_legacy(kind: &'static str, raw: &str, canonical: &str) {
    if raw != canonical {
        warn!(kind, raw, canonical, "normalized legacy code");
    }
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn normalize_folds_casing_variants() {
        assert_eq!(normalize("income"), "INCOME");
        assert_eq!(normalize("EqualPayment"), "EQUAL_PAYMENT");
        assert_eq!(normalize("equal-payment"), "EQUAL_PAYMENT");
        assert_eq!(normalize(" real estate "), "REAL_ESTATE");
        assert_eq!(normalize("INVEST_STABLE"), "INVEST_STABLE");
    }
}
