use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};

use super::validation::LedgerDate;

/// Number of decimal places every amount is normalised to.
pub const AMOUNT_SCALE: u32 = 2;

/// Direction of money flow for a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    /// Inflow, increases the balance.
    Credit,
    /// Outflow, decreases the balance.
    Debit,
}

impl TransactionKind {
    pub fn from_credit_flag(is_credit: bool) -> Self {
        if is_credit {
            TransactionKind::Credit
        } else {
            TransactionKind::Debit
        }
    }

    pub fn is_credit(self) -> bool {
        matches!(self, TransactionKind::Credit)
    }

    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::Credit => "Credit",
            TransactionKind::Debit => "Debit",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single immutable ledger entry.
///
/// No validation happens here: callers check dates and amounts at the input
/// boundary. The amount is normalised to two decimal places so the stored
/// and displayed values never drift apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    amount: Decimal,
    category: String,
    date: LedgerDate,
    description: String,
    kind: TransactionKind,
}

impl Transaction {
    pub fn new(
        amount: Decimal,
        category: impl Into<String>,
        date: impl Into<LedgerDate>,
        description: impl Into<String>,
        kind: TransactionKind,
    ) -> Self {
        Self {
            amount: normalize_amount(amount),
            category: category.into(),
            date: date.into(),
            description: description.into(),
            kind,
        }
    }

    pub fn credit(
        amount: Decimal,
        category: impl Into<String>,
        date: impl Into<LedgerDate>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(amount, category, date, description, TransactionKind::Credit)
    }

    pub fn debit(
        amount: Decimal,
        category: impl Into<String>,
        date: impl Into<LedgerDate>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(amount, category, date, description, TransactionKind::Debit)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn date(&self) -> LedgerDate {
        self.date
    }

    /// Canonical `YYYY-MM-DD` form used for matching and persistence.
    pub fn date_string(&self) -> String {
        self.date.to_string()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn is_credit(&self) -> bool {
        self.kind.is_credit()
    }

    /// Amount with its balance effect applied: positive for credits.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Credit => self.amount,
            TransactionKind::Debit => -self.amount,
        }
    }
}

/// Rounds half away from zero, then pads to exactly two decimal places.
fn normalize_amount(amount: Decimal) -> Decimal {
    let mut normalized =
        amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    normalized.rescale(AMOUNT_SCALE);
    normalized
}
