use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

use super::Cents;

/// Placeholder stored when a transaction is recorded without a description.
pub const NO_DESCRIPTION: &str = "(tanpa keterangan)";

/// Direction of a transaction relative to the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    /// Label used both on screen and in the store file.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Pemasukan",
            TransactionKind::Expense => "Pengeluaran",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Pemasukan" => Some(TransactionKind::Income),
            "Pengeluaran" => Some(TransactionKind::Expense),
            _ => None,
        }
    }

    /// Signed effect of `amount` on the balance.
    pub fn signed(&self, amount: Cents) -> Cents {
        match self {
            TransactionKind::Income => amount,
            TransactionKind::Expense => -amount,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" | "pemasukan" => Ok(TransactionKind::Income),
            "expense" | "pengeluaran" => Ok(TransactionKind::Expense),
            _ => Err(format!("Unknown transaction kind: {}", s)),
        }
    }
}

/// A single entry in the pocket-money history.
/// Transactions are never edited once appended; only a reset removes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub kind: TransactionKind,
    /// Amount in cents (always positive)
    pub amount_cents: Cents,
    pub description: String,
    /// Local wall-clock time the transaction was recorded
    pub timestamp: NaiveDateTime,
}

impl Transaction {
    /// Create a new transaction. Blank descriptions are replaced with
    /// [`NO_DESCRIPTION`].
    pub fn new(
        kind: TransactionKind,
        amount_cents: Cents,
        description: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        assert!(amount_cents > 0, "Transaction amount must be positive");
        let description = description.into();
        let description = if description.trim().is_empty() {
            NO_DESCRIPTION.to_string()
        } else {
            description.trim().to_string()
        };

        Self {
            kind,
            amount_cents,
            description,
            timestamp,
        }
    }

    /// Signed effect of this transaction on the balance.
    pub fn signed_amount(&self) -> Cents {
        self.kind.signed(self.amount_cents)
    }
}
