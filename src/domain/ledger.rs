use chrono::NaiveDateTime;

use super::{Cents, Transaction, TransactionKind};

/// Compute the balance implied by a list of transactions.
/// Balance = sum of incomes - sum of expenses, or `None` if the sum
/// does not fit in [`Cents`].
pub fn compute_balance(transactions: &[Transaction]) -> Option<Cents> {
    transactions
        .iter()
        .try_fold(0 as Cents, |balance, tx| balance.checked_add(tx.signed_amount()))
}

/// Flat income/expense sums over a sequence of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub income: Cents,
    pub expense: Cents,
}

impl Totals {
    pub fn net(&self) -> Cents {
        self.income.saturating_sub(self.expense)
    }
}

/// Sums saturate at `Cents::MAX` instead of wrapping.
pub fn summarize<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Totals {
    transactions
        .into_iter()
        .fold(Totals::default(), |mut totals, tx| {
            match tx.kind {
                TransactionKind::Income => {
                    totals.income = totals.income.saturating_add(tx.amount_cents)
                }
                TransactionKind::Expense => {
                    totals.expense = totals.expense.saturating_add(tx.amount_cents)
                }
            }
            totals
        })
}

/// In-memory pocket-money state: the running balance plus the append-only
/// history that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerState {
    balance: Cents,
    history: Vec<Transaction>,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a state from persisted parts. The stored balance is trusted
    /// as-is, it is not recomputed from `history`.
    pub fn from_parts(balance: Cents, history: Vec<Transaction>) -> Self {
        Self { balance, history }
    }

    pub fn balance(&self) -> Cents {
        self.balance
    }

    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty() && self.balance == 0
    }

    /// Transactions of the given kind (or all of them) in insertion order.
    /// The returned iterator borrows the history and can be cloned to
    /// restart it.
    pub fn transactions(
        &self,
        filter: Option<TransactionKind>,
    ) -> impl Iterator<Item = &Transaction> + Clone {
        self.history
            .iter()
            .filter(move |tx| filter.is_none_or(|kind| tx.kind == kind))
    }

    /// Append an income and increase the balance.
    pub fn credit(
        &mut self,
        amount_cents: Cents,
        description: &str,
        now: NaiveDateTime,
    ) -> Result<&Transaction, BalanceError> {
        let balance = self
            .balance
            .checked_add(amount_cents)
            .ok_or(BalanceError::Overflow)?;
        self.append(TransactionKind::Income, amount_cents, description, now, balance)
    }

    /// Append an expense and decrease the balance.
    /// Fails without touching the state if the balance does not cover it.
    pub fn debit(
        &mut self,
        amount_cents: Cents,
        description: &str,
        now: NaiveDateTime,
    ) -> Result<&Transaction, BalanceError> {
        if amount_cents > self.balance {
            return Err(BalanceError::Insufficient {
                balance: self.balance,
                required: amount_cents,
            });
        }
        let balance = self.balance - amount_cents;
        self.append(TransactionKind::Expense, amount_cents, description, now, balance)
    }

    /// Drop the whole history and zero the balance.
    pub fn clear(&mut self) {
        self.balance = 0;
        self.history.clear();
    }

    fn append(
        &mut self,
        kind: TransactionKind,
        amount_cents: Cents,
        description: &str,
        now: NaiveDateTime,
        new_balance: Cents,
    ) -> Result<&Transaction, BalanceError> {
        if amount_cents <= 0 {
            return Err(BalanceError::NonPositiveAmount(amount_cents));
        }

        let timestamp = self.next_timestamp(now);
        self.history
            .push(Transaction::new(kind, amount_cents, description, timestamp));
        self.balance = new_balance;

        // Just pushed, so the history is non-empty
        Ok(&self.history[self.history.len() - 1])
    }

    /// Never hand out a timestamp older than the last entry, so the history
    /// stays chronological even if the wall clock steps backwards.
    fn next_timestamp(&self, now: NaiveDateTime) -> NaiveDateTime {
        match self.history.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceError {
    NonPositiveAmount(Cents),
    Insufficient { balance: Cents, required: Cents },
    Overflow,
}

impl std::fmt::Display for BalanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BalanceError::NonPositiveAmount(amount) => {
                write!(f, "Amount must be positive, got {} cents", amount)
            }
            BalanceError::Insufficient { balance, required } => write!(
                f,
                "Expense of {} cents exceeds balance of {} cents",
                required, balance
            ),
            BalanceError::Overflow => write!(f, "Balance would overflow"),
        }
    }
}

impl std::error::Error for BalanceError {}
