use std::path::PathBuf;

use chrono::{Local, NaiveDateTime, SubsecRound};

use crate::domain::{
    BalanceError, Cents, LedgerState, Totals, Transaction, TransactionKind, format_rupiah,
    parse_amount, summarize,
};
use crate::storage::Store;

use super::AppError;

/// Literal the user must type to wipe the ledger.
pub const RESET_CONFIRMATION: &str = "YA";

/// Application service providing high-level operations for the ledger.
/// This is the primary interface for any client (menu, subcommands, export).
pub struct LedgerService {
    store: Store,
    state: LedgerState,
}

/// Result of recording an income or an expense
pub struct RecordResult {
    pub transaction: Transaction,
    /// Recorded amount, formatted for display
    pub amount: String,
    /// Balance after the transaction, formatted for display
    pub balance: String,
}

/// Outcome of a reset request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    Cleared,
    /// The confirmation did not match; nothing changed.
    Declined,
}

impl LedgerService {
    /// Create a service over an already loaded state.
    pub fn new(store: Store, state: LedgerState) -> Self {
        Self { store, state }
    }

    /// Load the ledger file at `path`, falling back to an empty ledger when
    /// it is missing or unreadable.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let store = Store::new(path);
        let loaded = store.load().await;

        if loaded.recovered.is_none() {
            tracing::info!(
                path = %store.path().display(),
                transactions = loaded.state.history().len(),
                "ledger opened"
            );
        }

        Self::new(store, loaded.state)
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    // ========================
    // Mutations
    // ========================

    /// Record an income parsed from user input.
    pub async fn record_income(
        &mut self,
        amount_input: &str,
        description: &str,
    ) -> Result<RecordResult, AppError> {
        let amount_cents = parse_positive_amount(amount_input)?;
        let transaction = self
            .state
            .credit(amount_cents, description, now())
            .map_err(|e| balance_error(e, amount_input))?
            .clone();

        tracing::info!(amount_cents, balance = self.state.balance(), "income recorded");
        self.persist().await?;
        Ok(self.record_result(transaction))
    }

    /// Record an expense parsed from user input.
    /// Fails if the current balance does not cover it.
    pub async fn record_expense(
        &mut self,
        amount_input: &str,
        description: &str,
    ) -> Result<RecordResult, AppError> {
        let amount_cents = parse_positive_amount(amount_input)?;
        let transaction = self
            .state
            .debit(amount_cents, description, now())
            .map_err(|e| balance_error(e, amount_input))?
            .clone();

        tracing::info!(amount_cents, balance = self.state.balance(), "expense recorded");
        self.persist().await?;
        Ok(self.record_result(transaction))
    }

    /// Wipe balance and history if `confirmation` is exactly
    /// [`RESET_CONFIRMATION`].
    pub async fn reset(&mut self, confirmation: &str) -> Result<ResetOutcome, AppError> {
        if confirmation != RESET_CONFIRMATION {
            tracing::debug!("reset declined");
            return Ok(ResetOutcome::Declined);
        }

        self.state.clear();
        tracing::info!("ledger reset");
        self.persist().await?;
        Ok(ResetOutcome::Cleared)
    }

    // ========================
    // Queries
    // ========================

    /// Current balance formatted for display.
    pub fn current_balance(&self) -> String {
        format_rupiah(self.state.balance())
    }

    pub fn balance_cents(&self) -> Cents {
        self.state.balance()
    }

    /// Transactions of `filter` kind (all when `None`) in the order they were
    /// recorded. Calling it again restarts from the first entry.
    pub fn history(
        &self,
        filter: Option<TransactionKind>,
    ) -> impl Iterator<Item = &Transaction> + Clone {
        self.state.transactions(filter)
    }

    /// Flat income/expense sums over the filtered history.
    pub fn totals(&self, filter: Option<TransactionKind>) -> Totals {
        summarize(self.history(filter))
    }

    async fn persist(&self) -> Result<(), AppError> {
        if let Err(err) = self.store.save(&self.state).await {
            tracing::error!("failed to save ledger: {:#}", err);
            return Err(AppError::PersistenceFailure(err));
        }
        Ok(())
    }

    fn record_result(&self, transaction: Transaction) -> RecordResult {
        RecordResult {
            amount: format_rupiah(transaction.amount_cents),
            balance: self.current_balance(),
            transaction,
        }
    }
}

/// Parse user input into a strictly positive amount.
pub fn parse_positive_amount(input: &str) -> Result<Cents, AppError> {
    let amount_cents =
        parse_amount(input).map_err(|e| AppError::InvalidAmount(format!("'{}': {}", input, e)))?;
    if amount_cents <= 0 {
        return Err(AppError::InvalidAmount(format!(
            "'{}': amount must be positive",
            input
        )));
    }
    Ok(amount_cents)
}

fn balance_error(err: BalanceError, input: &str) -> AppError {
    match err {
        BalanceError::Insufficient { balance, required } => {
            AppError::InsufficientBalance { balance, required }
        }
        BalanceError::NonPositiveAmount(_) | BalanceError::Overflow => {
            AppError::InvalidAmount(format!("'{}': {}", input, err))
        }
    }
}

/// Local wall-clock time, truncated to microseconds to match the precision
/// of the store file.
fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(6)
}
