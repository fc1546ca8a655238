use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail, ensure};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{
    LedgerState, Transaction, TransactionKind, cents_to_units, compute_balance, units_to_cents,
};

/// ISO-8601 local datetime without offset; fractional seconds only when present.
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// On-disk layout of the ledger file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredState {
    #[serde(default)]
    saldo: f64,
    #[serde(default)]
    history: Vec<StoredTransaction>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredTransaction {
    #[serde(rename = "type")]
    kind: String,
    amount: f64,
    #[serde(default)]
    description: String,
    time: String,
}

/// Result of loading the ledger file.
#[derive(Debug)]
pub struct Loaded {
    pub state: LedgerState,
    /// Why the stored data was discarded, if it was.
    pub recovered: Option<String>,
}

/// JSON file holding the full ledger state.
/// Every save rewrites the whole file.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the ledger file.
    /// A missing file yields an empty ledger. An unreadable or malformed file
    /// also yields an empty ledger, with the reason in [`Loaded::recovered`].
    pub async fn load(&self) -> Loaded {
        tracing::debug!(path = %self.path.display(), "loading ledger");

        match self.read_state().await {
            Ok(Some(state)) => Loaded {
                state,
                recovered: None,
            },
            Ok(None) => {
                tracing::debug!("ledger file not found, starting empty");
                Loaded {
                    state: LedgerState::new(),
                    recovered: None,
                }
            }
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "discarding unreadable ledger file: {:#}",
                    err
                );
                Loaded {
                    state: LedgerState::new(),
                    recovered: Some(format!("{:#}", err)),
                }
            }
        }
    }

    async fn read_state(&self) -> Result<Option<LedgerState>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err).context("Failed to read ledger file"),
        };

        let stored: StoredState =
            serde_json::from_str(&raw).context("Ledger file is not valid ledger JSON")?;
        decode_state(stored).map(Some)
    }

    /// Write the full state, replacing the previous file.
    /// The data goes to a sibling temporary file first and is then renamed
    /// over the target, so a crash mid-write leaves the old file intact.
    pub async fn save(&self, state: &LedgerState) -> Result<()> {
        let json = serde_json::to_string_pretty(&encode_state(state))
            .context("Failed to serialize ledger")?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        tracing::debug!(
            path = %self.path.display(),
            transactions = state.history().len(),
            "ledger saved"
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn encode_state(state: &LedgerState) -> StoredState {
    StoredState {
        saldo: cents_to_units(state.balance()),
        history: state
            .history()
            .iter()
            .map(|tx| StoredTransaction {
                kind: tx.kind.label().to_string(),
                amount: cents_to_units(tx.amount_cents),
                description: tx.description.clone(),
                time: tx.timestamp.format(TIME_FORMAT).to_string(),
            })
            .collect(),
    }
}

fn decode_state(stored: StoredState) -> Result<LedgerState> {
    let balance = units_to_cents(stored.saldo)
        .with_context(|| format!("Invalid saldo: {}", stored.saldo))?;
    ensure!(balance >= 0, "Negative saldo: {}", stored.saldo);

    let history = stored
        .history
        .into_iter()
        .enumerate()
        .map(|(i, tx)| {
            decode_transaction(tx).with_context(|| format!("Invalid history entry {}", i + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    let Some(computed) = compute_balance(&history) else {
        bail!("History amounts overflow when summed");
    };
    if computed != balance {
        tracing::warn!(
            stored = balance,
            computed,
            "saldo does not match history, keeping stored saldo"
        );
    }

    Ok(LedgerState::from_parts(balance, history))
}

fn decode_transaction(stored: StoredTransaction) -> Result<Transaction> {
    let Some(kind) = TransactionKind::from_label(&stored.kind) else {
        bail!("Unknown transaction type: {}", stored.kind);
    };

    let amount_cents = units_to_cents(stored.amount)
        .with_context(|| format!("Invalid amount: {}", stored.amount))?;
    ensure!(amount_cents > 0, "Non-positive amount: {}", stored.amount);

    let timestamp: NaiveDateTime = stored
        .time
        .parse()
        .with_context(|| format!("Invalid time: {}", stored.time))?;

    // Built directly so stored descriptions round-trip byte for byte
    Ok(Transaction {
        kind,
        amount_cents,
        description: stored.description,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 8, 17)
            .unwrap()
            .and_hms_micro_opt(10, 0, second, 250_000)
            .unwrap()
    }

    #[test]
    fn test_encode_uses_store_labels_and_units() {
        let mut state = LedgerState::new();
        state.credit(150_050, "gaji", at(0)).unwrap();

        let stored = encode_state(&state);

        assert_eq!(stored.saldo, 1500.5);
        assert_eq!(stored.history[0].kind, "Pemasukan");
        assert_eq!(stored.history[0].amount, 1500.5);
        assert_eq!(stored.history[0].time, "2024-08-17T10:00:00.250");
    }

    #[test]
    fn test_decode_roundtrip() {
        let mut state = LedgerState::new();
        state.credit(1_000_000, "a", at(0)).unwrap();
        state.debit(250_025, "b", at(1)).unwrap();

        let decoded = decode_state(encode_state(&state)).unwrap();

        assert_eq!(decoded, state);
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let stored = StoredState {
            saldo: 10.0,
            history: vec![StoredTransaction {
                kind: "Transfer".into(),
                amount: 10.0,
                description: String::new(),
                time: "2024-01-01T00:00:00".into(),
            }],
        };

        assert!(decode_state(stored).is_err());
    }

    #[test]
    fn test_decode_rejects_non_positive_amount() {
        let stored = StoredState {
            saldo: 0.0,
            history: vec![StoredTransaction {
                kind: "Pemasukan".into(),
                amount: 0.0,
                description: String::new(),
                time: "2024-01-01T00:00:00".into(),
            }],
        };

        assert!(decode_state(stored).is_err());
    }

    #[test]
    fn test_decode_rejects_negative_saldo() {
        let stored = StoredState {
            saldo: -1.0,
            history: Vec::new(),
        };

        assert!(decode_state(stored).is_err());
    }

    #[test]
    fn test_decode_rejects_overflowing_history() {
        let entry = || StoredTransaction {
            kind: "Pemasukan".into(),
            amount: 9e16,
            description: String::new(),
            time: "2024-01-01T00:00:00".into(),
        };
        let stored = StoredState {
            saldo: 0.0,
            history: vec![entry(), entry()],
        };

        assert!(decode_state(stored).is_err());
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let store = Store::new("/data/saku.json");
        assert_eq!(store.temp_path(), PathBuf::from("/data/saku.json.tmp"));
    }
}
