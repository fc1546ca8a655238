use anyhow::Result;
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::{TransactionKind, format_decimal};

/// Timestamp layout used in exported rows.
const EXPORT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Exporter for writing the ledger history to CSV
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export the (optionally filtered) history to CSV.
    /// Returns the number of rows written, header excluded.
    pub fn export_history_csv<W: Write>(
        &self,
        writer: W,
        filter: Option<TransactionKind>,
    ) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["no", "time", "type", "amount", "description"])?;

        let mut count = 0;
        for tx in self.service.history(filter) {
            count += 1;
            csv_writer.write_record([
                count.to_string(),
                tx.timestamp.format(EXPORT_TIME_FORMAT).to_string(),
                tx.kind.label().to_string(),
                format_decimal(tx.amount_cents),
                tx.description.clone(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(count)
    }
}
