use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color, Stylize};
use crossterm::terminal::{Clear, ClearType};

use crate::application::{AppError, RecordResult, ResetOutcome};
use crate::domain::{Totals, Transaction, TransactionKind, format_rupiah};

const RULE_WIDTH: usize = 72;
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Renders ledger data for the terminal.
/// The same output is produced with or without colors; `color` only adds
/// ANSI decoration and `clear` only controls screen clearing.
#[derive(Debug, Clone, Copy)]
pub struct Presenter {
    color: bool,
    clear: bool,
}

impl Presenter {
    pub fn new(color: bool, clear: bool) -> Self {
        Self { color, clear }
    }

    /// No colors, no screen clearing. Used for pipes and tests.
    pub fn plain() -> Self {
        Self::new(false, false)
    }

    fn paint(&self, text: String, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text
        }
    }

    fn kind_color(kind: TransactionKind) -> Color {
        match kind {
            TransactionKind::Income => Color::Green,
            TransactionKind::Expense => Color::Red,
        }
    }

    pub fn clear_screen<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.clear {
            queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        Ok(())
    }

    pub fn menu<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let title = self.paint("=== Aplikasi Pengelola Uang Saku ===".to_string(), Color::Cyan);
        writeln!(out, "{}", title)?;
        writeln!(out, "1. Tambah Pemasukan")?;
        writeln!(out, "2. Tambah Pengeluaran")?;
        writeln!(out, "3. Lihat Saldo")?;
        writeln!(out, "4. Riwayat Pemasukan")?;
        writeln!(out, "5. Riwayat Pengeluaran")?;
        writeln!(out, "6. Semua Riwayat")?;
        writeln!(out, "7. Reset Data")?;
        writeln!(out, "8. Keluar")?;
        writeln!(out, "{}", "-".repeat(40))
    }

    pub fn success<W: Write>(&self, out: &mut W, message: &str) -> io::Result<()> {
        writeln!(out, "{}", self.paint(message.to_string(), Color::Green))
    }

    pub fn warning<W: Write>(&self, out: &mut W, message: &str) -> io::Result<()> {
        writeln!(out, "{}", self.paint(message.to_string(), Color::Yellow))
    }

    pub fn error<W: Write>(&self, out: &mut W, message: &str) -> io::Result<()> {
        writeln!(out, "{}", self.paint(message.to_string(), Color::Red))
    }

    pub fn balance<W: Write>(&self, out: &mut W, balance: &str) -> io::Result<()> {
        writeln!(
            out,
            "Saldo saat ini: {}",
            self.paint(balance.to_string(), Color::Cyan)
        )
    }

    pub fn recorded<W: Write>(&self, out: &mut W, result: &RecordResult) -> io::Result<()> {
        let kind = result.transaction.kind;
        let message = match kind {
            TransactionKind::Income => format!("Pemasukan {} berhasil ditambahkan!", result.amount),
            TransactionKind::Expense => {
                format!("Pengeluaran {} berhasil dicatat!", result.amount)
            }
        };
        self.success(out, &message)?;
        writeln!(out, "Saldo sekarang: {}", result.balance)
    }

    pub fn reset<W: Write>(&self, out: &mut W, outcome: ResetOutcome) -> io::Result<()> {
        match outcome {
            ResetOutcome::Cleared => self.success(out, "Semua data berhasil direset."),
            ResetOutcome::Declined => self.warning(out, "Reset dibatalkan."),
        }
    }

    /// Describe a failed ledger operation to the user.
    pub fn app_error<W: Write>(&self, out: &mut W, err: &AppError) -> io::Result<()> {
        match err {
            AppError::InvalidAmount(_) => {
                self.error(out, "Jumlah tidak valid. Masukkan angka lebih dari 0.")
            }
            AppError::InsufficientBalance { balance, required } => self.warning(
                out,
                &format!(
                    "Saldo tidak cukup. Saldo {}, dibutuhkan {}.",
                    format_rupiah(*balance),
                    format_rupiah(*required)
                ),
            ),
            AppError::PersistenceFailure(source) => {
                self.error(out, "Perubahan tercatat, tetapi gagal disimpan ke file.")?;
                writeln!(out, "  {:#}", source)
            }
        }
    }

    /// Print a numbered history table followed by `totals`. `balance` is
    /// shown in the footer of the unfiltered view.
    pub fn history<'t, W: Write>(
        &self,
        out: &mut W,
        filter: Option<TransactionKind>,
        transactions: impl Iterator<Item = &'t Transaction>,
        totals: Totals,
        balance: &str,
    ) -> io::Result<()> {
        let title = match filter {
            Some(TransactionKind::Income) => "Riwayat Pemasukan",
            Some(TransactionKind::Expense) => "Riwayat Pengeluaran",
            None => "Semua Riwayat",
        };
        let rows: Vec<&Transaction> = transactions.collect();

        writeln!(out, "{}", self.paint(format!("=== {} ===", title), Color::Cyan))?;
        if rows.is_empty() {
            return writeln!(out, "Belum ada transaksi.");
        }

        writeln!(
            out,
            "{:<4} {:<16} {:<11} {:>18}  {}",
            "No", "Waktu", "Jenis", "Jumlah", "Keterangan"
        )?;
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;

        for (i, tx) in rows.iter().enumerate() {
            let kind = self.paint(format!("{:<11}", tx.kind.label()), Self::kind_color(tx.kind));
            let amount = self.paint(
                format!("{:>18}", format_rupiah(tx.amount_cents)),
                Self::kind_color(tx.kind),
            );
            writeln!(
                out,
                "{:<4} {:<16} {} {}  {}",
                i + 1,
                tx.timestamp.format(TIME_FORMAT).to_string(),
                kind,
                amount,
                tx.description
            )?;
        }
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;

        match filter {
            Some(TransactionKind::Income) => {
                writeln!(out, "Total pemasukan:   {}", format_rupiah(totals.income))
            }
            Some(TransactionKind::Expense) => {
                writeln!(out, "Total pengeluaran: {}", format_rupiah(totals.expense))
            }
            None => {
                writeln!(out, "Total pemasukan:   {}", format_rupiah(totals.income))?;
                writeln!(out, "Total pengeluaran: {}", format_rupiah(totals.expense))?;
                writeln!(out, "Saldo:             {}", balance)
            }
        }
    }

    pub fn farewell<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Terima kasih telah menggunakan aplikasi!")
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{LedgerState, summarize};

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn sample_state() -> LedgerState {
        let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let mut state = LedgerState::new();
        state
            .credit(1_500_000, "hadiah", day.and_hms_opt(9, 30, 0).unwrap())
            .unwrap();
        state
            .debit(150_050, "", day.and_hms_opt(12, 5, 0).unwrap())
            .unwrap();
        state
    }

    #[test]
    fn test_history_table() {
        let state = sample_state();
        let presenter = Presenter::plain();

        let text = render(|out| {
            let totals = summarize(state.transactions(None));
            presenter.history(out, None, state.transactions(None), totals, "Rp 13.499,50")
        });

        assert!(text.contains("=== Semua Riwayat ==="));
        assert!(text.contains("1    2024-01-15 09:30 Pemasukan"));
        assert!(text.contains("2    2024-01-15 12:05 Pengeluaran"));
        assert!(text.contains("         Rp 15.000  hadiah"));
        assert!(text.contains("Rp 1.500,50  (tanpa keterangan)"));
        assert!(text.contains("Saldo:             Rp 13.499,50"));
    }

    #[test]
    fn test_filtered_history_numbers_from_one() {
        let state = sample_state();
        let presenter = Presenter::plain();
        let filter = Some(TransactionKind::Expense);

        let text = render(|out| {
            let totals = summarize(state.transactions(filter));
            presenter.history(out, filter, state.transactions(filter), totals, "unused")
        });

        assert!(text.contains("=== Riwayat Pengeluaran ==="));
        assert!(text.contains("1    2024-01-15 12:05 Pengeluaran"));
        assert!(!text.contains("Pemasukan  "));
        assert!(text.contains("Total pengeluaran: Rp 1.500,50"));
    }

    #[test]
    fn test_empty_history() {
        let state = LedgerState::new();
        let presenter = Presenter::plain();

        let text = render(|out| {
            presenter.history(out, None, state.transactions(None), Totals::default(), "Rp 0")
        });

        assert!(text.contains("Belum ada transaksi."));
        assert!(!text.contains("Keterangan"));
    }

    #[test]
    fn test_plain_output_has_no_escape_codes() {
        let presenter = Presenter::plain();

        let text = render(|out| {
            presenter.clear_screen(out)?;
            presenter.menu(out)?;
            presenter.balance(out, "Rp 0")
        });

        assert!(!text.contains('\x1b'));
        assert!(text.contains("8. Keluar"));
    }

    #[test]
    fn test_colored_output_keeps_text() {
        let presenter = Presenter::new(true, false);

        let text = render(|out| presenter.success(out, "berhasil"));

        assert!(text.contains('\x1b'));
        assert!(text.contains("berhasil"));
    }

    #[test]
    fn test_persistence_failure_message() {
        let presenter = Presenter::plain();
        let err = AppError::PersistenceFailure(anyhow::anyhow!("disk full"));

        let text = render(|out| presenter.app_error(out, &err));

        assert!(text.contains("Perubahan tercatat, tetapi gagal disimpan ke file."));
        assert!(text.contains("  disk full"));
    }
}
