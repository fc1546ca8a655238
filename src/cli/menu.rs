use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::application::LedgerService;
use crate::domain::TransactionKind;

use super::Presenter;

/// One entry of the interactive menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    AddIncome,
    AddExpense,
    ShowBalance,
    History(Option<TransactionKind>),
    Reset,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::AddIncome),
            "2" => Some(MenuChoice::AddExpense),
            "3" => Some(MenuChoice::ShowBalance),
            "4" => Some(MenuChoice::History(Some(TransactionKind::Income))),
            "5" => Some(MenuChoice::History(Some(TransactionKind::Expense))),
            "6" => Some(MenuChoice::History(None)),
            "7" => Some(MenuChoice::Reset),
            "8" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Interactive menu loop over a line-based input and a terminal-like output.
/// Runs one command to completion before reading the next choice.
pub struct Menu<'a, R, W> {
    service: &'a mut LedgerService,
    presenter: Presenter,
    input: R,
    output: W,
}

impl<'a, R, W> Menu<'a, R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(service: &'a mut LedgerService, presenter: Presenter, input: R, output: W) -> Self {
        Self {
            service,
            presenter,
            input,
            output,
        }
    }

    /// Loop until the user exits or the input ends.
    pub async fn run(mut self) -> Result<()> {
        loop {
            self.presenter.clear_screen(&mut self.output)?;
            self.presenter.menu(&mut self.output)?;

            let Some(choice) = self.prompt("Pilih menu (1-8): ").await? else {
                break;
            };

            match MenuChoice::parse(&choice) {
                Some(MenuChoice::Exit) => {
                    self.presenter.farewell(&mut self.output)?;
                    break;
                }
                Some(choice) => self.handle(choice).await?,
                None => self
                    .presenter
                    .warning(&mut self.output, "Pilihan tidak valid. Silakan pilih 1-8.")?,
            }

            if !self.pause().await? {
                break;
            }
        }

        self.output.flush()?;
        Ok(())
    }

    async fn handle(&mut self, choice: MenuChoice) -> Result<()> {
        match choice {
            MenuChoice::AddIncome => self.record(TransactionKind::Income).await,
            MenuChoice::AddExpense => self.record(TransactionKind::Expense).await,
            MenuChoice::ShowBalance => {
                let balance = self.service.current_balance();
                self.presenter.balance(&mut self.output, &balance)?;
                Ok(())
            }
            MenuChoice::History(filter) => {
                let balance = self.service.current_balance();
                self.presenter.history(
                    &mut self.output,
                    filter,
                    self.service.history(filter),
                    self.service.totals(filter),
                    &balance,
                )?;
                Ok(())
            }
            MenuChoice::Reset => self.reset().await,
            MenuChoice::Exit => Ok(()),
        }
    }

    async fn record(&mut self, kind: TransactionKind) -> Result<()> {
        let label = match kind {
            TransactionKind::Income => "Masukkan jumlah pemasukan (Rp): ",
            TransactionKind::Expense => "Masukkan jumlah pengeluaran (Rp): ",
        };
        let amount = self.prompt(label).await?.unwrap_or_default();
        let description = self
            .prompt("Keterangan (opsional): ")
            .await?
            .unwrap_or_default();

        let result = match kind {
            TransactionKind::Income => self.service.record_income(&amount, &description).await,
            TransactionKind::Expense => self.service.record_expense(&amount, &description).await,
        };

        match result {
            Ok(recorded) => self.presenter.recorded(&mut self.output, &recorded)?,
            Err(err) => self.presenter.app_error(&mut self.output, &err)?,
        }
        Ok(())
    }

    async fn reset(&mut self) -> Result<()> {
        self.presenter.warning(
            &mut self.output,
            "Semua saldo dan riwayat akan dihapus permanen.",
        )?;
        let confirmation = self
            .prompt("Ketik YA untuk melanjutkan: ")
            .await?
            .unwrap_or_default();

        match self.service.reset(&confirmation).await {
            Ok(outcome) => self.presenter.reset(&mut self.output, outcome)?,
            Err(err) => self.presenter.app_error(&mut self.output, &err)?,
        }
        Ok(())
    }

    /// Wait for Enter. Returns false when the input has ended.
    async fn pause(&mut self) -> Result<bool> {
        Ok(self
            .prompt("\nTekan Enter untuk kembali ke menu...")
            .await?
            .is_some())
    }

    /// Print `label` and read one line, trimmed. `None` means end of input.
    async fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .await
            .context("Failed to read input")?;
        if read == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }

        Ok(Some(line.trim().to_string()))
    }
}
