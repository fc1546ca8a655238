mod menu;
mod presenter;

pub use menu::*;
pub use presenter::*;

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::tty::IsTty;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use crate::application::LedgerService;
use crate::domain::TransactionKind;
use crate::io::Exporter;

/// Saku - Pocket Money Ledger
#[derive(Parser)]
#[command(name = "saku")]
#[command(about = "Record pocket-money income and expenses against a running balance")]
#[command(version)]
pub struct Cli {
    /// Ledger file path
    #[arg(short, long, env = "SAKU_FILE", default_value = "saku.json")]
    pub file: PathBuf,

    /// Disable colored output
    #[arg(long, global = true)]
    pub plain: bool,

    /// Enable verbose logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run (defaults to the interactive menu)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive menu
    Menu,

    /// Show the current balance
    Balance,

    /// Show the transaction history
    History {
        /// Only show one kind: income, expense
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Export the transaction history to CSV
    Export {
        /// Only export one kind: income, expense
        #[arg(short, long)]
        kind: Option<String>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        init_tracing(self.verbose);

        let mut service = LedgerService::open(&self.file).await;
        let interactive = io::stdout().is_tty();
        let presenter = Presenter::new(!self.plain && interactive, interactive);

        match self.command.unwrap_or(Commands::Menu) {
            Commands::Menu => {
                let input = BufReader::new(tokio::io::stdin());
                Menu::new(&mut service, presenter, input, io::stdout())
                    .run()
                    .await?;
            }

            Commands::Balance => {
                presenter.balance(&mut io::stdout(), &service.current_balance())?;
            }

            Commands::History { kind } => {
                let filter = parse_kind(kind.as_deref())?;
                presenter.history(
                    &mut io::stdout(),
                    filter,
                    service.history(filter),
                    service.totals(filter),
                    &service.current_balance(),
                )?;
            }

            Commands::Export { kind, output } => {
                let filter = parse_kind(kind.as_deref())?;
                run_export_command(&service, filter, output.as_deref())?;
            }
        }

        Ok(())
    }
}

/// Install the stderr log subscriber. `RUST_LOG` takes precedence over
/// `--verbose`.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "saku=debug" } else { "saku=error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn parse_kind(kind: Option<&str>) -> Result<Option<TransactionKind>> {
    kind.map(|k| {
        k.parse::<TransactionKind>()
            .map_err(|e| anyhow::anyhow!("{}. Valid kinds: income, expense", e))
    })
    .transpose()
}

fn run_export_command(
    service: &LedgerService,
    filter: Option<TransactionKind>,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Box::new(file)
        }
        None => Box::new(io::stdout()),
    };

    let count = Exporter::new(service).export_history_csv(writer, filter)?;
    if output.is_some() {
        eprintln!("Exported {} transactions", count);
    }
    Ok(())
}
