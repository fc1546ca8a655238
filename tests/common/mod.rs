// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::PathBuf;

use saku::application::LedgerService;
use tempfile::TempDir;

/// Path of the ledger file inside a temporary directory
pub fn ledger_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("saku.json")
}

/// Helper to create a test service backed by a fresh temporary ledger file
pub async fn test_service() -> anyhow::Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = LedgerService::open(ledger_path(&temp_dir)).await;
    Ok((service, temp_dir))
}

/// Reopen the ledger file the way a new process would
pub async fn reopen(temp_dir: &TempDir) -> LedgerService {
    LedgerService::open(ledger_path(temp_dir)).await
}

/// Write raw contents to the ledger file
pub fn write_ledger_file(temp_dir: &TempDir, contents: &str) -> anyhow::Result<()> {
    std::fs::write(ledger_path(temp_dir), contents)?;
    Ok(())
}
