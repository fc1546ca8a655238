// Application layer - the ledger use cases every client (menu, subcommands,
// export) goes through.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
