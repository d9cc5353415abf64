//! Command-line front end: loads a ledger export, hands it to the accounting
//! engine and prints the result.

pub mod cli;
pub mod commands;
pub mod snapshot;

pub use cli::{Cli, Command, OutputFormat};
pub use commands::{Outcome, execute, finish, run};
