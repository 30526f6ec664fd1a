//! Command-line host for PagePal read-aloud.

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

pub use bootstrap::{CliContext, bootstrap, resolve_settings};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
