//! Command handlers.
//!
//! Each handler parses CLI-specific input, calls into the core or voice
//! crate, and formats the result for the terminal.

pub mod clean;
pub mod intent;
pub mod speak;
