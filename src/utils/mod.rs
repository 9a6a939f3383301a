//!
//! Utility module for balance display.
//!
//! Re-exports formatting helpers used by the presenter and the CLI.
/// Fixed-point formatting for token amounts and addresses
pub mod format;

pub use format::{checked_exp10, format_token_amount, shorten_address};
