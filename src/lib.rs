//! Tracks a set of chain addresses, their native-token balances, and keeps the
//! set registered in a remote address registry.

pub mod address;
pub mod capability;
pub mod chain;
pub mod config;
pub mod presenter;
pub mod registry;
pub mod tracker;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;
