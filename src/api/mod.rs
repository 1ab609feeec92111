//! HTTP surface of the ledger server
//!
//! The server owns a [`LedgerProvider`](crate::provider::LedgerProvider) for
//! its whole run; these routes only read and create ledgers. Unjoin is an
//! offline operation and has no route.

pub mod error;
pub mod models;
mod server;
pub mod services;
pub mod state;

pub use server::{router, run};
