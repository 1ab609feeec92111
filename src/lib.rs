pub mod api;
pub mod commands;
pub mod config;
pub mod ledger;
pub mod lifecycle;
pub mod lock;
pub mod observability;
pub mod provider;
