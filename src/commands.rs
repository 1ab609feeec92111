//! Maintenance commands run by the `ledgerd` binary.
//!
//! Each command takes the loaded [`Config`] explicitly and the raw flag
//! values as parsed by the CLI, so input checks happen here before any
//! storage is touched.

use tracing::info;

use crate::config::Config;
use crate::ledger::{Status, StatusChange};
use crate::lifecycle::{self, LifecycleError};
use crate::provider::{LedgerProvider, ProviderError};

fn require_channel_id(channel_id: Option<&str>) -> Result<&str, LifecycleError> {
    channel_id
        .filter(|id| !id.is_empty())
        .ok_or(LifecycleError::MissingLedgerId)
}

/// `ledgerd unjoin -c <channel>`; the server must be stopped
pub fn unjoin(config: &Config, channel_id: Option<&str>) -> Result<(), LifecycleError> {
    let channel_id = require_channel_id(channel_id)?;
    lifecycle::unjoin_channel(config, channel_id)
}

/// `ledgerd update-status -c <channel> --status <STATUS>`
pub fn update_status(
    config: &Config,
    channel_id: Option<&str>,
    status: Status,
) -> Result<StatusChange, LifecycleError> {
    let channel_id = require_channel_id(channel_id)?;
    let change = lifecycle::update_ledger_status(config, channel_id, status)?;
    info!(channel_id, ?change, "Ledger status updated");
    Ok(change)
}

/// `ledgerd list`: active ledgers in the storage root
pub fn list(config: &Config) -> Result<Vec<String>, ProviderError> {
    let provider = LedgerProvider::open(&config.ledger)?;
    let ledgers = provider.list()?;
    provider.close()?;
    Ok(ledgers)
}
