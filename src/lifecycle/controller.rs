use tracing::{info, warn};

use crate::config::{Config, LedgerConfig};
use crate::ledger::{MetadataStore, Status, StatusChange};
use crate::lock::{ExclusiveLock, LockError};

use super::error::{LifecycleError, Result, StepError};
use super::stores::DataStores;

/// Administrative operations on ledgers of one storage root
///
/// Each operation takes the storage root's exclusive lock for its own
/// duration only; nothing is held between calls.
pub struct LifecycleController {
    config: LedgerConfig,
    stores: DataStores,
}

impl LifecycleController {
    /// Controller over the data stores laid out by `config`
    pub fn new(config: &LedgerConfig) -> Self {
        Self::with_stores(config, DataStores::from_config(config))
    }

    pub fn with_stores(config: &LedgerConfig, stores: DataStores) -> Self {
        Self {
            config: config.clone(),
            stores,
        }
    }

    /// Remove a ledger: mark it under deletion, purge its data, drop its record
    ///
    /// Unjoining a ledger that was already unjoined succeeds without doing
    /// anything. A ledger left under deletion by an interrupted unjoin is
    /// picked up where it stopped.
    pub fn unjoin(&self, ledger_id: &str) -> Result<()> {
        if ledger_id.is_empty() {
            return Err(LifecycleError::MissingLedgerId);
        }

        let wrap = |source: StepError| LifecycleError::Unjoin {
            ledger_id: ledger_id.to_string(),
            source,
        };

        let lock = self.acquire(wrap)?;
        let store = MetadataStore::open(self.config.provider_path(), &lock)
            .map_err(|e| wrap(e.into()))?;

        let change = store
            .update_ledger_status(ledger_id, Status::UnderDeletion)
            .map_err(|e| wrap(e.into()))?;

        match change {
            StatusChange::AlreadyUnjoined => {
                info!(ledger_id, "Channel already unjoined, nothing to do");
                return Ok(());
            }
            StatusChange::Updated {
                from: Status::UnderDeletion,
                ..
            } => {
                warn!(ledger_id, "Resuming interrupted unjoin");
            }
            StatusChange::Updated { from, .. } => {
                info!(ledger_id, %from, "Marked channel for deletion");
            }
        }
        store.persist().map_err(|e| wrap(e.into()))?;

        remove_ledger(&store, &self.stores, ledger_id, true).map_err(wrap)?;

        info!(ledger_id, "Unjoined channel");
        Ok(())
    }

    /// Set the status of an existing ledger, under the lock
    pub fn update_status(&self, ledger_id: &str, status: Status) -> Result<StatusChange> {
        if ledger_id.is_empty() {
            return Err(LifecycleError::MissingLedgerId);
        }

        let wrap = |source: StepError| LifecycleError::UpdateStatus {
            ledger_id: ledger_id.to_string(),
            source,
        };

        let lock = self.acquire(wrap)?;
        let store = MetadataStore::open(self.config.provider_path(), &lock)
            .map_err(|e| wrap(e.into()))?;

        let change = store
            .update_ledger_status(ledger_id, status)
            .map_err(|e| wrap(e.into()))?;
        store.persist().map_err(|e| wrap(e.into()))?;

        Ok(change)
    }

    /// Take the lock without waiting; contention is reported as busy
    fn acquire(&self, wrap: impl Fn(StepError) -> LifecycleError) -> Result<ExclusiveLock> {
        match ExclusiveLock::acquire(self.config.lock_path()) {
            Ok(lock) => Ok(lock),
            Err(e @ LockError::AlreadyLocked(_)) => {
                warn!(path = %self.config.lock_path().display(), "Storage root is in use");
                Err(LifecycleError::Busy(e))
            }
            Err(e) => Err(wrap(StepError::Lock(e))),
        }
    }
}

/// Purge a ledger's data and drop its record
///
/// The record must already be under deletion (or under construction when
/// rolling back a failed creation). When `journal` is set the ID is remembered
/// as unjoined.
pub(crate) fn remove_ledger(
    store: &MetadataStore,
    stores: &DataStores,
    ledger_id: &str,
    journal: bool,
) -> std::result::Result<(), StepError> {
    stores.purge_all(ledger_id)?;

    if journal {
        store.retire(ledger_id)?;
    } else {
        store.delete(ledger_id)?;
    }
    store.persist()?;

    info!(ledger_id, journal, "Removed ledger metadata");
    Ok(())
}

/// Unjoin `ledger_id` from the storage root named in `config`
pub fn unjoin_channel(config: &Config, ledger_id: &str) -> Result<()> {
    LifecycleController::new(&config.ledger).unjoin(ledger_id)
}

/// Set the status of `ledger_id` in the storage root named in `config`
pub fn update_ledger_status(config: &Config, ledger_id: &str, status: Status) -> Result<StatusChange> {
    LifecycleController::new(&config.ledger).update_status(ledger_id, status)
}
