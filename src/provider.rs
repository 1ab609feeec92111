//! Ledger provider used by the long-running server.
//!
//! Opening a provider takes the storage root's exclusive lock and keeps it
//! until the provider is closed or dropped, which is what keeps maintenance
//! commands such as unjoin away while the server runs.

use std::sync::Mutex;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::LedgerConfig;
use crate::ledger::{LedgerError, LedgerMetadata, MetadataStore, Status};
use crate::lifecycle::{DataStores, StepError, remove_ledger};
use crate::lock::{ExclusiveLock, LockError};

/// Longest ledger ID accepted at creation
const MAX_LEDGER_ID_LEN: usize = 249;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(
        "as another peer node command is executing, wait for that command to complete its execution or terminate it before retrying"
    )]
    Busy(#[source] LockError),

    #[error(transparent)]
    Lock(LockError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Create ledger [{ledger_id}]: {source}")]
    Create {
        ledger_id: String,
        #[source]
        source: StepError,
    },

    #[error("Recover ledger [{ledger_id}]: {source}")]
    Recover {
        ledger_id: String,
        #[source]
        source: StepError,
    },
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// What opening found in the metadata store
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryStats {
    /// Unfinished creations that were rolled back
    pub rolled_back: usize,
    /// Ledgers under deletion, left for the next unjoin
    pub pending_unjoins: usize,
}

/// Open handle on a storage root owned by the server
pub struct LedgerProvider {
    // Field order matters: the store must close before the lock is released
    store: MetadataStore,
    stores: DataStores,
    create_guard: Mutex<()>,
    recovery: RecoveryStats,
    lock: ExclusiveLock,
}

impl LedgerProvider {
    /// Lock the storage root, open the metadata store and roll back any
    /// creation that was interrupted
    pub fn open(config: &LedgerConfig) -> Result<Self> {
        Self::open_with_stores(config, DataStores::from_config(config))
    }

    pub fn open_with_stores(config: &LedgerConfig, stores: DataStores) -> Result<Self> {
        let lock = ExclusiveLock::acquire(config.lock_path()).map_err(|e| match e {
            LockError::AlreadyLocked(_) => ProviderError::Busy(e),
            other => ProviderError::Lock(other),
        })?;
        let store = MetadataStore::open(config.provider_path(), &lock)?;

        let mut provider = Self {
            store,
            stores,
            create_guard: Mutex::new(()),
            recovery: RecoveryStats::default(),
            lock,
        };
        provider.recovery = provider.recover()?;

        info!(
            root = %config.root_fs_path.display(),
            rolled_back = provider.recovery.rolled_back,
            pending_unjoins = provider.recovery.pending_unjoins,
            "Ledger provider opened"
        );
        Ok(provider)
    }

    fn recover(&self) -> Result<RecoveryStats> {
        let mut stats = RecoveryStats::default();

        for ledger_id in self.store.list()? {
            let status = match self.store.get(&ledger_id) {
                Ok(metadata) => metadata.status(),
                Err(e) if e.is_corruption() => {
                    error!(ledger_id = %ledger_id, error = %e, "Skipping ledger with unreadable metadata");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let recover_err = |source| ProviderError::Recover {
                ledger_id: ledger_id.clone(),
                source,
            };

            match status {
                Status::Active => {}
                Status::UnderConstruction => {
                    warn!(ledger_id = %ledger_id, "Rolling back ledger whose creation did not complete");
                    remove_ledger(&self.store, &self.stores, &ledger_id, false)
                        .map_err(recover_err)?;
                    stats.rolled_back += 1;
                }
                // Only unjoin removes these; the record stays until it runs
                Status::UnderDeletion => {
                    warn!(ledger_id = %ledger_id, "Ledger is under deletion, run unjoin to finish removing it");
                    stats.pending_unjoins += 1;
                }
            }
        }

        Ok(stats)
    }

    /// Create a ledger from its genesis block
    ///
    /// The record passes through `UNDER_CONSTRUCTION` while the data stores
    /// are initialized. A failed initialization is rolled back at once; a
    /// crash in between is rolled back on the next open.
    pub fn create_from_genesis(&self, ledger_id: &str) -> Result<LedgerMetadata> {
        validate_ledger_id(ledger_id)?;

        let _guard = self
            .create_guard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match self.store.get(ledger_id) {
            Ok(_) => return Err(LedgerError::AlreadyExists(ledger_id.to_string()).into()),
            Err(LedgerError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        self.store
            .put(ledger_id, &LedgerMetadata::new(Status::UnderConstruction))?;
        self.store.persist()?;

        if let Err(source) = self.stores.initialize_all(ledger_id) {
            warn!(ledger_id, error = %source, "Ledger initialization failed, rolling back");
            if let Err(e) = remove_ledger(&self.store, &self.stores, ledger_id, false) {
                error!(ledger_id, error = %e, "Rollback of failed creation did not complete");
            }
            return Err(ProviderError::Create {
                ledger_id: ledger_id.to_string(),
                source,
            });
        }

        self.store.update_ledger_status(ledger_id, Status::Active)?;
        self.store.clear_unjoined(ledger_id)?;
        self.store.persist()?;

        info!(ledger_id, "Created ledger from genesis");
        Ok(self.store.get(ledger_id)?)
    }

    /// IDs of active ledgers, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let mut active = Vec::new();

        for ledger_id in self.store.list()? {
            match self.store.get(&ledger_id) {
                Ok(metadata) if metadata.status() == Status::Active => active.push(ledger_id),
                Ok(_) => {}
                Err(e) if e.is_corruption() => {
                    warn!(ledger_id = %ledger_id, error = %e, "Ledger metadata unreadable, not listing");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(active)
    }

    pub fn metadata(&self, ledger_id: &str) -> Result<LedgerMetadata> {
        Ok(self.store.get(ledger_id)?)
    }

    pub fn recovery_stats(&self) -> RecoveryStats {
        self.recovery
    }

    /// Flush and release the storage root
    pub fn close(self) -> Result<()> {
        self.store.persist()?;
        info!(lock = %self.lock.path().display(), "Closing ledger provider");
        Ok(())
    }
}

/// Lowercase letter first, then lowercase alphanumerics, `.`, `-` or `_`
pub fn validate_ledger_id(ledger_id: &str) -> std::result::Result<(), LedgerError> {
    let invalid = |reason: &str| LedgerError::InvalidLedgerId {
        ledger_id: ledger_id.to_string(),
        reason: reason.to_string(),
    };

    let mut chars = ledger_id.chars();
    match chars.next() {
        None => return Err(invalid("ledger ID is empty")),
        Some(c) if !c.is_ascii_lowercase() => {
            return Err(invalid("must start with a lowercase letter"));
        }
        Some(_) => {}
    }

    if ledger_id.len() > MAX_LEDGER_ID_LEN {
        return Err(invalid("longer than 249 characters"));
    }

    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '-' | '_')) {
        return Err(invalid(
            "only lowercase alphanumerics, '.', '-' and '_' are allowed",
        ));
    }

    Ok(())
}
