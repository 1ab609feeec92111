//! Storage engines that hold per-ledger data next to the metadata store.
//!
//! The block store, state database, history database and bookkeeper are
//! separate engines. The lifecycle controller only needs two capabilities from
//! them: lay down an empty area for a new ledger, and purge everything a
//! ledger owns.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::LedgerConfig;

use super::error::StepError;

/// A storage engine holding data for many ledgers
pub trait LedgerDataStore: Send + Sync {
    /// Short name used in logs and error messages
    fn name(&self) -> &str;

    /// Prepare storage for a newly created ledger
    fn initialize(&self, ledger_id: &str) -> io::Result<()>;

    /// Remove every byte owned by `ledger_id`; purging nothing is success
    fn purge(&self, ledger_id: &str) -> io::Result<()>;
}

/// Engine keeping one directory per ledger under a common root
#[derive(Debug, Clone)]
pub struct DirectoryDataStore {
    name: String,
    root: PathBuf,
    enabled: bool,
}

impl DirectoryDataStore {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            enabled: true,
        }
    }

    /// A disabled store creates nothing for new ledgers but still purges
    /// data left over from when it was enabled
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn ledger_dir(&self, ledger_id: &str) -> PathBuf {
        self.root.join(ledger_id)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl LedgerDataStore for DirectoryDataStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&self, ledger_id: &str) -> io::Result<()> {
        if !self.enabled {
            debug!(store = %self.name, ledger_id, "Store disabled, skipping initialization");
            return Ok(());
        }
        std::fs::create_dir_all(self.ledger_dir(ledger_id))
    }

    fn purge(&self, ledger_id: &str) -> io::Result<()> {
        let dir = self.ledger_dir(ledger_id);
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => {
                debug!(store = %self.name, path = %dir.display(), "Removed ledger data");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// The set of engines whose data follows a ledger's lifecycle
#[derive(Clone, Default)]
pub struct DataStores {
    stores: Vec<Arc<dyn LedgerDataStore>>,
}

impl DataStores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block store, state database, history database and bookkeeper laid out
    /// under the configured storage root
    pub fn from_config(ledger: &LedgerConfig) -> Self {
        let mut stores = Self::new();
        stores.register(Arc::new(DirectoryDataStore::new(
            "blockStore",
            ledger.block_store_path(),
        )));
        stores.register(Arc::new(DirectoryDataStore::new(
            "stateDb",
            ledger.state_db_path(),
        )));
        stores.register(Arc::new(
            DirectoryDataStore::new("historyDb", ledger.history_db_path())
                .enabled(ledger.history.enabled),
        ));
        stores.register(Arc::new(DirectoryDataStore::new(
            "bookkeeper",
            ledger.bookkeeper_path(),
        )));
        stores
    }

    pub fn register(&mut self, store: Arc<dyn LedgerDataStore>) {
        self.stores.push(store);
    }

    pub fn names(&self) -> Vec<&str> {
        self.stores.iter().map(|s| s.name()).collect()
    }

    pub fn initialize_all(&self, ledger_id: &str) -> Result<(), StepError> {
        for store in &self.stores {
            store
                .initialize(ledger_id)
                .map_err(|source| StepError::Initialize {
                    store: store.name().to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Purge `ledger_id` from every engine, stopping at the first failure
    pub fn purge_all(&self, ledger_id: &str) -> Result<(), StepError> {
        for store in &self.stores {
            store.purge(ledger_id).map_err(|source| StepError::Purge {
                store: store.name().to_string(),
                source,
            })?;
            info!(store = store.name(), ledger_id, "Purged ledger data");
        }
        Ok(())
    }
}
