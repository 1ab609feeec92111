use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Directory under the root that holds everything the ledger engine owns
const LEDGERS_DATA_DIR: &str = "ledgersData";

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Storage engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
    /// Storage root shared by the lock, the metadata store and the data stores
    #[serde(default = "default_root_fs_path")]
    pub root_fs_path: PathBuf,
    #[serde(default)]
    pub history: HistoryConfig,
}

/// History database toggle
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_enabled")]
    pub enabled: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            root_fs_path: default_root_fs_path(),
            history: HistoryConfig::default(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_history_enabled(),
        }
    }
}

impl LedgerConfig {
    /// Build a config rooted at `root` with every other setting defaulted
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root_fs_path: root.into(),
            ..Self::default()
        }
    }

    pub fn ledgers_data_dir(&self) -> PathBuf {
        self.root_fs_path.join(LEDGERS_DATA_DIR)
    }

    /// Lock file guarding exclusive access to the storage root
    pub fn lock_path(&self) -> PathBuf {
        self.ledgers_data_dir().join("fileLock")
    }

    /// Fjall keyspace holding the ledger metadata records
    pub fn provider_path(&self) -> PathBuf {
        self.ledgers_data_dir().join("ledgerProvider")
    }

    pub fn block_store_path(&self) -> PathBuf {
        self.ledgers_data_dir().join("chains")
    }

    pub fn state_db_path(&self) -> PathBuf {
        self.ledgers_data_dir().join("stateDb")
    }

    pub fn history_db_path(&self) -> PathBuf {
        self.ledgers_data_dir().join("historyDb")
    }

    pub fn bookkeeper_path(&self) -> PathBuf {
        self.ledgers_data_dir().join("bookkeeper")
    }
}

fn default_root_fs_path() -> PathBuf {
    PathBuf::from("data/production")
}

fn default_history_enabled() -> bool {
    true
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 7051))
}
