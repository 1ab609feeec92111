/// Fjall-based persistence for ledger metadata records
///
/// Every ledger known to the storage engine has exactly one record in the
/// `metadata` partition, keyed by `metadata_{ledger_id}` and holding a
/// protobuf-encoded [`LedgerMetadata`]. Creating a ledger inserts the record,
/// unjoining it removes the record, so [`MetadataStore::list`] is the single
/// source of truth for which ledgers exist.
///
/// A second partition, `unjoined`, journals ledgers that were removed so that a
/// repeated unjoin can succeed quietly instead of reporting a missing ledger.
///
/// The store can only be opened by the holder of the storage root's
/// [`ExclusiveLock`](crate::lock::ExclusiveLock).
///
/// ## Usage
///
/// ```rust,ignore
/// use ledgerd::ledger::{MetadataStore, Status};
/// use ledgerd::lock::ExclusiveLock;
///
/// let lock = ExclusiveLock::acquire(config.ledger.lock_path())?;
/// let store = MetadataStore::open(config.ledger.provider_path(), &lock)?;
/// store.update_ledger_status("mychannel", Status::UnderDeletion)?;
/// ```

pub mod error;
pub mod keys;
pub mod metadata;
pub mod store;

pub use error::{LedgerError, Result};
pub use metadata::{LedgerMetadata, Status};
pub use store::{MetadataStore, StatusChange};
