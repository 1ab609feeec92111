use std::collections::BTreeSet;
use std::path::Path;

use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle};
use tracing::{debug, info, warn};

use crate::lock::ExclusiveLock;

use super::error::{LedgerError, Result};
use super::keys::{decode_metadata_key, encode_metadata_key, encode_unjoined_key};
use super::metadata::{LedgerMetadata, Status, now_ms};

/// Outcome of a status update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// The record was rewritten
    Updated { from: Status, to: Status },
    /// No record, but the ledger was unjoined earlier; nothing written
    AlreadyUnjoined,
}

/// Fjall-backed store of ledger metadata records
///
/// Opening requires a held [`ExclusiveLock`] so that records are never
/// touched by a process that does not own the storage root.
pub struct MetadataStore {
    keyspace: Keyspace,
    metadata: PartitionHandle,
    unjoined: PartitionHandle,
}

impl MetadataStore {
    /// Open or create the store at `path` on behalf of the lock holder
    pub fn open<P: AsRef<Path>>(path: P, lock: &ExclusiveLock) -> Result<Self> {
        let path = path.as_ref();
        info!(
            path = %path.display(),
            lock = %lock.path().display(),
            "Opening ledger metadata store"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let keyspace = Config::new(path).open()?;
        let metadata = keyspace.open_partition("metadata", PartitionCreateOptions::default())?;
        let unjoined = keyspace.open_partition("unjoined", PartitionCreateOptions::default())?;

        Ok(Self {
            keyspace,
            metadata,
            unjoined,
        })
    }

    /// Fetch the record for `ledger_id`
    pub fn get(&self, ledger_id: &str) -> Result<LedgerMetadata> {
        match self.metadata.get(encode_metadata_key(ledger_id))? {
            Some(value) => LedgerMetadata::decode_record(&value),
            None => Err(LedgerError::NotFound(ledger_id.to_string())),
        }
    }

    /// Insert or overwrite the record for `ledger_id`
    pub fn put(&self, ledger_id: &str, metadata: &LedgerMetadata) -> Result<()> {
        self.metadata
            .insert(encode_metadata_key(ledger_id), metadata.encode_record())?;
        debug!(ledger_id, status = metadata.status, "Stored ledger metadata");
        Ok(())
    }

    /// Remove the record for `ledger_id`; absent records are fine
    pub fn delete(&self, ledger_id: &str) -> Result<()> {
        self.metadata.remove(encode_metadata_key(ledger_id))?;
        debug!(ledger_id, "Deleted ledger metadata");
        Ok(())
    }

    /// IDs of every ledger that has a record, whatever its status
    pub fn list(&self) -> Result<BTreeSet<String>> {
        let mut ids = BTreeSet::new();

        for item in self.metadata.iter() {
            let (key, _) = item?;
            match decode_metadata_key(&key) {
                Some(ledger_id) => {
                    ids.insert(ledger_id);
                }
                None => warn!(
                    key = %String::from_utf8_lossy(&key),
                    "Skipping unrecognized key in metadata partition"
                ),
            }
        }

        Ok(ids)
    }

    /// Move `ledger_id` to `status`, enforcing forward-only transitions
    ///
    /// A missing record is an error, except when asking for `UnderDeletion`
    /// on a ledger that has already been unjoined.
    pub fn update_ledger_status(&self, ledger_id: &str, status: Status) -> Result<StatusChange> {
        let mut metadata = match self.get(ledger_id) {
            Ok(metadata) => metadata,
            Err(LedgerError::NotFound(_)) => {
                if status == Status::UnderDeletion && self.is_unjoined(ledger_id)? {
                    debug!(ledger_id, "Ledger already unjoined");
                    return Ok(StatusChange::AlreadyUnjoined);
                }
                return Err(LedgerError::StatusTargetMissing(ledger_id.to_string()));
            }
            Err(e) => return Err(e),
        };

        let from = metadata.checked_status()?;
        if !from.can_transition_to(status) {
            return Err(LedgerError::InvalidTransition {
                ledger_id: ledger_id.to_string(),
                from,
                to: status,
            });
        }

        metadata.touch_status(status);
        self.put(ledger_id, &metadata)?;
        info!(ledger_id, %from, to = %status, "Updated ledger status");

        Ok(StatusChange::Updated { from, to: status })
    }

    /// Drop the record and journal the unjoin in one atomic batch
    pub fn retire(&self, ledger_id: &str) -> Result<()> {
        let mut batch = self.keyspace.batch();
        batch.remove(&self.metadata, encode_metadata_key(ledger_id));
        batch.insert(
            &self.unjoined,
            encode_unjoined_key(ledger_id),
            now_ms().to_be_bytes().to_vec(),
        );
        batch.commit()?;
        debug!(ledger_id, "Retired ledger metadata");
        Ok(())
    }

    /// Journal a completed unjoin
    pub fn mark_unjoined(&self, ledger_id: &str) -> Result<()> {
        self.unjoined
            .insert(encode_unjoined_key(ledger_id), now_ms().to_be_bytes().to_vec())?;
        Ok(())
    }

    pub fn is_unjoined(&self, ledger_id: &str) -> Result<bool> {
        Ok(self.unjoined.contains_key(encode_unjoined_key(ledger_id))?)
    }

    /// Forget a journaled unjoin, used when the ID is created again
    pub fn clear_unjoined(&self, ledger_id: &str) -> Result<()> {
        self.unjoined.remove(encode_unjoined_key(ledger_id))?;
        Ok(())
    }

    /// Overwrite the raw bytes of a record, bypassing encoding
    #[cfg(test)]
    pub(crate) fn put_raw(&self, ledger_id: &str, bytes: &[u8]) -> Result<()> {
        self.metadata.insert(encode_metadata_key(ledger_id), bytes)?;
        Ok(())
    }

    /// Persist all pending writes to disk
    pub fn persist(&self) -> Result<()> {
        self.keyspace.persist(fjall::PersistMode::SyncAll)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (MetadataStore, ExclusiveLock, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let lock = ExclusiveLock::acquire(temp_dir.path().join("fileLock")).unwrap();
        let store = MetadataStore::open(temp_dir.path().join("ledgerProvider"), &lock).unwrap();
        (store, lock, temp_dir)
    }

    #[test]
    fn test_put_and_get() {
        let (store, _lock, _temp) = create_test_store();

        store
            .put("ch1", &LedgerMetadata::new(Status::Active))
            .unwrap();

        let metadata = store.get("ch1").unwrap();
        assert_eq!(metadata.status(), Status::Active);
    }

    #[test]
    fn test_get_missing() {
        let (store, _lock, _temp) = create_test_store();

        let err = store.get("missing").unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(ref id) if id == "missing"));
    }

    #[test]
    fn test_get_corrupted_record() {
        let (store, _lock, _temp) = create_test_store();
        store.put_raw("ch1", b"invalid").unwrap();

        let err = store.get("ch1").unwrap_err();
        assert!(err.is_corruption());
        // Listing still sees it; corruption is not absence
        assert!(store.list().unwrap().contains("ch1"));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (store, _lock, _temp) = create_test_store();
        store
            .put("ch1", &LedgerMetadata::new(Status::Active))
            .unwrap();

        store.delete("ch1").unwrap();
        store.delete("ch1").unwrap();
        store.delete("never-there").unwrap();

        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_includes_every_status() {
        let (store, _lock, _temp) = create_test_store();
        store
            .put("a", &LedgerMetadata::new(Status::Active))
            .unwrap();
        store
            .put("b", &LedgerMetadata::new(Status::UnderConstruction))
            .unwrap();
        store
            .put("c", &LedgerMetadata::new(Status::UnderDeletion))
            .unwrap();

        let ids: Vec<_> = store.list().unwrap().into_iter().collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_update_status_changes_only_status() {
        let (store, _lock, _temp) = create_test_store();
        let original = LedgerMetadata::new(Status::Active);
        store.put("ch1", &original).unwrap();
        store
            .put("ch2", &LedgerMetadata::new(Status::Active))
            .unwrap();

        let change = store
            .update_ledger_status("ch1", Status::UnderDeletion)
            .unwrap();
        assert_eq!(
            change,
            StatusChange::Updated {
                from: Status::Active,
                to: Status::UnderDeletion
            }
        );

        let updated = store.get("ch1").unwrap();
        assert_eq!(updated.status(), Status::UnderDeletion);
        assert_eq!(updated.created_at_ms, original.created_at_ms);
        assert_eq!(store.get("ch2").unwrap().status(), Status::Active);
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn test_update_status_missing_ledger() {
        let (store, _lock, _temp) = create_test_store();

        let err = store
            .update_ledger_status("ch_xyz", Status::UnderDeletion)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot update ledger status, ledger [ch_xyz] does not exist"
        );
    }

    #[test]
    fn test_update_status_after_unjoin_is_noop() {
        let (store, _lock, _temp) = create_test_store();
        store.mark_unjoined("gone").unwrap();

        let change = store
            .update_ledger_status("gone", Status::UnderDeletion)
            .unwrap();
        assert_eq!(change, StatusChange::AlreadyUnjoined);
        assert!(store.list().unwrap().is_empty());

        // Only deletion is idempotent for retired ledgers
        let err = store
            .update_ledger_status("gone", Status::Active)
            .unwrap_err();
        assert!(matches!(err, LedgerError::StatusTargetMissing(_)));
    }

    #[test]
    fn test_update_status_rejects_backward_move() {
        let (store, _lock, _temp) = create_test_store();
        store
            .put("ch1", &LedgerMetadata::new(Status::UnderDeletion))
            .unwrap();

        let err = store
            .update_ledger_status("ch1", Status::Active)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTransition { .. }));
        assert_eq!(store.get("ch1").unwrap().status(), Status::UnderDeletion);
    }

    #[test]
    fn test_update_status_leaves_corrupted_record() {
        let (store, _lock, _temp) = create_test_store();
        store.put_raw("ch1", b"invalid").unwrap();

        let err = store
            .update_ledger_status("ch1", Status::UnderDeletion)
            .unwrap_err();
        assert!(err.is_corruption());
        assert!(store.get("ch1").unwrap_err().is_corruption());
    }

    #[test]
    fn test_unjoin_journal() {
        let (store, _lock, _temp) = create_test_store();

        assert!(!store.is_unjoined("ch1").unwrap());
        store.mark_unjoined("ch1").unwrap();
        assert!(store.is_unjoined("ch1").unwrap());
        store.clear_unjoined("ch1").unwrap();
        assert!(!store.is_unjoined("ch1").unwrap());
    }

    #[test]
    fn test_retire_removes_and_journals() {
        let (store, _lock, _temp) = create_test_store();
        store
            .put("ch1", &LedgerMetadata::new(Status::UnderDeletion))
            .unwrap();

        store.retire("ch1").unwrap();

        assert!(store.list().unwrap().is_empty());
        assert!(store.is_unjoined("ch1").unwrap());
    }

    #[test]
    fn test_persistence_across_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let lock_path = temp_dir.path().join("fileLock");
        let store_path = temp_dir.path().join("ledgerProvider");

        {
            let lock = ExclusiveLock::acquire(&lock_path).unwrap();
            let store = MetadataStore::open(&store_path, &lock).unwrap();
            store
                .put("ch1", &LedgerMetadata::new(Status::Active))
                .unwrap();
            store.persist().unwrap();
        }

        let lock = ExclusiveLock::acquire(&lock_path).unwrap();
        let store = MetadataStore::open(&store_path, &lock).unwrap();
        assert_eq!(store.get("ch1").unwrap().status(), Status::Active);
    }
}
