//! Unjoin against a storage root shared with a ledger provider
//!
//! These tests play both roles: the provider stands in for a running server,
//! and `unjoin_channel` is the offline maintenance command.

use ledgerd::config::Config;
use ledgerd::ledger::{MetadataStore, Status};
use ledgerd::lifecycle::{LifecycleError, unjoin_channel, update_ledger_status};
use ledgerd::lock::ExclusiveLock;
use ledgerd::provider::LedgerProvider;
use tempfile::TempDir;

fn test_config() -> (Config, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = Config::for_root(temp_dir.path());
    config.ledger.history.enabled = false;
    (config, temp_dir)
}

fn create_ledger(config: &Config, ledger_id: &str) {
    let provider = LedgerProvider::open(&config.ledger).unwrap();
    provider.create_from_genesis(ledger_id).unwrap();
    provider.close().unwrap();
}

fn active_ledgers(config: &Config) -> Vec<String> {
    let provider = LedgerProvider::open(&config.ledger).unwrap();
    let ledgers = provider.list().unwrap();
    provider.close().unwrap();
    ledgers
}

#[test]
fn test_unjoin_channel() {
    let (config, _temp) = test_config();
    let ledger_id = "ledger_unjoin";

    let provider = LedgerProvider::open(&config.ledger).unwrap();
    assert_eq!(provider.list().unwrap().len(), 0);

    provider.create_from_genesis(ledger_id).unwrap();
    assert_eq!(provider.list().unwrap().len(), 1);
    provider.close().unwrap();

    unjoin_channel(&config, ledger_id).unwrap();

    assert_eq!(active_ledgers(&config).len(), 0);
    assert!(!config.ledger.block_store_path().join(ledger_id).exists());
    assert!(!config.ledger.state_db_path().join(ledger_id).exists());
}

#[test]
fn test_unjoin_unjoined_channel() {
    let (config, _temp) = test_config();
    let ledger_id = "ledger_unjoin_unjoined";
    create_ledger(&config, ledger_id);

    unjoin_channel(&config, ledger_id).unwrap();
    assert!(active_ledgers(&config).is_empty());

    // Subsequent unjoins do not fail
    unjoin_channel(&config, ledger_id).unwrap();
    unjoin_channel(&config, ledger_id).unwrap();
    unjoin_channel(&config, ledger_id).unwrap();
}

#[test]
fn test_unjoin_leaves_other_ledgers() {
    let (config, _temp) = test_config();
    create_ledger(&config, "keep_me");
    create_ledger(&config, "drop_me");

    unjoin_channel(&config, "drop_me").unwrap();

    assert_eq!(active_ledgers(&config), vec!["keep_me"]);
    assert!(config.ledger.block_store_path().join("keep_me").is_dir());
}

#[test]
fn test_update_ledger_status() {
    let (config, _temp) = test_config();
    let ledger_id = "ledger_000011";
    create_ledger(&config, ledger_id);

    {
        let provider = LedgerProvider::open(&config.ledger).unwrap();
        assert_eq!(provider.metadata(ledger_id).unwrap().status(), Status::Active);
        provider.close().unwrap();
    }

    update_ledger_status(&config, ledger_id, Status::UnderDeletion).unwrap();

    let provider = LedgerProvider::open(&config.ledger).unwrap();
    assert_eq!(provider.metadata(ledger_id).unwrap().status(), Status::UnderDeletion);
    assert_eq!(provider.recovery_stats().pending_unjoins, 1);
    provider.close().unwrap();

    // A second reopen still sees the record; only unjoin removes it
    {
        let lock = ExclusiveLock::acquire(config.ledger.lock_path()).unwrap();
        let store = MetadataStore::open(config.ledger.provider_path(), &lock).unwrap();
        assert_eq!(store.get(ledger_id).unwrap().status(), Status::UnderDeletion);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    unjoin_channel(&config, ledger_id).unwrap();
    assert!(active_ledgers(&config).is_empty());
    assert!(!config.ledger.block_store_path().join(ledger_id).exists());
}

#[test]
fn test_unjoin_with_running_provider_errors() {
    let (config, _temp) = test_config();
    let ledger_id = "ledger_000001";

    let provider = LedgerProvider::open(&config.ledger).unwrap();
    provider.create_from_genesis(ledger_id).unwrap();

    let err = unjoin_channel(&config, ledger_id).unwrap_err();
    assert!(matches!(err, LifecycleError::Busy(_)));
    assert_eq!(
        err.to_string(),
        "as another peer node command is executing, wait for that command to complete its execution or terminate it before retrying"
    );

    // Nothing changed behind the provider's back
    assert_eq!(provider.list().unwrap(), vec![ledger_id]);
    provider.close().unwrap();

    unjoin_channel(&config, ledger_id).unwrap();
    assert!(active_ledgers(&config).is_empty());
}

#[test]
fn test_unjoin_with_missing_channel_errors() {
    let (config, _temp) = test_config();

    let err = unjoin_channel(&config, "__invalid_channel").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unjoin channel [__invalid_channel]: cannot update ledger status, ledger [__invalid_channel] does not exist"
    );
}

#[test]
fn test_unjoin_never_created_after_other_unjoin() {
    let (config, _temp) = test_config();
    create_ledger(&config, "ch1");
    unjoin_channel(&config, "ch1").unwrap();

    let err = unjoin_channel(&config, "ch2").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_status_update_while_provider_open_errors() {
    let (config, _temp) = test_config();
    let provider = LedgerProvider::open(&config.ledger).unwrap();
    provider.create_from_genesis("ch1").unwrap();

    let err = update_ledger_status(&config, "ch1", Status::UnderDeletion).unwrap_err();
    assert!(err.is_busy());
    assert_eq!(provider.metadata("ch1").unwrap().status(), Status::Active);
}
