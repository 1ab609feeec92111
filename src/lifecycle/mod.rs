//! Ledger lifecycle controller
//!
//! Administrative, offline operations against a storage root:
//!
//! - [`unjoin_channel`] removes a ledger: its status becomes
//!   `UNDER_DELETION`, every data store purges it, and its metadata record is
//!   deleted. Repeating the call afterwards is a quiet success.
//! - [`update_ledger_status`] moves a ledger forward through its status
//!   state machine, for recovery tooling.
//!
//! Both refuse to run while another process (typically the server) holds the
//! storage root, failing with [`LifecycleError::Busy`] without side effects.

pub mod controller;
pub mod error;
pub mod stores;

pub(crate) use controller::remove_ledger;
pub use controller::{LifecycleController, unjoin_channel, update_ledger_status};
pub use error::{LifecycleError, Result, StepError};
pub use stores::{DataStores, DirectoryDataStore, LedgerDataStore};
