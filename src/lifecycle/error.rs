use thiserror::Error;

use crate::ledger::LedgerError;
use crate::lock::LockError;

/// Failure of one step inside a lifecycle operation
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("failed to purge {store} data: {source}")]
    Purge {
        store: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to initialize {store} data: {source}")]
    Initialize {
        store: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Lock(LockError),
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Must supply channel ID")]
    MissingLedgerId,

    #[error(
        "as another peer node command is executing, wait for that command to complete its execution or terminate it before retrying"
    )]
    Busy(#[source] LockError),

    #[error("Unjoin channel [{ledger_id}]: {source}")]
    Unjoin {
        ledger_id: String,
        #[source]
        source: StepError,
    },

    #[error("Update ledger status [{ledger_id}]: {source}")]
    UpdateStatus {
        ledger_id: String,
        #[source]
        source: StepError,
    },
}

impl LifecycleError {
    pub fn is_busy(&self) -> bool {
        matches!(self, LifecycleError::Busy(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.ledger_error(), Some(e) if e.is_not_found())
    }

    pub fn is_corruption(&self) -> bool {
        matches!(self.ledger_error(), Some(e) if e.is_corruption())
    }

    fn ledger_error(&self) -> Option<&LedgerError> {
        match self {
            LifecycleError::Unjoin { source, .. } | LifecycleError::UpdateStatus { source, .. } => {
                match source {
                    StepError::Ledger(e) => Some(e),
                    _ => None,
                }
            }
            LifecycleError::MissingLedgerId | LifecycleError::Busy(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LifecycleError>;
