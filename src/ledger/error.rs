use thiserror::Error;

use super::metadata::Status;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Fjall error: {0}")]
    Fjall(#[from] fjall::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ledger [{0}] does not exist")]
    NotFound(String),

    #[error("cannot update ledger status, ledger [{0}] does not exist")]
    StatusTargetMissing(String),

    #[error("error unmarshalling ledger metadata: {0}")]
    Corruption(#[from] prost::DecodeError),

    #[error("error unmarshalling ledger metadata: unknown status value {0}")]
    UnknownStatus(i32),

    #[error("ledger [{ledger_id}] cannot move from {from} to {to}")]
    InvalidTransition {
        ledger_id: String,
        from: Status,
        to: Status,
    },

    #[error("ledger [{0}] already exists")]
    AlreadyExists(String),

    #[error("invalid ledger ID [{ledger_id}]: {reason}")]
    InvalidLedgerId { ledger_id: String, reason: String },
}

impl LedgerError {
    /// True for records that exist but cannot be decoded
    pub fn is_corruption(&self) -> bool {
        matches!(self, LedgerError::Corruption(_) | LedgerError::UnknownStatus(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LedgerError::NotFound(_) | LedgerError::StatusTargetMissing(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
