//! Persisted per-ledger metadata record and its status state machine.
//!
//! ```text
//! (absent) -> UNDER_CONSTRUCTION -> ACTIVE -> UNDER_DELETION -> (absent)
//! ```

use std::fmt;
use std::str::FromStr;

use prost::Message;

use super::error::{LedgerError, Result};

/// Lifecycle status of a ledger
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum Status {
    Active = 0,
    UnderConstruction = 1,
    UnderDeletion = 2,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "ACTIVE",
            Status::UnderConstruction => "UNDER_CONSTRUCTION",
            Status::UnderDeletion => "UNDER_DELETION",
        }
    }

    /// Whether a ledger currently in `self` may be moved to `next`
    ///
    /// Rewriting the current status is allowed; moves only go forward.
    pub fn can_transition_to(self, next: Status) -> bool {
        match (self, next) {
            (Status::UnderConstruction, Status::UnderConstruction) => true,
            (Status::UnderConstruction, Status::Active) => true,
            (Status::UnderConstruction, Status::UnderDeletion) => true,
            (Status::Active, Status::Active) => true,
            (Status::Active, Status::UnderDeletion) => true,
            (Status::Active, Status::UnderConstruction) => false,
            (Status::UnderDeletion, Status::UnderDeletion) => true,
            (Status::UnderDeletion, Status::Active) => false,
            (Status::UnderDeletion, Status::UnderConstruction) => false,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "ACTIVE" => Ok(Status::Active),
            "UNDER_CONSTRUCTION" => Ok(Status::UnderConstruction),
            "UNDER_DELETION" => Ok(Status::UnderDeletion),
            other => Err(format!(
                "unknown ledger status '{}', expected one of ACTIVE, UNDER_CONSTRUCTION, UNDER_DELETION",
                other
            )),
        }
    }
}

/// Metadata record stored per ledger ID
#[derive(Clone, PartialEq, Message)]
pub struct LedgerMetadata {
    #[prost(enumeration = "Status", tag = "1")]
    pub status: i32,
    #[prost(uint64, tag = "2")]
    pub created_at_ms: u64,
    #[prost(uint64, tag = "3")]
    pub updated_at_ms: u64,
}

impl LedgerMetadata {
    pub fn new(status: Status) -> Self {
        let now = now_ms();
        Self {
            status: status as i32,
            created_at_ms: now,
            updated_at_ms: now,
        }
    }

    /// Decode a stored record, rejecting bytes that do not form a valid record
    pub fn decode_record(bytes: &[u8]) -> Result<Self> {
        let metadata = Self::decode(bytes)?;
        metadata.checked_status()?;
        Ok(metadata)
    }

    pub fn encode_record(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    /// Status of a decoded record; unknown values are corruption
    pub fn checked_status(&self) -> Result<Status> {
        Status::try_from(self.status).map_err(|_| LedgerError::UnknownStatus(self.status))
    }

    /// Set the status and bump `updated_at_ms`
    pub fn touch_status(&mut self, status: Status) {
        self.set_status(status);
        self.updated_at_ms = now_ms();
    }
}

/// Current Unix timestamp in milliseconds
pub(crate) fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_decodes() {
        let metadata = LedgerMetadata::new(Status::UnderConstruction);
        let bytes = metadata.encode_record();

        let decoded = LedgerMetadata::decode_record(&bytes).unwrap();
        assert_eq!(decoded.checked_status().unwrap(), Status::UnderConstruction);
        assert_eq!(decoded.created_at_ms, metadata.created_at_ms);
    }

    #[test]
    fn test_garbage_is_corruption() {
        let err = LedgerMetadata::decode_record(b"invalid").unwrap_err();
        assert!(err.is_corruption());
        assert!(
            err.to_string()
                .starts_with("error unmarshalling ledger metadata: ")
        );
    }

    #[test]
    fn test_unknown_status_is_corruption() {
        let metadata = LedgerMetadata {
            status: 42,
            created_at_ms: 1,
            updated_at_ms: 1,
        };

        let err = LedgerMetadata::decode_record(&metadata.encode_record()).unwrap_err();
        assert!(matches!(err, LedgerError::UnknownStatus(42)));
    }

    #[test]
    fn test_forward_transitions() {
        assert!(Status::UnderConstruction.can_transition_to(Status::Active));
        assert!(Status::Active.can_transition_to(Status::UnderDeletion));
        assert!(Status::UnderConstruction.can_transition_to(Status::UnderDeletion));
        assert!(Status::UnderDeletion.can_transition_to(Status::UnderDeletion));
    }

    #[test]
    fn test_backward_transitions_rejected() {
        assert!(!Status::UnderDeletion.can_transition_to(Status::Active));
        assert!(!Status::Active.can_transition_to(Status::UnderConstruction));
        assert!(!Status::UnderDeletion.can_transition_to(Status::UnderConstruction));
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("UNDER_DELETION".parse::<Status>().unwrap(), Status::UnderDeletion);
        assert_eq!("active".parse::<Status>().unwrap(), Status::Active);
        assert_eq!("under-construction".parse::<Status>().unwrap(), Status::UnderConstruction);
        assert!("INACTIVE".parse::<Status>().is_err());
    }
}
