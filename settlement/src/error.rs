//! Error types for the settlement engine

use crate::types::{ParticipantId, SettlementId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for settlement operations
pub type Result<T> = std::result::Result<T, Error>;

/// Settlement errors
#[derive(Error, Debug)]
pub enum Error {
    /// Calculation requested with an empty participant list
    #[error("no active participants")]
    NoActiveParticipants,

    /// Calculation requested with an empty expense list
    #[error("no expenses")]
    NoExpenses,

    /// Participant referenced but not part of the calculation
    #[error("Unknown participant: {0}")]
    UnknownParticipant(ParticipantId),

    /// Amount outside its allowed range
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Manual split shares do not add up to the expense amount
    #[error("Split total {actual} does not match expense amount {expected}")]
    SplitMismatch {
        /// Expense amount
        expected: Decimal,
        /// Sum of the submitted shares
        actual: Decimal,
    },

    /// Game round failed validation
    #[error("Invalid round: {0}")]
    InvalidRound(String),

    /// No stored result for the settlement
    #[error("No snapshot for settlement {0}")]
    SnapshotNotFound(SettlementId),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for errors the caller can fix by correcting its input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::NoActiveParticipants
                | Error::NoExpenses
                | Error::UnknownParticipant(_)
                | Error::InvalidAmount(_)
                | Error::SplitMismatch { .. }
                | Error::InvalidRound(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(Error::NoActiveParticipants.is_validation());
        assert!(Error::NoExpenses.is_validation());
        assert!(Error::InvalidRound("sum is 10".into()).is_validation());
        assert!(!Error::Config("bad".into()).is_validation());
        assert!(!Error::from("boom").is_validation());
    }

    #[test]
    fn test_messages() {
        assert_eq!(Error::NoActiveParticipants.to_string(), "no active participants");
        assert_eq!(Error::NoExpenses.to_string(), "no expenses");
    }
}
