//! Engine error types

use rapport_domain::{FriendshipStatus, ReportedStatus};
use thiserror::Error;

/// Errors that can occur during friendship operations
///
/// Every variant except `Store` knows the state of the pair after the
/// failed attempt; see [`EngineError::reported_status`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The operation makes no sense, e.g. befriending yourself
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// The actor is not the party allowed to perform this operation
    #[error("Not authorized: {reason}")]
    Unauthorized {
        /// Status of the record, unchanged
        status: ReportedStatus,
        /// Why the actor was rejected
        reason: String,
    },

    /// No friendship record exists between the two users
    #[error("No friendship exists between these users")]
    NotFound,

    /// The record is not in a state the operation applies to
    #[error("Friendship is {status}, expected pending")]
    InvalidState {
        /// Current status of the record
        status: FriendshipStatus,
    },

    /// The record changed between the check and the write
    #[error("Friendship changed concurrently, now {status}")]
    Conflict {
        /// Status observed after the failed write
        status: ReportedStatus,
    },

    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),
}

impl EngineError {
    /// The `friendship_status` to report alongside this error
    ///
    /// `None` when the store failed and the state is unknown.
    pub fn reported_status(&self) -> Option<ReportedStatus> {
        match self {
            EngineError::InvalidOperation(_) | EngineError::NotFound => {
                Some(ReportedStatus::Deleted)
            }
            EngineError::Unauthorized { status, .. } | EngineError::Conflict { status } => {
                Some(*status)
            }
            EngineError::InvalidState { status } => Some((*status).into()),
            EngineError::Store(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_report_current_status() {
        let err = EngineError::Unauthorized {
            status: ReportedStatus::Denied,
            reason: "sender cannot delete a denied request".to_string(),
        };
        assert_eq!(err.reported_status(), Some(ReportedStatus::Denied));

        let err = EngineError::InvalidState {
            status: FriendshipStatus::Accepted,
        };
        assert_eq!(err.reported_status(), Some(ReportedStatus::Accepted));
        assert_eq!(err.to_string(), "Friendship is accepted, expected pending");
    }

    #[test]
    fn test_missing_record_reports_deleted() {
        assert_eq!(
            EngineError::NotFound.reported_status(),
            Some(ReportedStatus::Deleted)
        );
        assert_eq!(EngineError::Store("disk full".into()).reported_status(), None);
    }
}
