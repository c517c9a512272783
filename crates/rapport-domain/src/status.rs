//! Friendship status values

use std::fmt;

/// Stored status of a friendship record
///
/// Records move through:
/// - Pending: request created, awaiting the target's decision
/// - Accepted: the target confirmed the request
/// - Denied: the target rejected the request; the record is kept
///
/// Deletion is not a status. A deleted friendship has no record at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FriendshipStatus {
    /// Awaiting the target's decision
    Pending,

    /// Confirmed by the target
    Accepted,

    /// Rejected by the target
    Denied,
}

impl FriendshipStatus {
    /// Get the status name as stored and reported
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendshipStatus::Pending => "pending",
            FriendshipStatus::Accepted => "accepted",
            FriendshipStatus::Denied => "denied",
        }
    }

    /// Parse a stored status name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(FriendshipStatus::Pending),
            "accepted" => Some(FriendshipStatus::Accepted),
            "denied" => Some(FriendshipStatus::Denied),
            _ => None,
        }
    }

    /// Whether the target may still accept or deny
    pub fn is_pending(&self) -> bool {
        matches!(self, FriendshipStatus::Pending)
    }
}

impl std::str::FromStr for FriendshipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid friendship status: {}", s))
    }
}

impl fmt::Display for FriendshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status reported back to callers after an operation
///
/// Unlike [`FriendshipStatus`] this has an explicit `Deleted` value for
/// "no record exists for the pair".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportedStatus {
    /// Record exists and is pending
    Pending,
    /// Record exists and is accepted
    Accepted,
    /// Record exists and is denied
    Denied,
    /// No record exists
    Deleted,
}

impl ReportedStatus {
    /// Report the state of an optional record
    pub fn of(status: Option<FriendshipStatus>) -> Self {
        status.map(Self::from).unwrap_or(ReportedStatus::Deleted)
    }

    /// Get the name used in `friendship_status` payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportedStatus::Pending => "pending",
            ReportedStatus::Accepted => "accepted",
            ReportedStatus::Denied => "denied",
            ReportedStatus::Deleted => "deleted",
        }
    }
}

impl From<FriendshipStatus> for ReportedStatus {
    fn from(status: FriendshipStatus) -> Self {
        match status {
            FriendshipStatus::Pending => ReportedStatus::Pending,
            FriendshipStatus::Accepted => ReportedStatus::Accepted,
            FriendshipStatus::Denied => ReportedStatus::Denied,
        }
    }
}

impl fmt::Display for ReportedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
