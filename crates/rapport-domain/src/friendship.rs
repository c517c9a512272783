//! Friendship record, one per unordered pair of users

use crate::{FriendshipStatus, UserId, UserPair};

/// A directional friendship record between two distinct users
///
/// The direction (who initiated) matters for authorization, but identity is
/// the unordered [`UserPair`]: at most one record exists per pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Friendship {
    /// User who created the request
    pub initiator_id: UserId,

    /// User who received the request
    pub target_id: UserId,

    /// Current status
    pub status: FriendshipStatus,

    /// When the request was created (Unix seconds)
    pub created_at: u64,

    /// When the status last changed (Unix seconds)
    pub updated_at: u64,
}

impl Friendship {
    /// Create a new pending request from `initiator_id` to `target_id`
    ///
    /// Returns `None` for a self-request.
    pub fn request(initiator_id: UserId, target_id: UserId, created_at: u64) -> Option<Self> {
        if initiator_id == target_id {
            return None;
        }

        Some(Self {
            initiator_id,
            target_id,
            status: FriendshipStatus::Pending,
            created_at,
            updated_at: created_at,
        })
    }

    /// The unordered pair this record belongs to
    ///
    /// `None` only for a malformed record whose parties are the same user.
    pub fn pair(&self) -> Option<UserPair> {
        UserPair::new(self.initiator_id, self.target_id)
    }

    /// Whether `user` initiated this request
    pub fn is_initiator(&self, user: UserId) -> bool {
        self.initiator_id == user
    }

    /// Whether `user` received this request
    pub fn is_target(&self, user: UserId) -> bool {
        self.target_id == user
    }

    /// Whether `user` is either party
    pub fn involves(&self, user: UserId) -> bool {
        self.is_initiator(user) || self.is_target(user)
    }
}
