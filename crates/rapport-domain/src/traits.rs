//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{Friendship, FriendshipStatus, UserId, UserPair};

/// Trait for storing and retrieving friendship records
///
/// Implemented by the infrastructure layer (rapport-store).
///
/// Implementations must key records by the unordered [`UserPair`] and keep
/// at most one record per pair, including under concurrent writers.
pub trait FriendshipStore {
    /// Error type for store operations
    type Error;

    /// Get the record between the two users of `pair`, in either direction
    fn find_friendship(&self, pair: &UserPair) -> Result<Option<Friendship>, Self::Error>;

    /// Insert `friendship` unless its pair already has a record
    ///
    /// Returns `false` without touching the existing record when the pair
    /// is taken. The check and the insert must be a single atomic step.
    fn insert_friendship(&mut self, friendship: &Friendship) -> Result<bool, Self::Error>;

    /// Move the record for `pair` from status `from` to status `to`
    ///
    /// Returns `false`, changing nothing, if no record exists or its status
    /// is not `from`.
    fn transition_status(
        &mut self,
        pair: &UserPair,
        from: FriendshipStatus,
        to: FriendshipStatus,
        updated_at: u64,
    ) -> Result<bool, Self::Error>;

    /// Delete the record for `pair` if its status is still `status`
    ///
    /// Returns `false`, changing nothing, if no record exists or its status
    /// differs.
    fn delete_friendship(
        &mut self,
        pair: &UserPair,
        status: FriendshipStatus,
    ) -> Result<bool, Self::Error>;

    /// Pending records whose target is `user`, newest first
    fn pending_for(&self, user: UserId) -> Result<Vec<Friendship>, Self::Error>;

    /// All records where `user` is either party
    fn friendships_involving(&self, user: UserId) -> Result<Vec<Friendship>, Self::Error>;
}
