//! Friendship state machine
//!
//! Per unordered pair of users:
//!
//! ```text
//! NONE --request--> PENDING --accept--> ACCEPTED
//!                      |
//!                      +-----deny-----> DENIED
//!
//! PENDING, ACCEPTED --withdraw (either party)--> NONE
//! DENIED            --withdraw (target only)---> NONE
//! ```

use crate::EngineError;
use rapport_domain::{
    Friendship, FriendshipStatus, FriendshipStore, ReportedStatus, UserId, UserPair,
};
use std::fmt::Display;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Current timestamp in seconds since Unix epoch
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn store_error<E: Display>(e: E) -> EngineError {
    EngineError::Store(e.to_string())
}

/// The relationship engine
///
/// Owns a [`FriendshipStore`] and applies the request / withdraw / accept /
/// deny rules on top of it. The actor is always an explicit argument; the
/// engine holds no notion of a "current user".
///
/// Every operation reads the record for the pair, checks the rules, then
/// writes with a store call that is conditional on what was read. If the
/// record changed in between, the write does nothing and the operation
/// fails with [`EngineError::Conflict`].
///
/// # Examples
///
/// ```
/// use rapport_domain::{ReportedStatus, UserId};
/// use rapport_engine::FriendshipEngine;
/// use rapport_store::SqliteStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut engine = FriendshipEngine::new(SqliteStore::new(":memory:")?);
/// let alice = UserId::new();
/// let bob = UserId::new();
///
/// assert_eq!(engine.request(alice, bob)?, ReportedStatus::Pending);
/// assert_eq!(engine.accept(bob, alice)?, ReportedStatus::Accepted);
/// # Ok(())
/// # }
/// ```
pub struct FriendshipEngine<S: FriendshipStore> {
    store: S,
}

impl<S> FriendshipEngine<S>
where
    S: FriendshipStore,
    S::Error: Display,
{
    /// Create an engine over the given store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the engine and return the store
    pub fn into_store(self) -> S {
        self.store
    }

    /// Send a friendship request from `actor` to `other`
    ///
    /// Creates a pending record if the pair has none. If a record already
    /// exists, in either direction and with any status, nothing changes and
    /// its current status is returned.
    pub fn request(&mut self, actor: UserId, other: UserId) -> Result<ReportedStatus, EngineError> {
        let friendship = Friendship::request(actor, other, current_timestamp()).ok_or_else(|| {
            EngineError::InvalidOperation("cannot send a friendship request to yourself".into())
        })?;

        if self.store.insert_friendship(&friendship).map_err(store_error)? {
            info!(%actor, %other, "friendship requested");
            return Ok(ReportedStatus::Pending);
        }

        let pair = Self::pair(actor, other)?;
        match self.find(&pair)? {
            Some(existing) => {
                debug!(%actor, %other, status = %existing.status, "friendship already exists");
                Ok(existing.status.into())
            }
            // Deleted between the failed insert and this read
            None => Err(EngineError::Conflict {
                status: ReportedStatus::Deleted,
            }),
        }
    }

    /// Remove the friendship between `actor` and `other`
    ///
    /// Either party may withdraw a pending or accepted friendship. A denied
    /// request can only be cleared by its target; the sender who was denied
    /// is rejected and the record stays.
    pub fn withdraw(&mut self, actor: UserId, other: UserId) -> Result<ReportedStatus, EngineError> {
        let pair = Self::pair(actor, other)?;
        let record = self.find(&pair)?.ok_or(EngineError::NotFound)?;

        if record.status == FriendshipStatus::Denied && record.is_initiator(actor) {
            warn!(%actor, %other, "sender tried to delete a denied friendship request");
            return Err(EngineError::Unauthorized {
                status: ReportedStatus::Denied,
                reason: "the sender of a denied request cannot delete it".into(),
            });
        }

        if !self
            .store
            .delete_friendship(&pair, record.status)
            .map_err(store_error)?
        {
            return Err(self.conflict(&pair));
        }

        info!(%actor, %other, was = %record.status, "friendship deleted");
        Ok(ReportedStatus::Deleted)
    }

    /// Accept the pending request `requester` sent to `actor`
    pub fn accept(&mut self, actor: UserId, requester: UserId) -> Result<ReportedStatus, EngineError> {
        self.decide(actor, requester, FriendshipStatus::Accepted)
    }

    /// Deny the pending request `requester` sent to `actor`
    ///
    /// The record is kept with status `denied`.
    pub fn deny(&mut self, actor: UserId, requester: UserId) -> Result<ReportedStatus, EngineError> {
        self.decide(actor, requester, FriendshipStatus::Denied)
    }

    /// Pending requests waiting for `actor` to accept or deny, newest first
    pub fn pending_requests(&self, actor: UserId) -> Result<Vec<Friendship>, EngineError> {
        self.store.pending_for(actor).map_err(store_error)
    }

    /// Current status between `actor` and `other`, `deleted` if none
    pub fn status_between(&self, actor: UserId, other: UserId) -> Result<ReportedStatus, EngineError> {
        let pair = Self::pair(actor, other)?;
        let record = self.find(&pair)?;
        Ok(ReportedStatus::of(record.map(|f| f.status)))
    }

    /// Every friendship record `actor` is part of, in any status
    pub fn friendships(&self, actor: UserId) -> Result<Vec<Friendship>, EngineError> {
        self.store.friendships_involving(actor).map_err(store_error)
    }

    /// Shared rules for accept and deny: only the target of a pending
    /// request may decide it.
    fn decide(
        &mut self,
        actor: UserId,
        requester: UserId,
        decision: FriendshipStatus,
    ) -> Result<ReportedStatus, EngineError> {
        let pair = Self::pair(actor, requester)?;
        let record = self.find(&pair)?.ok_or(EngineError::NotFound)?;

        if !record.is_target(actor) {
            warn!(%actor, %requester, decision = %decision, "only the recipient may decide a request");
            return Err(EngineError::Unauthorized {
                status: record.status.into(),
                reason: format!("only the recipient of a request may mark it {}", decision),
            });
        }

        if !record.status.is_pending() {
            debug!(%actor, %requester, status = %record.status, "request already decided");
            return Err(EngineError::InvalidState {
                status: record.status,
            });
        }

        if !self
            .store
            .transition_status(&pair, FriendshipStatus::Pending, decision, current_timestamp())
            .map_err(store_error)?
        {
            return Err(self.conflict(&pair));
        }

        info!(%actor, %requester, status = %decision, "friendship request decided");
        Ok(decision.into())
    }

    fn pair(actor: UserId, other: UserId) -> Result<UserPair, EngineError> {
        UserPair::new(actor, other).ok_or_else(|| {
            EngineError::InvalidOperation("a friendship needs two different users".into())
        })
    }

    fn find(&self, pair: &UserPair) -> Result<Option<Friendship>, EngineError> {
        self.store.find_friendship(pair).map_err(store_error)
    }

    /// Build the error for a conditional write that matched nothing
    fn conflict(&self, pair: &UserPair) -> EngineError {
        match self.find(pair) {
            Ok(record) => {
                let status = ReportedStatus::of(record.map(|f| f.status));
                warn!(low = %pair.low(), high = %pair.high(), %status, "friendship changed during operation");
                EngineError::Conflict { status }
            }
            Err(e) => e,
        }
    }
}
