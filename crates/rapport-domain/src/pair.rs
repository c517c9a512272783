//! Unordered user pairs, the identity of a friendship record

use crate::UserId;

/// Two distinct users, stored in normalized `(low, high)` order
///
/// Every friendship lookup goes through a pair so that the record is found
/// no matter which party initiated it.
///
/// # Examples
///
/// ```
/// use rapport_domain::{UserId, UserPair};
///
/// let a = UserId::from_value(1);
/// let b = UserId::from_value(2);
///
/// assert_eq!(UserPair::new(a, b), UserPair::new(b, a));
/// assert!(UserPair::new(a, a).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserPair {
    low: UserId,
    high: UserId,
}

impl UserPair {
    /// Build the pair for two users, or `None` if they are the same user
    pub fn new(a: UserId, b: UserId) -> Option<Self> {
        if a == b {
            return None;
        }

        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Some(Self { low, high })
    }

    /// The smaller identifier
    pub fn low(&self) -> UserId {
        self.low
    }

    /// The larger identifier
    pub fn high(&self) -> UserId {
        self.high
    }

    /// Whether `user` is one of the two parties
    pub fn contains(&self, user: UserId) -> bool {
        self.low == user || self.high == user
    }

    /// The party that is not `user`, if `user` belongs to the pair
    pub fn other(&self, user: UserId) -> Option<UserId> {
        if user == self.low {
            Some(self.high)
        } else if user == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}
