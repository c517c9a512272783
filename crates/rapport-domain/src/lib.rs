//! Rapport Domain Layer
//!
//! This crate contains the domain model for Rapport's friendship core.
//! It defines the value objects and the storage trait that every other
//! layer depends upon, and pulls in nothing beyond `uuid`.
//!
//! ## Key Concepts
//!
//! - **UserId**: Opaque identity handle produced by the authentication layer
//! - **UserPair**: Unordered pair of distinct users, the identity of a record
//! - **Friendship**: The single directional record kept per pair
//! - **FriendshipStatus**: `pending`, `accepted` or `denied`
//! - **ReportedStatus**: What callers see, adding `deleted` for "no record"
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture:
//! - Pure domain types only
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod friendship;
pub mod pair;
pub mod status;
pub mod traits;
pub mod user;

// Re-exports for convenience
pub use friendship::Friendship;
pub use pair::UserPair;
pub use status::{FriendshipStatus, ReportedStatus};
pub use traits::FriendshipStore;
pub use user::UserId;
