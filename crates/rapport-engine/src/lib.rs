//! Rapport Engine
//!
//! The relationship state machine: request, withdraw, accept and deny a
//! friendship between two users, enforcing who may do what.
//!
//! The engine provides:
//! - One record per unordered pair, found regardless of who initiated
//! - Idempotent requests (a repeat request reports the existing status)
//! - Recipient-only accept and deny
//! - Withdrawal by either party, except that a denied sender cannot erase
//!   the denial
//! - Errors that carry the pair's status after the failed attempt
//!
//! # Examples
//!
//! ```no_run
//! use rapport_domain::UserId;
//! use rapport_engine::{EngineError, FriendshipEngine};
//! use rapport_store::SqliteStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut engine = FriendshipEngine::new(SqliteStore::new("rapport.db")?);
//! let (alice, bob) = (UserId::new(), UserId::new());
//!
//! engine.request(alice, bob)?;
//! engine.deny(bob, alice)?;
//!
//! // Alice cannot erase Bob's denial
//! let err = engine.withdraw(alice, bob).unwrap_err();
//! assert!(matches!(err, EngineError::Unauthorized { .. }));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod engine;
mod error;

pub use engine::FriendshipEngine;
pub use error::EngineError;
