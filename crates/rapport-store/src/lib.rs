//! Rapport Storage Layer
//!
//! Implements the FriendshipStore trait on SQLite.
//!
//! # Architecture
//!
//! - One `friendships` row per unordered user pair
//! - The normalized pair `(user_low, user_high)` is the primary key, so the
//!   database itself rejects a second record for the same two users
//! - Inserts use `ON CONFLICT DO NOTHING`, making "create if absent" a
//!   single atomic statement
//!
//! # Examples
//!
//! ```no_run
//! use rapport_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for friendship operations
//! ```

#![warn(missing_docs)]

use rapport_domain::{Friendship, FriendshipStatus, FriendshipStore, UserId, UserPair};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

const SELECT_COLUMNS: &str =
    "SELECT initiator_id, target_id, status, created_at, updated_at FROM friendships";

/// SQLite-based implementation of FriendshipStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store across tasks by
/// wrapping it (or the engine that owns it) in a mutex.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rapport_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("rapport.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Total number of stored friendship records
    pub fn friendship_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM friendships", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Convert UserId to bytes for storage
    ///
    /// Big-endian so that SQLite's byte-wise BLOB ordering matches UserId ordering.
    fn user_id_to_bytes(id: UserId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    /// Convert bytes to UserId
    fn bytes_to_user_id(bytes: &[u8]) -> Result<UserId, StoreError> {
        let arr: [u8; 16] = bytes.try_into().map_err(|_| {
            StoreError::InvalidData(format!("Expected 16 bytes for UserId, got {}", bytes.len()))
        })?;
        Ok(UserId::from_value(u128::from_be_bytes(arr)))
    }

    /// Map a row selected with `SELECT_COLUMNS` to a Friendship
    fn row_to_friendship(row: &Row<'_>) -> rusqlite::Result<Friendship> {
        let initiator: Vec<u8> = row.get(0)?;
        let target: Vec<u8> = row.get(1)?;
        let status: String = row.get(2)?;

        let initiator_id = Self::bytes_to_user_id(&initiator).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Blob, Box::new(e))
        })?;
        let target_id = Self::bytes_to_user_id(&target).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Blob, Box::new(e))
        })?;
        let status = FriendshipStatus::parse(&status).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                Box::new(StoreError::InvalidData(format!(
                    "Unknown friendship status: {}",
                    status
                ))),
            )
        })?;

        Ok(Friendship {
            initiator_id,
            target_id,
            status,
            created_at: row.get::<_, i64>(3)? as u64,
            updated_at: row.get::<_, i64>(4)? as u64,
        })
    }
}

impl FriendshipStore for SqliteStore {
    type Error = StoreError;

    fn find_friendship(&self, pair: &UserPair) -> Result<Option<Friendship>, Self::Error> {
        let friendship = self
            .conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE user_low = ?1 AND user_high = ?2"),
                params![
                    Self::user_id_to_bytes(pair.low()),
                    Self::user_id_to_bytes(pair.high())
                ],
                Self::row_to_friendship,
            )
            .optional()?;

        Ok(friendship)
    }

    fn insert_friendship(&mut self, friendship: &Friendship) -> Result<bool, Self::Error> {
        let pair = friendship.pair().ok_or_else(|| {
            StoreError::InvalidData("Friendship initiator and target are the same user".to_string())
        })?;

        let inserted = self.conn.execute(
            "INSERT INTO friendships (user_low, user_high, initiator_id, target_id, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(user_low, user_high) DO NOTHING",
            params![
                Self::user_id_to_bytes(pair.low()),
                Self::user_id_to_bytes(pair.high()),
                Self::user_id_to_bytes(friendship.initiator_id),
                Self::user_id_to_bytes(friendship.target_id),
                friendship.status.as_str(),
                friendship.created_at as i64,
                friendship.updated_at as i64,
            ],
        )?;

        Ok(inserted == 1)
    }

    fn transition_status(
        &mut self,
        pair: &UserPair,
        from: FriendshipStatus,
        to: FriendshipStatus,
        updated_at: u64,
    ) -> Result<bool, Self::Error> {
        let updated = self.conn.execute(
            "UPDATE friendships SET status = ?4, updated_at = ?5
             WHERE user_low = ?1 AND user_high = ?2 AND status = ?3",
            params![
                Self::user_id_to_bytes(pair.low()),
                Self::user_id_to_bytes(pair.high()),
                from.as_str(),
                to.as_str(),
                updated_at as i64,
            ],
        )?;

        Ok(updated == 1)
    }

    fn delete_friendship(
        &mut self,
        pair: &UserPair,
        status: FriendshipStatus,
    ) -> Result<bool, Self::Error> {
        let deleted = self.conn.execute(
            "DELETE FROM friendships WHERE user_low = ?1 AND user_high = ?2 AND status = ?3",
            params![
                Self::user_id_to_bytes(pair.low()),
                Self::user_id_to_bytes(pair.high()),
                status.as_str(),
            ],
        )?;

        Ok(deleted == 1)
    }

    fn pending_for(&self, user: UserId) -> Result<Vec<Friendship>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_COLUMNS} WHERE target_id = ?1 AND status = ?2
             ORDER BY created_at DESC, rowid DESC"
        ))?;

        let friendships = stmt
            .query_map(
                params![
                    Self::user_id_to_bytes(user),
                    FriendshipStatus::Pending.as_str()
                ],
                Self::row_to_friendship,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(friendships)
    }

    fn friendships_involving(&self, user: UserId) -> Result<Vec<Friendship>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_COLUMNS} WHERE initiator_id = ?1 OR target_id = ?1
             ORDER BY created_at DESC, rowid DESC"
        ))?;

        let friendships = stmt
            .query_map(params![Self::user_id_to_bytes(user)], Self::row_to_friendship)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(friendships)
    }
}
