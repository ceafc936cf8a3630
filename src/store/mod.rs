//! Store Module
//!
//! In-memory mapping from keys to values.
//!
//! ## Responsibilities
//! - Copy keys and values in on insert; own them until overwrite/delete/close
//! - Overwrite in place, preserving slot position
//! - Tombstone deleted slots and reuse them on later inserts
//! - Double the table capacity when a new key arrives and the table is full
//!
//! ## Data Structure Choice
//! A flat slot table scanned linearly (no hashing):
//! - Lookup is O(size); the first live match wins
//! - Deleting never shifts other entries
//! - No internal locking: callers serialize access (see `Dispatcher`)

mod table;

pub use table::{Store, StoreStats};

/// A live key/value pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// A slot in the entry table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Holds a live entry
    Occupied(Entry),

    /// Deleted entry, free for reuse
    Tombstone,
}
