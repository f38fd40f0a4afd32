use std::collections::TryReserveError;

use thiserror::Error;

/// Failures reported by the trees and maps in this crate.
///
/// A missing key is never an error: lookups and deletes report it with
/// `None`.  Every error leaves the structure exactly as it was before the
/// call.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// A new key was rejected because the tree already holds `capacity`
    /// entries.  Overwriting an existing key never fails this way.
    #[error("tree is full: capacity of {capacity} entries reached")]
    Full {
        /// The capacity the tree was created with.
        capacity: usize,
    },

    /// Growing node, collector or shard storage failed.
    #[error("memory allocation failed")]
    Alloc,

    /// A sharded map needs at least one shard.
    #[error("shard count must be at least 1")]
    InvalidShardCount,

    /// A bounded tree needs room for at least one entry.
    #[error("capacity must be at least 1")]
    InvalidCapacity,
}

impl From<TryReserveError> for TreeError {
    fn from(_: TryReserveError) -> Self {
        TreeError::Alloc
    }
}
