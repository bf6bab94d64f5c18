// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Error taxonomy for the conduit core. Fatal kinds escape construction;
// non-fatal kinds (PayloadTooLarge, TimedOut) are reported through
// ordinary Result/Option values at the call site instead of here.

use std::io;

/// The full error taxonomy surfaced by the conduit core.
#[derive(Debug, thiserror::Error)]
pub enum ConduitError {
    /// A publisher tried to create a region whose name is already in use.
    #[error("shared memory region for topic '{topic}' already exists")]
    RegionAlreadyExists { topic: String },

    /// A subscriber tried to open a region no publisher has created yet.
    #[error("shared memory region for topic '{topic}' not found")]
    RegionNotFound { topic: String },

    /// Any other OS failure during create/open/truncate/map.
    #[error("OS failure on shared memory region for topic '{topic}': {source}")]
    RegionOsFailure { topic: String, source: io::Error },

    /// The topic already has `max_subscribers` attached readers.
    #[error("topic '{topic}' has no free subscriber slots")]
    NoSubscriberSlots { topic: String },

    /// `publish` was called with a payload the ring cannot hold.
    #[error("payload of {len} bytes exceeds the slot capacity of {max} bytes")]
    PayloadTooLarge { len: usize, max: usize },

    /// `wait_for` exhausted its deadline with nothing to report.
    #[error("timed out waiting for a message")]
    TimedOut,
}

pub type Result<T> = std::result::Result<T, ConduitError>;
