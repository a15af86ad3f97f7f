// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
//! Error types for the buzz value-broadcasting towers
//!
//! Tower operations (registry changes, fan-out, teardown) fail with [`TowerError`].
//! Subscribers reading from their mailbox see [`RecvError`] or [`TryRecvError`].
//!
//! # Examples
//!
//! ```
//! use buzz_error::{Result, TowerError};
//!
//! fn leave(identity: &str) -> Result<()> {
//!     Err(TowerError::not_subscribed(identity))
//! }
//!
//! assert!(leave("me").unwrap_err().is_registry_error());
//! ```

/// Root error type for all tower operations
///
/// Every variant is returned to the caller as an ordinary result. `SendOnClosed`
/// marks a broken locking invariant: debug builds panic on it, and release builds
/// skip the affected mailbox while the rest of a fan-out completes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TowerError {
    /// `unsubscribe` named an identity that is not registered
    #[error("Not subscribed: '{identity}'")]
    NotSubscribed {
        /// The identity that was looked up
        identity: String,
    },

    /// `subscribe` named an identity that is already registered
    #[error("Identity already subscribed: '{identity}'")]
    DuplicateIdentity {
        /// The identity that collided
        identity: String,
    },

    /// `signal` was called while nobody is subscribed
    #[error("Signal with no subscribers")]
    NoSubscribers,

    /// `close` was called on a tower that is already closed
    #[error("Tower already closed")]
    AlreadyClosed,

    /// The tower has been closed and rejected the operation
    ///
    /// The check happens under the registry lock, before any mailbox is touched.
    #[error("Tower is closed")]
    Closed,

    /// A fill found the mailbox channel torn down while the tower was still open
    ///
    /// Close and fan-out share one lock, so this indicates a locking bug rather
    /// than a condition callers are expected to recover from.
    #[error("Send on closed mailbox: '{identity}'")]
    SendOnClosed {
        /// The subscriber whose mailbox was torn down
        identity: String,
    },
}

impl TowerError {
    /// Create a not-subscribed error for the given identity
    pub fn not_subscribed(identity: impl Into<String>) -> Self {
        Self::NotSubscribed {
            identity: identity.into(),
        }
    }

    /// Create a duplicate-identity error for the given identity
    pub fn duplicate_identity(identity: impl Into<String>) -> Self {
        Self::DuplicateIdentity {
            identity: identity.into(),
        }
    }

    /// Create a send-on-closed error for the given identity
    pub fn send_on_closed(identity: impl Into<String>) -> Self {
        Self::SendOnClosed {
            identity: identity.into(),
        }
    }

    /// Check if the error describes the shape of the registry
    ///
    /// These are caller mistakes: the wrong identity, or an empty audience.
    #[must_use]
    pub const fn is_registry_error(&self) -> bool {
        matches!(
            self,
            Self::NotSubscribed { .. } | Self::DuplicateIdentity { .. } | Self::NoSubscribers
        )
    }

    /// Check if the error stems from the tower having been closed
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(
            self,
            Self::AlreadyClosed | Self::Closed | Self::SendOnClosed { .. }
        )
    }
}

/// Error returned by a blocking or async mailbox read
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RecvError {
    /// The mailbox was closed and holds no value (end-of-stream)
    #[error("Mailbox closed")]
    Closed,
}

/// Error returned by a non-blocking mailbox read
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TryRecvError {
    /// No value is pending; a blocking read would wait
    #[error("Mailbox empty")]
    Empty,

    /// The mailbox was closed and holds no value (end-of-stream)
    #[error("Mailbox closed")]
    Closed,
}

impl TryRecvError {
    /// Returns `true` if a blocking read would have waited
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns `true` if the mailbox reached end-of-stream
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl From<RecvError> for TryRecvError {
    fn from(_: RecvError) -> Self {
        Self::Closed
    }
}

/// Specialized Result type for tower operations
///
/// # Examples
///
/// ```
/// use buzz_error::Result;
///
/// fn observed() -> Result<usize> {
///     Ok(2)
/// }
/// ```
pub type Result<T> = std::result::Result<T, TowerError>;
