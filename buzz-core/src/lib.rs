// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Towers: 1:N value broadcasting through private single-slot mailboxes.
//!
//! A tower is a channel-based replacement for a condition variable. Each subscriber
//! receives its own [`Mailbox`] and reads at its own pace, by blocking, awaiting,
//! probing, or polling it as a stream.
//!
//! - [`AsyncTower`]: latest value wins; the publisher never blocks.
//! - [`SyncTower`]: the publisher blocks until every subscriber has read.

mod logging;
mod registry;
mod slot;
mod state;

pub mod async_tower;
pub mod mailbox;
pub mod sync_tower;

pub use self::async_tower::AsyncTower;
pub use self::mailbox::Mailbox;
pub use self::sync_tower::SyncTower;
pub use buzz_error::{RecvError, Result, TowerError, TryRecvError};
