// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Buzz
//!
//! 1:N value broadcasting: one publisher, any number of independently paced
//! subscribers, each reading from a private single-slot [`Mailbox`].
//!
//! ## Overview
//!
//! A tower replaces the shared-state-plus-wakeup pattern of a condition variable
//! with per-subscriber message slots that can be blocked on, awaited, probed, or
//! polled as a stream.
//!
//! - [`AsyncTower`]: `broadcast` overwrites each slot and never blocks.
//!   Appropriate for "the current value is X" state.
//! - [`SyncTower`]: `broadcast` returns only after every subscriber has read.
//!
//! Both expose `signal`, which wakes one subscriber chosen at random, `clear`,
//! which withdraws a pending value, and `close`, which ends every mailbox.
//!
//! ## Quick Start
//!
//! ```rust
//! use buzz::prelude::*;
//! use std::thread;
//!
//! let tower = AsyncTower::new();
//! let mailbox = tower.subscribe("me").unwrap();
//!
//! let reader = thread::spawn(move || mailbox.recv());
//! tower.broadcast(4).unwrap();
//!
//! assert_eq!(reader.join().unwrap(), Ok(4));
//! ```

pub use buzz_core::{AsyncTower, Mailbox, SyncTower};
pub use buzz_error::{RecvError, Result, TowerError, TryRecvError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{AsyncTower, Mailbox, SyncTower, TowerError};
}
