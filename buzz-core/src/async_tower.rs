// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Lossy, non-blocking 1:N value tower.
//!
//! An [`AsyncTower`] gives every subscriber a private single-slot [`Mailbox`].
//! `broadcast` overwrites each slot with the newest value, so the publisher never
//! waits on a slow or absent reader.
//!
//! ## Characteristics
//!
//! - **Latest value wins**: an unread value is replaced, never queued.
//! - **Hot**: late subscribers do not see values broadcast before they subscribed.
//! - **Thread-safe**: cheap to clone; all clones share the same registry.
//! - **Close**: mailboxes report end-of-stream once drained.
//!
//! ## Example
//!
//! ```
//! use buzz_core::AsyncTower;
//! use buzz_error::TryRecvError;
//!
//! let tower = AsyncTower::new();
//! let me = tower.subscribe("me").unwrap();
//! let you = tower.subscribe("you").unwrap();
//!
//! tower.broadcast("bill").unwrap();
//! tower.broadcast("lyle").unwrap();
//!
//! // The older value was overwritten before anybody read it.
//! assert_eq!(me.recv(), Ok("lyle"));
//! assert_eq!(you.recv(), Ok("lyle"));
//!
//! tower.broadcast("swamp").unwrap();
//! tower.clear();
//! assert_eq!(me.try_recv(), Err(TryRecvError::Empty));
//! ```

use crate::logging::{debug_log, trace_log, warn_log};
use crate::mailbox::Mailbox;
use crate::slot::OverwriteSlot;
use crate::state::TowerState;
use buzz_error::Result;
use core::fmt;
use parking_lot::Mutex;
use std::sync::Arc;

/// A 1:N broadcaster whose publisher never blocks.
///
/// See the [module documentation](self) for examples and more details.
pub struct AsyncTower<T> {
    state: Arc<Mutex<TowerState<OverwriteSlot<T>>>>,
}

impl<T: Clone> AsyncTower<T> {
    /// Creates an empty, open tower.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(fastrand::Rng::new())
    }

    /// Creates an empty tower whose `signal` picks are reproducible.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(fastrand::Rng::with_seed(seed))
    }

    fn with_rng(rng: fastrand::Rng) -> Self {
        Self {
            state: Arc::new(Mutex::new(TowerState::new(rng))),
        }
    }

    /// Registers `identity` and returns its mailbox.
    ///
    /// # Errors
    ///
    /// - `TowerError::DuplicateIdentity` if `identity` is already subscribed
    /// - `TowerError::Closed` if the tower has been closed
    pub fn subscribe(&self, identity: &str) -> Result<Mailbox<T>> {
        let mut state = self.state.lock();
        state.ensure_open()?;

        let (slot, mailbox) = OverwriteSlot::open(identity);
        state.registry.insert(identity, slot)?;
        debug_log!("subscribed '{}' ({} total)", identity, state.registry.len());
        Ok(mailbox)
    }

    /// Removes `identity`. Its mailbox keeps any value already delivered, then
    /// reports end-of-stream.
    ///
    /// # Errors
    ///
    /// Returns `TowerError::NotSubscribed` if `identity` is not registered.
    pub fn unsubscribe(&self, identity: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.registry.remove(identity)?;
        debug_log!("unsubscribed '{}' ({} left)", identity, state.registry.len());
        Ok(())
    }

    /// Overwrites every subscriber's mailbox with `value`.
    ///
    /// Returns the number of mailboxes filled. Never waits on a reader. A mailbox
    /// that cannot be filled is skipped and left out of the count, so the rest of
    /// the fan-out still completes.
    ///
    /// # Errors
    ///
    /// Returns `TowerError::Closed` if the tower has been closed.
    pub fn broadcast(&self, value: T) -> Result<usize> {
        let state = self.state.lock();
        state.ensure_open()?;

        let mut filled = 0;
        for (identity, slot) in state.registry.iter() {
            match slot.replace(identity, value.clone()) {
                Ok(()) => filled += 1,
                Err(err) => warn_log!("skipped '{}': {}", identity, err),
            }
        }

        trace_log!("broadcast to {} of {} subscribers", filled, state.registry.len());
        Ok(filled)
    }

    /// Overwrites the mailbox of one subscriber, chosen uniformly at random.
    ///
    /// Returns the identity that received `value`.
    ///
    /// # Errors
    ///
    /// - `TowerError::NoSubscribers` if nobody is subscribed
    /// - `TowerError::Closed` if the tower has been closed
    pub fn signal(&self, value: T) -> Result<String> {
        let mut state = self.state.lock();
        state.ensure_open()?;

        let TowerState { registry, rng, .. } = &mut *state;
        let (identity, slot) = registry.choose(rng)?;
        slot.replace(identity, value)?;

        trace_log!("signalled '{}'", identity);
        Ok(identity.to_owned())
    }

    /// Empties every mailbox without filling it, returning how many held a value.
    ///
    /// Subscribers stay registered; their next read waits for a new broadcast.
    pub fn clear(&self) -> usize {
        let state = self.state.lock();
        let cleared = state
            .registry
            .iter()
            .filter(|(_, slot)| slot.drain())
            .count();

        trace_log!("cleared {} pending values", cleared);
        cleared
    }

    /// Closes the tower and every mailbox it handed out.
    ///
    /// Values already delivered remain readable; reads afterwards report
    /// end-of-stream. Close shares the registry lock with `broadcast` and `signal`,
    /// so no fill can be in progress while mailboxes are closed.
    ///
    /// # Errors
    ///
    /// Returns `TowerError::AlreadyClosed` on every call after the first.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.mark_closed()?;

        for (_, slot) in state.registry.iter() {
            slot.close();
        }

        debug_log!("closed tower with {} subscribers", state.registry.len());
        Ok(())
    }

    /// Returns `true` if the tower has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Returns the number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.state.lock().registry.len()
    }

    /// Returns `true` if `identity` is currently registered.
    #[must_use]
    pub fn is_subscribed(&self, identity: &str) -> bool {
        self.state.lock().registry.contains(identity)
    }

    /// Registered identities, in subscription order.
    #[must_use]
    pub fn subscribers(&self) -> Vec<String> {
        self.state.lock().registry.identities()
    }
}

impl<T: Clone> Default for AsyncTower<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for AsyncTower<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> fmt::Debug for AsyncTower<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("AsyncTower")
            .field("subscribers", &state.registry.identities())
            .field("closed", &state.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tears down one mailbox behind the tower's back.
    fn close_slot(tower: &AsyncTower<u32>, identity: &str) {
        let state = tower.state.lock();
        if let Some((_, slot)) = state.registry.iter().find(|(id, _)| *id == identity) {
            slot.close();
        };
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "fill on closed mailbox 'b'")]
    fn broadcast_to_torn_down_mailbox_panics_in_debug_builds() {
        let tower = AsyncTower::new();
        let _mailboxes: Vec<_> = ["a", "b"].map(|id| tower.subscribe(id).unwrap()).into();
        close_slot(&tower, "b");

        let _ = tower.broadcast(1);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn broadcast_skips_torn_down_mailbox() {
        let tower = AsyncTower::new();
        let mailboxes: Vec<_> = ["a", "b", "c"].map(|id| tower.subscribe(id).unwrap()).into();
        tower.broadcast(1).unwrap();
        close_slot(&tower, "b");

        assert_eq!(tower.broadcast(2), Ok(2));
        assert_eq!(mailboxes[0].try_recv(), Ok(2));
        assert_eq!(mailboxes[2].try_recv(), Ok(2));
    }
}
