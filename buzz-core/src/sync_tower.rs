// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Blocking 1:N value tower.
//!
//! A [`SyncTower`] hands each value to every subscriber and returns from
//! `broadcast` only once all of them have read it, the way a condition variable's
//! broadcast wakes every waiter. Slow readers throttle the publisher.
//!
//! A broadcast runs in two phases. Under the registry lock, every mailbox is
//! filled. With the registry lock released, the publisher waits for each
//! subscriber to acknowledge its read. A second publisher lock keeps `broadcast`,
//! `signal` and `clear` of one tower from interleaving.
//!
//! A pending handoff is abandoned, never waited on forever, when its subscriber
//! drops the mailbox, unsubscribes, or the tower is closed. There is no ordering
//! across subscribers: only "all observed before `broadcast` returns" holds.
//!
//! ## Example
//!
//! ```
//! use buzz_core::SyncTower;
//! use std::thread;
//!
//! let tower = SyncTower::new();
//! let mailbox = tower.subscribe("reader").unwrap();
//!
//! let reader = thread::spawn(move || mailbox.recv().unwrap());
//!
//! // Returns once the reader thread has taken the value.
//! assert_eq!(tower.broadcast(7).unwrap(), 1);
//! assert_eq!(reader.join().unwrap(), 7);
//! ```

use crate::logging::{debug_log, trace_log, warn_log};
use crate::mailbox::Mailbox;
use crate::slot::HandoffSlot;
use crate::state::TowerState;
use async_channel::Receiver;
use buzz_error::Result;
use core::fmt;
use parking_lot::Mutex;
use std::sync::Arc;

struct Shared<T> {
    publish: Mutex<()>,
    state: Mutex<TowerState<HandoffSlot<T>>>,
}

/// A 1:N broadcaster whose publisher waits until every subscriber has read.
///
/// See the [module documentation](self) for examples and more details.
pub struct SyncTower<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Clone> SyncTower<T> {
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
            shared: Arc::new(Shared {
                publish: Mutex::new(()),
                state: Mutex::new(TowerState::new(rng)),
            }),
        }
    }

    /// Registers `identity` and returns its mailbox.
    ///
    /// # Errors
    ///
    /// - `TowerError::DuplicateIdentity` if `identity` is already subscribed
    /// - `TowerError::Closed` if the tower has been closed
    pub fn subscribe(&self, identity: &str) -> Result<Mailbox<T>> {
        let mut state = self.shared.state.lock();
        state.ensure_open()?;

        let (slot, mailbox) = HandoffSlot::open(identity);
        state.registry.insert(identity, slot)?;
        debug_log!("subscribed '{}' ({} total)", identity, state.registry.len());
        Ok(mailbox)
    }

    /// Removes `identity`.
    ///
    /// Does not wait for an in-flight broadcast: a publisher waiting on this
    /// subscriber stops waiting, and a value already handed over stays readable.
    ///
    /// # Errors
    ///
    /// Returns `TowerError::NotSubscribed` if `identity` is not registered.
    pub fn unsubscribe(&self, identity: &str) -> Result<()> {
        let mut state = self.shared.state.lock();
        let slot = state.registry.remove(identity)?;
        slot.abandon();

        debug_log!("unsubscribed '{}' ({} left)", identity, state.registry.len());
        Ok(())
    }

    /// Hands `value` to every subscriber, blocking until each has read it.
    ///
    /// Returns the number of subscribers that observed `value`. Handoffs abandoned
    /// by a departing subscriber, and mailboxes that could not be filled, are
    /// skipped without holding up the rest.
    ///
    /// # Errors
    ///
    /// Returns `TowerError::Closed` if the tower has been closed.
    pub fn broadcast(&self, value: T) -> Result<usize> {
        let _publishing = self.shared.publish.lock();

        let pending = {
            let state = self.shared.state.lock();
            state.ensure_open()?;

            let mut pending = Vec::with_capacity(state.registry.len());
            for (identity, slot) in state.registry.iter() {
                match slot.handoff(identity, value.clone()) {
                    Ok(ack) => pending.push((identity.to_owned(), ack)),
                    Err(err) => warn_log!("skipped '{}': {}", identity, err),
                }
            }
            pending
        };

        trace_log!("broadcast handed to {} subscribers", pending.len());
        Ok(await_handoffs(pending))
    }

    /// Hands `value` to one subscriber, chosen uniformly at random, blocking until
    /// it has read it.
    ///
    /// Returns the chosen identity, even if that subscriber left before reading.
    ///
    /// # Errors
    ///
    /// - `TowerError::NoSubscribers` if nobody is subscribed
    /// - `TowerError::Closed` if the tower has been closed
    pub fn signal(&self, value: T) -> Result<String> {
        let _publishing = self.shared.publish.lock();

        let (identity, ack) = {
            let mut state = self.shared.state.lock();
            state.ensure_open()?;

            let TowerState { registry, rng, .. } = &mut *state;
            let (identity, slot) = registry.choose(rng)?;
            let ack = slot.handoff(identity, value)?;
            (identity.to_owned(), ack)
        };

        trace_log!("signalled '{}'", identity);
        await_handoffs(vec![(identity.clone(), ack)]);
        Ok(identity)
    }

    /// Empties every mailbox without filling it, returning how many held a value.
    ///
    /// Waits for an in-flight broadcast to finish first, so it only ever removes
    /// values whose handoff was abandoned.
    pub fn clear(&self) -> usize {
        let _publishing = self.shared.publish.lock();
        let state = self.shared.state.lock();
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
    /// A publisher waiting on acknowledgements is released. Close takes the same
    /// registry lock that guards every fill, so no value is written into a mailbox
    /// while it is being closed.
    ///
    /// # Errors
    ///
    /// Returns `TowerError::AlreadyClosed` on every call after the first.
    pub fn close(&self) -> Result<()> {
        let mut state = self.shared.state.lock();
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
        self.shared.state.lock().closed
    }

    /// Returns the number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.state.lock().registry.len()
    }

    /// Returns `true` if `identity` is currently registered.
    #[must_use]
    pub fn is_subscribed(&self, identity: &str) -> bool {
        self.shared.state.lock().registry.contains(identity)
    }

    /// Registered identities, in subscription order.
    #[must_use]
    pub fn subscribers(&self) -> Vec<String> {
        self.shared.state.lock().registry.identities()
    }
}

// Waits outside the registry lock; returns how many handoffs completed.
fn await_handoffs(pending: Vec<(String, Receiver<()>)>) -> usize {
    let mut observed = 0;
    for (identity, ack) in pending {
        match ack.recv_blocking() {
            Ok(()) => observed += 1,
            Err(_) => warn_log!("handoff to '{}' abandoned", identity),
        }
    }
    observed
}

impl<T: Clone> Default for SyncTower<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SyncTower<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for SyncTower<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("SyncTower")
            .field("subscribers", &state.registry.identities())
            .field("closed", &state.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(debug_assertions))]
    fn broadcast_skips_torn_down_mailbox() {
        let tower = SyncTower::new();
        let a = tower.subscribe("a").unwrap();
        let b = tower.subscribe("b").unwrap();
        {
            let state = tower.shared.state.lock();
            if let Some((_, slot)) = state.registry.iter().find(|(id, _)| *id == "a") {
                slot.close();
            }
        }

        let reader = std::thread::spawn(move || b.recv());
        assert_eq!(tower.broadcast(3), Ok(1));
        assert_eq!(reader.join().unwrap(), Ok(3));
        drop(a);
    }

    #[test]
    fn abandoned_handoffs_are_not_counted() {
        let (_, observed) = async_channel::unbounded::<()>();
        let (ack_tx, acked) = async_channel::unbounded();
        ack_tx.try_send(()).unwrap();
        observed.close();

        let pending = vec![("gone".to_owned(), observed), ("here".to_owned(), acked)];
        assert_eq!(await_handoffs(pending), 1);
    }
}
