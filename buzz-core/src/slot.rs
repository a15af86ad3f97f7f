// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Write side of a subscription, retained by the tower and never exposed.
//!
//! Both slot kinds wrap a capacity-1 channel and keep a receiver clone of their own,
//! so the tower can drain a stale value before filling the new one. Every method
//! here is called with the registry lock held.

use crate::mailbox::Mailbox;
use async_channel::{Receiver, Sender, TrySendError};
use buzz_error::{Result, TowerError};

/// Latest-value-wins slot used by [`AsyncTower`](crate::AsyncTower).
pub(crate) struct OverwriteSlot<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> OverwriteSlot<T> {
    pub(crate) fn open(identity: &str) -> (Self, Mailbox<T>) {
        let (tx, rx) = async_channel::bounded(1);
        let mailbox = Mailbox::new(identity, rx.clone(), None);
        (Self { tx, rx }, mailbox)
    }

    /// Removes an unread value, returning whether there was one.
    pub(crate) fn drain(&self) -> bool {
        self.rx.try_recv().is_ok()
    }

    /// Drains, then fills with `value`. Never waits on the subscriber.
    pub(crate) fn replace(&self, identity: &str, value: T) -> Result<()> {
        self.drain();
        fill(&self.tx, identity, value)
    }

    pub(crate) fn close(&self) {
        self.tx.close();
    }
}

/// Handoff slot used by [`SyncTower`](crate::SyncTower).
///
/// Pairs the capacity-1 value channel with an acknowledgement channel that the
/// subscriber's mailbox signals on every read.
pub(crate) struct HandoffSlot<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
    ack: Receiver<()>,
}

impl<T> HandoffSlot<T> {
    pub(crate) fn open(identity: &str) -> (Self, Mailbox<T>) {
        let (tx, rx) = async_channel::bounded(1);
        let (ack_tx, ack) = async_channel::unbounded();
        let mailbox = Mailbox::new(identity, rx.clone(), Some(ack_tx));
        (Self { tx, rx, ack }, mailbox)
    }

    /// Removes an orphaned value along with any acknowledgement not yet consumed.
    pub(crate) fn drain(&self) -> bool {
        while self.ack.try_recv().is_ok() {}
        self.rx.try_recv().is_ok()
    }

    /// Starts a handoff of `value`.
    ///
    /// The returned receiver yields once the subscriber has read the value, and
    /// reports closed if the handoff is abandoned first.
    pub(crate) fn handoff(&self, identity: &str, value: T) -> Result<Receiver<()>> {
        self.drain();
        fill(&self.tx, identity, value)?;
        Ok(self.ack.clone())
    }

    /// Releases a publisher waiting on this slot without closing the value channel.
    pub(crate) fn abandon(&self) {
        self.ack.close();
    }

    pub(crate) fn close(&self) {
        self.tx.close();
        self.ack.close();
    }
}

// Only `close` closes a sender, and it sets the tower's `closed` flag under the
// same lock, so a closed sender here is a locking bug.
fn fill<T>(tx: &Sender<T>, identity: &str, value: T) -> Result<()> {
    debug_assert!(
        !tx.is_closed(),
        "fill on closed mailbox '{identity}' while tower open"
    );
    match tx.try_send(value) {
        Ok(()) => Ok(()),
        Err(TrySendError::Closed(_)) => Err(TowerError::send_on_closed(identity)),
        Err(TrySendError::Full(_)) => {
            unreachable!("mailbox '{identity}' refilled outside the registry lock")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_overwrites_unread_value() {
        let (slot, mailbox) = OverwriteSlot::open("a");
        slot.replace("a", 1).unwrap();
        slot.replace("a", 2).unwrap();

        assert_eq!(mailbox.try_recv(), Ok(2));
        assert!(!slot.drain());
    }

    #[test]
    fn handoff_acknowledges_on_read() {
        let (slot, mailbox) = HandoffSlot::open("a");
        let ack = slot.handoff("a", 7).unwrap();
        assert!(ack.try_recv().is_err());

        assert_eq!(mailbox.try_recv(), Ok(7));
        assert_eq!(ack.try_recv(), Ok(()));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "fill on closed mailbox 'a'")]
    fn fill_after_close_panics_in_debug_builds() {
        let (slot, _mailbox) = OverwriteSlot::open("a");
        slot.close();
        let _ = slot.replace("a", 1);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn fill_after_close_reports_send_on_closed() {
        let (slot, _mailbox) = HandoffSlot::open("a");
        slot.close();

        assert_eq!(
            slot.handoff("a", 1).unwrap_err(),
            TowerError::send_on_closed("a")
        );
    }
}
