// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Read side of a subscription.
//!
//! A [`Mailbox`] holds at most one pending value. It can be read by blocking the
//! current thread, by awaiting, with a non-blocking probe, or as a [`Stream`]:
//!
//! ```
//! use buzz_core::AsyncTower;
//! use buzz_error::TryRecvError;
//!
//! let tower = AsyncTower::new();
//! let mailbox = tower.subscribe("me").unwrap();
//!
//! assert_eq!(mailbox.try_recv(), Err(TryRecvError::Empty));
//!
//! tower.broadcast(4).unwrap();
//! assert_eq!(mailbox.recv(), Ok(4));
//! ```

use async_channel::{Receiver, Sender};
use buzz_error::{RecvError, TryRecvError};
use core::fmt;
use core::pin::Pin;
use core::task::{Context, Poll};
use futures::Stream;

/// A subscriber's private, single-slot receive handle.
///
/// Only the tower that created the mailbox writes to it. Once the subscriber is
/// unsubscribed, or the tower is closed, values already delivered stay readable
/// and every read afterwards reports end-of-stream.
///
/// Mailboxes handed out by a [`SyncTower`](crate::SyncTower) acknowledge each read
/// back to the publisher, which is what lets `broadcast` return only after every
/// subscriber has observed the value. Dropping such a mailbox releases any
/// publisher waiting on it.
pub struct Mailbox<T> {
    identity: String,
    rx: Pin<Box<Receiver<T>>>,
    ack: Option<Sender<()>>,
}

impl<T> Mailbox<T> {
    pub(crate) fn new(identity: &str, rx: Receiver<T>, ack: Option<Sender<()>>) -> Self {
        Self {
            identity: identity.to_owned(),
            rx: Box::pin(rx),
            ack,
        }
    }

    /// The identity this mailbox was subscribed under.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Blocks the current thread until a value arrives.
    ///
    /// # Errors
    ///
    /// Returns [`RecvError::Closed`] once the mailbox is closed and empty.
    pub fn recv(&self) -> Result<T, RecvError> {
        match self.rx.recv_blocking() {
            Ok(value) => Ok(self.acknowledge(value)),
            Err(_) => Err(RecvError::Closed),
        }
    }

    /// Waits asynchronously until a value arrives.
    ///
    /// # Errors
    ///
    /// Returns [`RecvError::Closed`] once the mailbox is closed and empty.
    pub async fn recv_async(&self) -> Result<T, RecvError> {
        match self.rx.recv().await {
            Ok(value) => Ok(self.acknowledge(value)),
            Err(_) => Err(RecvError::Closed),
        }
    }

    /// Takes the pending value, if any, without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`TryRecvError::Empty`] when nothing is pending and
    /// [`TryRecvError::Closed`] once the mailbox is closed and empty.
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        match self.rx.try_recv() {
            Ok(value) => Ok(self.acknowledge(value)),
            Err(async_channel::TryRecvError::Empty) => Err(TryRecvError::Empty),
            Err(async_channel::TryRecvError::Closed) => Err(TryRecvError::Closed),
        }
    }

    /// Returns `true` if no value is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Returns `true` once the tower will never write to this mailbox again.
    ///
    /// A closed mailbox may still hold one last value.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.rx.is_closed()
    }

    fn acknowledge(&self, value: T) -> T {
        if let Some(ack) = &self.ack {
            // Fails only when the publisher already abandoned this handoff.
            let _ = ack.try_send(());
        }
        value
    }
}

impl<T> Stream for Mailbox<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.rx.as_mut().poll_next(cx) {
            Poll::Ready(Some(value)) => Poll::Ready(Some(this.acknowledge(value))),
            other => other,
        }
    }
}

impl<T> fmt::Debug for Mailbox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailbox")
            .field("identity", &self.identity)
            .field("pending", &self.rx.len())
            .field("closed", &self.rx.is_closed())
            .field("handoff", &self.ack.is_some())
            .finish()
    }
}
