// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities for the buzz towers.
//!
//! Designed for development and testing only, not for production code.
//!
//! - Timed async reads: [`recv_within`], [`assert_no_value_within`]
//! - Non-blocking probes: [`assert_empty`], [`take_pending`]
//! - Reader threads that record when each value arrived: [`spawn_reader`]

use buzz_core::Mailbox;
use buzz_error::TryRecvError;
use std::fmt::Debug;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// A value together with the instant a reader thread took it from its mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received<T> {
    pub value: T,
    pub at: Instant,
}

/// Awaits the next value, giving up after `timeout_ms`.
///
/// Returns `None` on timeout or end-of-stream.
pub async fn recv_within<T>(mailbox: &Mailbox<T>, timeout_ms: u64) -> Option<T> {
    match timeout(Duration::from_millis(timeout_ms), mailbox.recv_async()).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(_)) | Err(_) => None,
    }
}

/// Panics if a value arrives within `timeout_ms`.
pub async fn assert_no_value_within<T: Debug>(mailbox: &Mailbox<T>, timeout_ms: u64) {
    if let Ok(Ok(value)) = timeout(Duration::from_millis(timeout_ms), mailbox.recv_async()).await
    {
        panic!(
            "mailbox '{}' unexpectedly received {value:?}",
            mailbox.identity()
        );
    }
}

/// Panics unless a non-blocking read reports an empty, still-open mailbox.
pub fn assert_empty<T: Debug>(mailbox: &Mailbox<T>) {
    match mailbox.try_recv() {
        Err(TryRecvError::Empty) => {}
        other => panic!(
            "mailbox '{}' expected empty, got {other:?}",
            mailbox.identity()
        ),
    }
}

/// Takes whatever is pending in each mailbox without waiting.
///
/// Returns `(identity, value)` for every mailbox that held a value, in input order.
pub fn take_pending<T>(mailboxes: &[Mailbox<T>]) -> Vec<(String, T)> {
    mailboxes
        .iter()
        .filter_map(|mailbox| {
            mailbox
                .try_recv()
                .ok()
                .map(|value| (mailbox.identity().to_owned(), value))
        })
        .collect()
}

/// Spawns a thread that blocks on `mailbox` for `count` values, optionally pausing
/// `delay` before each read, and records when each one arrived.
///
/// Stops early at end-of-stream.
pub fn spawn_reader<T: Send + 'static>(
    mailbox: Mailbox<T>,
    count: usize,
    delay: Option<Duration>,
) -> JoinHandle<Vec<Received<T>>> {
    thread::spawn(move || {
        let mut received = Vec::with_capacity(count);
        for _ in 0..count {
            if let Some(delay) = delay {
                thread::sleep(delay);
            }
            match mailbox.recv() {
                Ok(value) => received.push(Received {
                    value,
                    at: Instant::now(),
                }),
                Err(_) => break,
            }
        }
        received
    })
}
