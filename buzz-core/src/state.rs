// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::registry::Registry;
use buzz_error::{Result, TowerError};

/// Everything guarded by a tower's registry lock.
pub(crate) struct TowerState<S> {
    pub(crate) closed: bool,
    pub(crate) registry: Registry<S>,
    pub(crate) rng: fastrand::Rng,
}

impl<S> TowerState<S> {
    pub(crate) fn new(rng: fastrand::Rng) -> Self {
        Self {
            closed: false,
            registry: Registry::new(),
            rng,
        }
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(TowerError::Closed);
        }
        Ok(())
    }

    /// Flips the closed flag exactly once.
    pub(crate) fn mark_closed(&mut self) -> Result<()> {
        if self.closed {
            return Err(TowerError::AlreadyClosed);
        }
        self.closed = true;
        Ok(())
    }
}
