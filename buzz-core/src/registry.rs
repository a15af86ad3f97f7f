// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Subscriber registry shared by both tower variants.
//!
//! Maps each subscriber identity to the write side of its mailbox and keeps a
//! parallel `order` of identities, so Signal can pick a subscriber by index
//! without walking the map.

use buzz_error::{Result, TowerError};
use std::collections::HashMap;

pub(crate) struct Registry<S> {
    slots: HashMap<String, S>,
    order: Vec<String>,
}

impl<S> Registry<S> {
    pub(crate) fn new() -> Self {
        Self {
            slots: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registers `slot` under `identity`, appending it to the selection order.
    pub(crate) fn insert(&mut self, identity: &str, slot: S) -> Result<()> {
        if self.slots.contains_key(identity) {
            return Err(TowerError::duplicate_identity(identity));
        }

        self.slots.insert(identity.to_owned(), slot);
        self.order.push(identity.to_owned());
        Ok(())
    }

    /// Removes `identity`, keeping the relative order of everyone else.
    pub(crate) fn remove(&mut self, identity: &str) -> Result<S> {
        let slot = self
            .slots
            .remove(identity)
            .ok_or_else(|| TowerError::not_subscribed(identity))?;

        if let Some(position) = self.order.iter().position(|id| id == identity) {
            self.order.remove(position);
        }
        Ok(slot)
    }

    pub(crate) fn contains(&self, identity: &str) -> bool {
        self.slots.contains_key(identity)
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn identities(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Iterates `(identity, slot)` pairs in registration order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &S)> {
        self.order
            .iter()
            .filter_map(|id| self.slots.get(id).map(|slot| (id.as_str(), slot)))
    }

    /// Picks one subscriber uniformly at random, drawing a fresh index per call.
    pub(crate) fn choose(&self, rng: &mut fastrand::Rng) -> Result<(&str, &S)> {
        if self.is_empty() {
            return Err(TowerError::NoSubscribers);
        }

        let identity = &self.order[rng.usize(..self.order.len())];
        match self.slots.get(identity) {
            Some(slot) => Ok((identity.as_str(), slot)),
            None => unreachable!("registry order lists '{identity}' without a slot"),
        }
    }
}
