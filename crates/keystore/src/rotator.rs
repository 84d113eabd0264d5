//! Round-robin ordering of stored keys.
//!
//! [`KeyRotator`] keeps keys in rotation order: the head is the next key
//! served by an unkeyed lookup, the tail is the most recently served or
//! inserted key.
//!
//! # Representation
//!
//! ```text
//! order: BTreeMap<seq, Arc<Jwk>>      positions: HashMap<kid, seq>
//! ┌─────┬─────┬─────┐                 ┌─────┬─────┐
//! │  3  │  5  │  6  │ ◄──────────────  │ "a" │  3  │
//! │ "a" │ "b" │ "c" │                 │ "b" │  5  │ ...
//! └─────┴─────┴─────┘                 └─────┴─────┘
//!  head            tail
//! ```
//!
//! Every key holds a unique sequence number; moving a key to the tail
//! re-keys it with the next number. Lookups by `kid` go through the position
//! map, so every operation is O(log n) and no shifting occurs.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use crate::jwk::{Jwk, JwkSet};

/// An ordered, `kid`-unique collection of keys with round-robin retrieval.
///
/// The only mutations are [`add`](Self::add) and [`next`](Self::next).
/// Export via [`to_jwk_set`](Self::to_jwk_set) never changes the order.
#[derive(Debug, Default, Clone)]
pub struct KeyRotator {
    /// Keys ordered from head (lowest sequence) to tail.
    order: BTreeMap<u64, Arc<Jwk>>,
    /// Sequence number of each stored `kid`.
    positions: HashMap<String, u64>,
    /// Sequence number handed to the next tail insertion.
    next_seq: u64,
}

impl KeyRotator {
    /// Creates an empty rotator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a key at the tail, replacing any key with the same `kid`.
    ///
    /// Returns the replaced key, if there was one.
    pub fn add(&mut self, key: Arc<Jwk>) -> Option<Arc<Jwk>> {
        let replaced = self.remove(key.kid());
        if replaced.is_some() {
            tracing::debug!(kid = key.kid(), "replacing key with same kid");
        }
        self.push_tail(key);
        replaced
    }

    /// Returns the next key and moves it to the tail.
    ///
    /// With `kid` omitted the head key is selected; otherwise the key with
    /// that `kid`. Returns `None` if the rotator is empty or no key matches.
    pub fn next(&mut self, kid: Option<&str>) -> Option<Arc<Jwk>> {
        let key = match kid {
            None => self.order.pop_first().map(|(_, key)| {
                self.positions.remove(key.kid());
                key
            })?,
            Some(kid) => self.remove(kid)?,
        };
        tracing::trace!(kid = key.kid(), "rotating key to tail");
        self.push_tail(Arc::clone(&key));
        Some(key)
    }

    /// Exports the keys as a JWK Set in current rotation order.
    ///
    /// With `include_private_fields == false` every key is reduced to its
    /// public members.
    #[must_use]
    pub fn to_jwk_set(&self, include_private_fields: bool) -> JwkSet {
        let keys = self
            .order
            .values()
            .map(|key| if include_private_fields { Jwk::clone(key) } else { key.to_public() })
            .collect();
        JwkSet { keys }
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns `true` if a key with this `kid` is stored.
    #[must_use]
    pub fn contains(&self, kid: &str) -> bool {
        self.positions.contains_key(kid)
    }

    /// Returns the stored `kid`s from head to tail.
    pub fn kids(&self) -> impl Iterator<Item = &str> {
        self.order.values().map(|key| key.kid())
    }

    fn remove(&mut self, kid: &str) -> Option<Arc<Jwk>> {
        let seq = self.positions.remove(kid)?;
        self.order.remove(&seq)
    }

    fn push_tail(&mut self, key: Arc<Jwk>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.positions.insert(key.kid().to_owned(), seq);
        self.order.insert(seq, key);
    }
}
