//! Idempotent order cache
//!
//! Maps a client order id to the fingerprint of the request first submitted
//! under it and the venue response that request produced. A repeat submission
//! with an equal fingerprint is answered from the cache without touching the
//! network; an unequal fingerprint is a conflict.
//!
//! ## Concurrency
//!
//! The first caller for an id installs a pending slot and runs the resolver
//! with the lock released. Concurrent callers for the same id and payload
//! subscribe to the slot and wait for its outcome, which is published to all
//! of them whether it succeeded or failed. A failure is not cached: the slot
//! is removed, so only a later call resolves again. If the resolving future
//! is dropped before it settles, no outcome exists and the waiters re-run the
//! protocol.

use crate::error::{FatalError, Result};
use crate::fingerprint::PayloadFingerprint;
use aegis_core::{ClientOrderId, Payload};
use log::{debug, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::watch;

/// Stored outcome of the first successful submission of a client id
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Never changes once stored
    pub fingerprint: PayloadFingerprint,
    /// Latest venue response; replaced after a cancel
    pub response: Payload,
}

enum Slot {
    Pending {
        fingerprint: PayloadFingerprint,
        /// Carries the outcome to every waiter once the resolver settles
        settled: watch::Sender<Option<Result<Payload>>>,
    },
    Resolved(CacheEntry),
}

/// Per-adapter idempotency store
#[derive(Default)]
pub struct IdempotentOrderCache {
    slots: Mutex<HashMap<ClientOrderId, Slot>>,
}

impl IdempotentOrderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached response for `id`, or resolve and cache it
    ///
    /// `resolver` runs once per in-flight resolution of an id, however many
    /// callers race on it; every caller waiting on it gets the same outcome.
    pub async fn remember<F, Fut>(
        &self,
        id: &ClientOrderId,
        request: &Payload,
        resolver: F,
    ) -> Result<Payload>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Payload>>,
    {
        let fingerprint = PayloadFingerprint::of(request);

        loop {
            let mut settled = {
                let mut slots = self.slots.lock();
                match slots.get(id) {
                    Some(Slot::Resolved(entry)) => {
                        if entry.fingerprint != fingerprint {
                            return Err(FatalError::OrderConflict(id.clone()).into());
                        }
                        debug!("Idempotent hit for {}", id);
                        return Ok(entry.response.clone());
                    }
                    Some(Slot::Pending {
                        fingerprint: pending,
                        settled,
                    }) => {
                        if *pending != fingerprint {
                            return Err(FatalError::OrderConflict(id.clone()).into());
                        }
                        settled.subscribe()
                    }
                    None => {
                        let (settled, _) = watch::channel(None);
                        slots.insert(
                            id.clone(),
                            Slot::Pending {
                                fingerprint: fingerprint.clone(),
                                settled,
                            },
                        );
                        break;
                    }
                }
            };
            debug!("Waiting on in-flight resolution of {}", id);
            let outcome = settled
                .wait_for(Option::is_some)
                .await
                .ok()
                .and_then(|outcome| outcome.clone());
            if let Some(outcome) = outcome {
                return outcome;
            }
            // Resolver dropped without an outcome
        }

        let mut pending = PendingSlot {
            cache: self,
            id,
            armed: true,
        };
        let outcome = resolver().await;
        pending.settle(fingerprint, &outcome);
        outcome
    }

    /// Copy of the cached response for `id`
    pub fn get(&self, id: &ClientOrderId) -> Option<Payload> {
        match self.slots.lock().get(id) {
            Some(Slot::Resolved(entry)) => Some(entry.response.clone()),
            _ => None,
        }
    }

    /// Copy of the full entry for `id`
    pub fn entry(&self, id: &ClientOrderId) -> Option<CacheEntry> {
        match self.slots.lock().get(id) {
            Some(Slot::Resolved(entry)) => Some(entry.clone()),
            _ => None,
        }
    }

    /// Replace the response stored for `id`, keeping its fingerprint
    ///
    /// An unknown id is seeded with an empty fingerprint.
    pub fn update(&self, id: &ClientOrderId, response: Payload) {
        let mut slots = self.slots.lock();
        match slots.get_mut(id) {
            Some(Slot::Resolved(entry)) => entry.response = response,
            Some(Slot::Pending { .. }) => {
                warn!("Ignoring update for {}: submission still in flight", id);
            }
            None => {
                slots.insert(
                    id.clone(),
                    Slot::Resolved(CacheEntry {
                        fingerprint: PayloadFingerprint::empty(),
                        response,
                    }),
                );
            }
        }
    }

    /// All resolved ids, sorted
    pub fn keys(&self) -> Vec<ClientOrderId> {
        let mut keys: Vec<_> = self
            .slots
            .lock()
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Resolved(_)))
            .map(|(id, _)| id.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn contains(&self, id: &ClientOrderId) -> bool {
        matches!(self.slots.lock().get(id), Some(Slot::Resolved(_)))
    }

    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Resolved(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Owns a pending slot while its resolver runs
///
/// Dropping it unsettled (the caller's future was dropped) removes the slot
/// and wakes the waiters with no outcome.
struct PendingSlot<'a> {
    cache: &'a IdempotentOrderCache,
    id: &'a ClientOrderId,
    armed: bool,
}

impl PendingSlot<'_> {
    /// Cache a success or drop the slot on failure, then publish the outcome
    fn settle(&mut self, fingerprint: PayloadFingerprint, outcome: &Result<Payload>) {
        let previous = {
            let mut slots = self.cache.slots.lock();
            match outcome {
                Ok(response) => slots.insert(
                    self.id.clone(),
                    Slot::Resolved(CacheEntry {
                        fingerprint,
                        response: response.clone(),
                    }),
                ),
                Err(_) => slots.remove(self.id),
            }
        };
        self.armed = false;
        if let Some(Slot::Pending { settled, .. }) = previous {
            settled.send_replace(Some(outcome.clone()));
        }
    }
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut slots = self.cache.slots.lock();
        if matches!(slots.get(self.id), Some(Slot::Pending { .. })) {
            slots.remove(self.id);
        }
    }
}
