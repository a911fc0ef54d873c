//! In-flight registry for request coalescing.
//!
//! When several callers ask for the same cache key while it is being
//! generated, only the first one (the leader) performs the work. Everyone
//! else joins the existing entry and receives the same outcome.
//!
//! # Lifecycle of an entry
//!
//! ```text
//!            begin_or_join()                publish(Ok)           release()
//!   (none) ─────────────────► Pending ──────────────────► Ready ────────────► (none)
//!                               │                          (late joiners get
//!                               │ publish(Err) /            the value at once)
//!                               │ complete_and_release()
//!                               ▼
//!                             (none)
//! ```
//!
//! An entry that holds a finished value stays registered until the leader
//! releases it, so callers arriving while the value is still being
//! persisted coalesce instead of reading a half-written cache entry.
//!
//! The registry is internally synchronized and can be shared across
//! threads through an `Arc`.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::trace;

/// Error returned by [`Waiter::wait`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaitError<E> {
    /// Generation failed; every waiter receives the same error.
    #[error("generation failed")]
    Failed(E),
    /// The entry was released without an outcome.
    #[error("generation ended without an outcome")]
    Abandoned,
}

enum Slot<V, E> {
    Pending(broadcast::Sender<Result<V, E>>),
    Ready(V),
}

/// Result of [`InFlightRegistry::begin_or_join`].
pub enum Admission<V, E> {
    /// A new entry was created; the caller must generate the value and
    /// eventually publish or release it.
    Started(Waiter<V, E>),
    /// An entry already existed; the caller only waits.
    Joined(Waiter<V, E>),
}

impl<V, E> Admission<V, E> {
    /// Returns true if the caller became the leader for the key.
    pub fn is_started(&self) -> bool {
        matches!(self, Admission::Started(_))
    }

    /// Returns the waiter regardless of role.
    pub fn into_waiter(self) -> Waiter<V, E> {
        match self {
            Admission::Started(waiter) | Admission::Joined(waiter) => waiter,
        }
    }
}

/// Receives the outcome of an in-flight generation exactly once.
pub struct Waiter<V, E> {
    inner: WaiterInner<V, E>,
}

enum WaiterInner<V, E> {
    Pending(broadcast::Receiver<Result<V, E>>),
    Ready(V),
}

impl<V: Clone, E: Clone> Waiter<V, E> {
    /// Waits for the outcome.
    pub async fn wait(self) -> Result<V, WaitError<E>> {
        match self.inner {
            WaiterInner::Ready(value) => Ok(value),
            WaiterInner::Pending(mut rx) => match rx.recv().await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(WaitError::Failed(e)),
                Err(_) => Err(WaitError::Abandoned),
            },
        }
    }
}

/// Registry of generations in progress, keyed by cache key.
///
/// Guarantees at most one entry per key at any time.
pub struct InFlightRegistry<V, E> {
    entries: DashMap<String, Slot<V, E>>,
}

impl<V: Clone, E: Clone> InFlightRegistry<V, E> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Registers interest in `key`.
    ///
    /// Creates a new entry and returns [`Admission::Started`] if none
    /// exists; otherwise joins the existing entry.
    pub fn begin_or_join(&self, key: &str) -> Admission<V, E> {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(entry) => {
                trace!(key, "Joining in-flight generation");
                let waiter = match entry.get() {
                    Slot::Pending(tx) => WaiterInner::Pending(tx.subscribe()),
                    Slot::Ready(value) => WaiterInner::Ready(value.clone()),
                };
                Admission::Joined(Waiter { inner: waiter })
            }
            Entry::Vacant(entry) => {
                trace!(key, "Starting generation");
                let (tx, rx) = broadcast::channel(1);
                entry.insert(Slot::Pending(tx));
                Admission::Started(Waiter {
                    inner: WaiterInner::Pending(rx),
                })
            }
        }
    }

    /// Delivers an outcome to every current waiter.
    ///
    /// A successful value stays registered until [`release`](Self::release)
    /// so later callers still coalesce. A failure removes the entry at once
    /// so the next caller can retry.
    pub fn publish(&self, key: &str, result: Result<V, E>) {
        let pending = match result {
            Ok(value) => match self.entries.get_mut(key) {
                Some(mut slot) => {
                    match std::mem::replace(&mut *slot, Slot::Ready(value.clone())) {
                        Slot::Pending(tx) => Some((tx, Ok(value))),
                        Slot::Ready(_) => None,
                    }
                }
                None => None,
            },
            Err(e) => match self.entries.remove(key) {
                Some((_, Slot::Pending(tx))) => Some((tx, Err(e))),
                _ => None,
            },
        };

        // Send outside the map lock.
        if let Some((tx, outcome)) = pending {
            let _ = tx.send(outcome);
        }
    }

    /// Removes the entry for `key`.
    ///
    /// Waiters of an entry that never received an outcome observe
    /// [`WaitError::Abandoned`].
    pub fn release(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Delivers an outcome to every waiter and removes the entry.
    pub fn complete_and_release(&self, key: &str, result: Result<V, E>) {
        if let Some((_, Slot::Pending(tx))) = self.entries.remove(key) {
            let _ = tx.send(result);
        }
    }

    /// Returns true if a generation for `key` is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of registered generations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone, E: Clone> Default for InFlightRegistry<V, E> {
    fn default() -> Self {
        Self::new()
    }
}
