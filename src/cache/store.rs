//! In-memory keyed cache with request de-duplication.

use std::collections::HashMap;
use std::future::Future;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace};

use crate::catalog::{CacheKey, CatalogResult};

use super::entry::{EntryStatus, Snapshot};

/// Result of a spawned loader, tagged with the fetch it belongs to
struct Settlement<V> {
  key: CacheKey,
  generation: u64,
  result: CatalogResult<V>,
}

struct Slot<V> {
  sender: watch::Sender<Snapshot<V>>,
  /// Generation of the fetch whose result this slot will accept
  generation: u64,
  in_flight: bool,
}

impl<V> Slot<V> {
  fn new() -> Self {
    let (sender, _) = watch::channel(Snapshot::pending());
    Self {
      sender,
      generation: 0,
      in_flight: false,
    }
  }

  fn is_fresh(&self) -> bool {
    let snapshot = self.sender.borrow();
    snapshot.status == EntryStatus::Ready && !snapshot.stale
  }
}

/// Cache store owned by the event loop.
///
/// All state changes happen on the owning task: loaders run as spawned tasks
/// and report back over a channel that [`CacheStore::poll`] drains. Each
/// result carries the key and generation it was issued for, so a response can
/// only settle the fetch that requested it. Results for fetches superseded by
/// [`set`](Self::set), [`invalidate`](Self::invalidate) or
/// [`reset`](Self::reset) are dropped.
pub struct CacheStore<V> {
  name: &'static str,
  entries: HashMap<CacheKey, Slot<V>>,
  next_generation: u64,
  tx: mpsc::UnboundedSender<Settlement<V>>,
  rx: mpsc::UnboundedReceiver<Settlement<V>>,
}

impl<V: Send + Sync + 'static> CacheStore<V> {
  /// Create an empty store; `name` only labels log lines.
  pub fn new(name: &'static str) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      name,
      entries: HashMap::new(),
      next_generation: 0,
      tx,
      rx,
    }
  }

  fn bump_generation(&mut self) -> u64 {
    self.next_generation += 1;
    self.next_generation
  }

  /// Current snapshot for `key`, if the key has ever been requested.
  #[allow(dead_code)]
  pub fn get(&self, key: &CacheKey) -> Option<Snapshot<V>> {
    self
      .entries
      .get(key)
      .map(|slot| slot.sender.borrow().clone())
  }


  /// Subscribe to `key`, starting a fetch unless one is unnecessary.
  ///
  /// A fresh `Ready` entry or an in-flight fetch is shared as-is and `loader`
  /// is not called. Otherwise (missing, stale, or failed) the entry goes
  /// `Pending`, keeping any previous value visible, and `loader` is invoked
  /// exactly once.
  pub fn ensure<F, Fut>(&mut self, key: CacheKey, loader: F) -> watch::Receiver<Snapshot<V>>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = CatalogResult<V>> + Send + 'static,
  {
    if let Some(slot) = self.entries.get(&key) {
      if slot.in_flight {
        trace!(store = self.name, %key, "joining in-flight fetch");
        return slot.sender.subscribe();
      }
      if slot.is_fresh() {
        trace!(store = self.name, %key, "cache hit");
        return slot.sender.subscribe();
      }
    }

    let generation = self.bump_generation();
    let slot = self.entries.entry(key.clone()).or_insert_with(Slot::new);
    slot.generation = generation;
    slot.in_flight = true;
    slot.sender.send_modify(|snapshot| {
      snapshot.status = EntryStatus::Pending;
      snapshot.error = None;
    });
    let receiver = slot.sender.subscribe();

    debug!(store = self.name, %key, generation, "cache miss, fetching");
    let future = loader();
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = future.await;
      // Receiver is gone only when the store itself was dropped
      let _ = tx.send(Settlement {
        key,
        generation,
        result,
      });
    });

    receiver
  }

  /// Write a known-fresh value, superseding any fetch in flight for `key`.
  pub fn set(&mut self, key: CacheKey, value: V) {
    let generation = self.bump_generation();
    let slot = self.entries.entry(key.clone()).or_insert_with(Slot::new);
    slot.generation = generation;
    slot.in_flight = false;
    slot.sender.send_replace(Snapshot::ready(value));
    debug!(store = self.name, %key, "cache entry written directly");
  }

  /// Mark every entry matching `predicate` stale, returning how many matched.
  ///
  /// Stale values stay visible to subscribers; the next `ensure` refetches.
  /// A fetch in flight for a matching key is abandoned and its response is
  /// dropped on arrival.
  pub fn invalidate<P>(&mut self, predicate: P) -> usize
  where
    P: Fn(&CacheKey) -> bool,
  {
    let mut count = 0;
    let mut next_generation = self.next_generation;
    for (key, slot) in self.entries.iter_mut().filter(|(key, _)| predicate(*key)) {
      if slot.in_flight {
        next_generation += 1;
        slot.generation = next_generation;
        slot.in_flight = false;
        trace!(store = self.name, %key, "abandoning in-flight fetch");
      }
      slot.sender.send_modify(|snapshot| snapshot.stale = true);
      count += 1;
    }
    self.next_generation = next_generation;

    if count > 0 {
      info!(store = self.name, count, "invalidated cache entries");
    }
    count
  }

  /// Drop every entry nobody is watching and invalidate the rest.
  pub fn reset(&mut self) {
    let before = self.entries.len();
    self.entries.retain(|_, slot| slot.sender.receiver_count() > 0);
    let dropped = before - self.entries.len();
    self.invalidate(|_| true);
    info!(store = self.name, dropped, "cache reset");
  }

  #[cfg(test)]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Keys that are stale, idle and still watched by at least one subscriber.
  pub fn stale_observed_keys(&self) -> Vec<CacheKey> {
    self
      .entries
      .iter()
      .filter(|(_, slot)| {
        !slot.in_flight && slot.sender.borrow().stale && slot.sender.receiver_count() > 0
      })
      .map(|(key, _)| key.clone())
      .collect()
  }

  /// Apply every settled fetch. Returns `true` if any entry changed.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;

    while let Ok(settlement) = self.rx.try_recv() {
      let Settlement {
        key,
        generation,
        result,
      } = settlement;

      let Some(slot) = self.entries.get_mut(&key) else {
        debug!(store = self.name, %key, "discarding response for dropped entry");
        continue;
      };
      if !slot.in_flight || slot.generation != generation {
        debug!(store = self.name, %key, generation, "discarding superseded response");
        continue;
      }

      slot.in_flight = false;
      match result {
        Ok(value) => {
          debug!(store = self.name, %key, "fetch settled");
          slot.sender.send_replace(Snapshot::ready(value));
        }
        Err(error) => {
          info!(store = self.name, %key, %error, "fetch failed");
          slot.sender.send_modify(|snapshot| {
            snapshot.status = EntryStatus::Error;
            snapshot.error = Some(error);
            snapshot.stale = false;
          });
        }
      }
      changed = true;
    }

    changed
  }
}
