//! Snapshot types handed to cache subscribers.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::catalog::CatalogError;

/// Lifecycle of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
  /// A fetch is in flight (any previous value is still visible)
  Pending,
  /// The last fetch succeeded
  Ready,
  /// The last fetch failed; retry is an explicit action
  Error,
}

/// Point-in-time view of one cache entry.
///
/// Snapshots are replaced wholesale on every transition, so a reader never
/// sees a value from one fetch paired with the status of another.
pub struct Snapshot<V> {
  pub status: EntryStatus,
  /// Most recent successfully fetched (or directly written) value
  pub value: Option<Arc<V>>,
  /// Failure reason when `status` is `Error`
  pub error: Option<CatalogError>,
  /// When `value` was stored
  pub fetched_at: Option<Instant>,
  /// The entry was invalidated and `value` may be out of date
  pub stale: bool,
}

impl<V> Snapshot<V> {
  pub(super) fn pending() -> Self {
    Self {
      status: EntryStatus::Pending,
      value: None,
      error: None,
      fetched_at: None,
      stale: false,
    }
  }

  pub(super) fn ready(value: V) -> Self {
    Self {
      status: EntryStatus::Ready,
      value: Some(Arc::new(value)),
      error: None,
      fetched_at: Some(Instant::now()),
      stale: false,
    }
  }

  pub fn is_loading(&self) -> bool {
    self.status == EntryStatus::Pending
  }

  #[cfg(test)]
  pub fn is_ready(&self) -> bool {
    self.status == EntryStatus::Ready
  }

  pub fn is_error(&self) -> bool {
    self.status == EntryStatus::Error
  }

  pub fn data(&self) -> Option<&V> {
    self.value.as_deref()
  }

  pub fn error(&self) -> Option<&CatalogError> {
    self.error.as_ref()
  }
}

// Manual impl: cloning shares the Arc, so `V` need not be `Clone`.
impl<V> Clone for Snapshot<V> {
  fn clone(&self) -> Self {
    Self {
      status: self.status,
      value: self.value.clone(),
      error: self.error.clone(),
      fetched_at: self.fetched_at,
      stale: self.stale,
    }
  }
}

impl<V: fmt::Debug> fmt::Debug for Snapshot<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Snapshot")
      .field("status", &self.status)
      .field("value", &self.value)
      .field("error", &self.error)
      .field("stale", &self.stale)
      .finish_non_exhaustive()
  }
}
