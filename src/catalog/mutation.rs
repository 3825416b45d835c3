//! Record updates and the cache bookkeeping that follows them.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use crate::cache::CacheStore;

use super::client::CatalogApi;
use super::descriptor::CacheKey;
use super::error::{CatalogError, CatalogResult};
use super::types::{Book, BookPage};

/// Per-record edit state.
///
/// `Succeeded` and `Failed` hold the last outcome until it is acknowledged,
/// which returns the record to `Idle`. Neither blocks a new submit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MutationState {
  #[default]
  Idle,
  /// Write in flight; further submits for the record are rejected
  Submitting,
  Succeeded,
  Failed(CatalogError),
}

/// Handle to one submitted update.
#[derive(Debug)]
pub struct MutationTicket {
  id: String,
  outcome: oneshot::Receiver<CatalogResult<Book>>,
}

impl MutationTicket {
  /// Non-blocking check, for callers driven by the event loop tick.
  pub fn try_outcome(&mut self) -> Option<CatalogResult<Book>> {
    match self.outcome.try_recv() {
      Ok(result) => Some(result),
      Err(oneshot::error::TryRecvError::Empty) => None,
      Err(oneshot::error::TryRecvError::Closed) => Some(Err(abandoned(&self.id))),
    }
  }

  /// Wait for the write to settle and its cache effects to be applied.
  pub async fn outcome(self) -> CatalogResult<Book> {
    let id = self.id;
    self.outcome.await.unwrap_or_else(|_| Err(abandoned(&id)))
  }
}

fn abandoned(id: &str) -> CatalogError {
  CatalogError::Network(format!("update of book {} was abandoned", id))
}

/// Runs record writes and keeps the caches consistent with them.
///
/// On success the echoed record replaces the detail entry and every list
/// entry is invalidated, since any edited field can change which page a book
/// lands on. On failure the caches are left alone.
pub struct MutationCoordinator {
  states: HashMap<String, MutationState>,
  waiters: HashMap<String, oneshot::Sender<CatalogResult<Book>>>,
  tx: mpsc::UnboundedSender<(String, CatalogResult<Book>)>,
  rx: mpsc::UnboundedReceiver<(String, CatalogResult<Book>)>,
}

impl Default for MutationCoordinator {
  fn default() -> Self {
    Self::new()
  }
}

impl MutationCoordinator {
  pub fn new() -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      states: HashMap::new(),
      waiters: HashMap::new(),
      tx,
      rx,
    }
  }

  pub fn state(&self, id: &str) -> MutationState {
    self.states.get(id).cloned().unwrap_or_default()
  }

  /// Clear a settled outcome. A write still in flight is left alone.
  pub fn acknowledge(&mut self, id: &str) {
    if self.state(id) != MutationState::Submitting {
      self.states.remove(id);
    }
  }

  /// Validate and send a full-record replace.
  ///
  /// Validation failures and duplicate submits are returned immediately and
  /// touch neither the network nor the cache.
  pub fn submit(&mut self, api: Arc<dyn CatalogApi>, book: Book) -> CatalogResult<MutationTicket> {
    book.validate()?;

    if self.state(&book.id) == MutationState::Submitting {
      warn!(id = %book.id, "update rejected, previous save still in flight");
      return Err(CatalogError::SubmitInProgress(book.id));
    }

    let id = book.id.clone();
    info!(%id, "submitting update");
    self.states.insert(id.clone(), MutationState::Submitting);

    let (done_tx, done_rx) = oneshot::channel();
    self.waiters.insert(id.clone(), done_tx);

    let tx = self.tx.clone();
    let task_id = id.clone();
    tokio::spawn(async move {
      let result = api.update_book(&book).await;
      let _ = tx.send((task_id, result));
    });

    Ok(MutationTicket {
      id,
      outcome: done_rx,
    })
  }

  /// Apply settled writes to the caches. Returns `true` if any settled.
  pub fn poll(&mut self, details: &mut CacheStore<Book>, lists: &mut CacheStore<BookPage>) -> bool {
    let mut changed = false;

    while let Ok((id, result)) = self.rx.try_recv() {
      let state = match &result {
        Ok(book) => {
          details.set(CacheKey::detail(id.clone()), book.clone());
          let invalidated = lists.invalidate(CacheKey::is_list);
          info!(%id, invalidated, "update saved");
          MutationState::Succeeded
        }
        Err(error) => {
          warn!(%id, %error, "update failed");
          MutationState::Failed(error.clone())
        }
      };
      self.states.insert(id.clone(), state);

      if let Some(waiter) = self.waiters.remove(&id) {
        let _ = waiter.send(result);
      }
      changed = true;
    }

    changed
  }
}
