//! Single-slot scheduled task.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A timer with room for exactly one pending deadline.
///
/// Scheduling replaces (aborts) whatever was pending, so two timers are never
/// live at once. Firing is observed by polling, the same way the event loop
/// observes everything else. Each schedule gets a generation number; a fire
/// message from an earlier generation that was already queued when the slot
/// was rescheduled or cancelled is ignored.
pub struct TimerSlot {
  delay: Duration,
  handle: Option<JoinHandle<()>>,
  generation: u64,
  tx: mpsc::UnboundedSender<u64>,
  rx: mpsc::UnboundedReceiver<u64>,
}

impl TimerSlot {
  pub fn new(delay: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      delay,
      handle: None,
      generation: 0,
      tx,
      rx,
    }
  }

  /// Whether a deadline is pending.
  pub fn is_pending(&self) -> bool {
    self.handle.is_some()
  }

  /// (Re)start the timer, replacing any pending deadline.
  pub fn schedule(&mut self) {
    self.cancel();

    let generation = self.generation;
    let delay = self.delay;
    let tx = self.tx.clone();
    self.handle = Some(tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      let _ = tx.send(generation);
    }));
  }

  /// Cancel the pending deadline, if any. Returns `true` if one was pending.
  pub fn cancel(&mut self) -> bool {
    self.generation += 1;
    match self.handle.take() {
      Some(handle) => {
        handle.abort();
        true
      }
      None => false,
    }
  }

  /// Consume a fire of the current deadline. Returns `true` at most once per
  /// schedule.
  pub fn poll_fired(&mut self) -> bool {
    let mut fired = false;
    while let Ok(generation) = self.rx.try_recv() {
      if generation == self.generation && self.handle.is_some() {
        self.handle = None;
        fired = true;
      }
    }
    fired
  }
}

impl Drop for TimerSlot {
  fn drop(&mut self) {
    if let Some(handle) = self.handle.take() {
      handle.abort();
    }
  }
}
