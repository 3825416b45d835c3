//! Query descriptor state for the book list, with debounced search.
//!
//! Typing in the search box should not fire a request per keystroke, while
//! paging and category changes should feel instant. `QueryController` keeps
//! the raw search text (what the input shows) apart from the effective
//! descriptor (what the list is fetched with), and moves the former into the
//! latter either after a quiet interval or immediately on navigation.
//!
//! # Example
//!
//! ```ignore
//! let mut query = QueryController::new(QueryDescriptor::new(8), Duration::from_millis(100));
//!
//! // On each keystroke
//! query.on_search_text_changed("dun");
//!
//! // In event loop tick
//! if let Some(descriptor) = query.poll() {
//!     list = catalog.observe_list(&descriptor);
//! }
//!
//! // On page navigation: commits now, with whatever the input currently holds
//! let descriptor = query.on_page_changed(2).clone();
//! ```

use std::time::Duration;
use tracing::debug;

use crate::catalog::QueryDescriptor;
use crate::timer::TimerSlot;

/// Navigation changes that bypass the debounce delay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryChange {
  Page(u32),
  Category(String),
}

pub struct QueryController {
  effective: QueryDescriptor,
  raw_search: String,
  timer: TimerSlot,
}

impl QueryController {
  pub fn new(initial: QueryDescriptor, quiet_interval: Duration) -> Self {
    Self {
      raw_search: initial.search_text.clone(),
      effective: initial,
      timer: TimerSlot::new(quiet_interval),
    }
  }

  /// The descriptor the list is currently fetched with.
  pub fn descriptor(&self) -> &QueryDescriptor {
    &self.effective
  }

  /// Latest search text as typed, committed or not.
  pub fn raw_search(&self) -> &str {
    &self.raw_search
  }

  /// Whether a debounced search commit is waiting on the timer.
  pub fn has_pending_search(&self) -> bool {
    self.timer.is_pending()
  }

  /// Record a search edit and restart the quiet interval.
  pub fn on_search_text_changed(&mut self, text: impl Into<String>) {
    self.raw_search = text.into();
    self.timer.schedule();
  }

  /// Apply a navigation change now, superseding any pending search commit.
  pub fn on_immediate_change(&mut self, change: QueryChange) -> &QueryDescriptor {
    if self.timer.cancel() {
      debug!("pending search commit folded into navigation change");
    }

    let mut next = self.effective.clone();
    next.search_text = self.raw_search.clone();
    match change {
      QueryChange::Page(page) => next.page = page.max(1),
      QueryChange::Category(category) => {
        next.category = category;
        next.page = 1;
      }
    }

    self.commit(next)
  }

  pub fn on_page_changed(&mut self, page: u32) -> &QueryDescriptor {
    self.on_immediate_change(QueryChange::Page(page))
  }

  pub fn on_category_changed(&mut self, category: impl Into<String>) -> &QueryDescriptor {
    self.on_immediate_change(QueryChange::Category(category.into()))
  }

  /// Commit the pending search once its quiet interval has elapsed.
  ///
  /// Returns the new effective descriptor at most once per quiet interval.
  pub fn poll(&mut self) -> Option<QueryDescriptor> {
    if !self.timer.poll_fired() {
      return None;
    }

    let mut next = self.effective.clone();
    next.search_text = self.raw_search.clone();
    if next.search_term() != self.effective.search_term() {
      // A different search starts from its first page
      next.page = 1;
    }
    Some(self.commit(next).clone())
  }

  fn commit(&mut self, next: QueryDescriptor) -> &QueryDescriptor {
    debug!(key = %next.canonicalize(), "query committed");
    self.effective = next;
    &self.effective
  }
}
