//! The `Catalog` facade: the one object the UI talks to.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::cache::{CacheStore, Snapshot};

use super::client::CatalogApi;
use super::descriptor::{CacheKey, QueryDescriptor};
use super::error::CatalogResult;
use super::mutation::{MutationCoordinator, MutationState, MutationTicket};
use super::types::{Book, BookPage};

pub type ListSnapshot = Snapshot<BookPage>;
pub type DetailSnapshot = Snapshot<Book>;
pub type CategoriesSnapshot = Snapshot<Vec<String>>;

/// Cached, de-duplicated access to the book collection.
///
/// Owned by the event loop. Call [`poll`](Self::poll) on every tick so that
/// settled fetches and writes reach their subscribers.
pub struct Catalog {
  api: Arc<dyn CatalogApi>,
  lists: CacheStore<BookPage>,
  details: CacheStore<Book>,
  categories: CacheStore<Vec<String>>,
  mutations: MutationCoordinator,
}

impl Catalog {
  pub fn new(api: Arc<dyn CatalogApi>) -> Self {
    Self {
      api,
      lists: CacheStore::new("lists"),
      details: CacheStore::new("details"),
      categories: CacheStore::new("categories"),
      mutations: MutationCoordinator::new(),
    }
  }

  /// Subscribe to one page of the listing, fetching it if needed.
  pub fn observe_list(&mut self, query: &QueryDescriptor) -> watch::Receiver<ListSnapshot> {
    let api = self.api.clone();
    let query = query.clone();
    self
      .lists
      .ensure(query.canonicalize(), move || async move { api.list_books(&query).await })
  }

  /// Subscribe to a single book, fetching it if needed.
  pub fn observe_detail(&mut self, id: &str) -> watch::Receiver<DetailSnapshot> {
    let api = self.api.clone();
    let id = id.to_string();
    self
      .details
      .ensure(CacheKey::detail(id.clone()), move || async move { api.get_book(&id).await })
  }

  /// Subscribe to the category index.
  ///
  /// Record updates do not invalidate this entry; only [`reload`](Self::reload)
  /// does.
  pub fn observe_categories(&mut self) -> watch::Receiver<CategoriesSnapshot> {
    let api = self.api.clone();
    self
      .categories
      .ensure(CacheKey::Categories, move || async move { api.list_categories().await })
  }

  pub fn submit_update(&mut self, book: Book) -> CatalogResult<MutationTicket> {
    self.mutations.submit(self.api.clone(), book)
  }

  pub fn mutation_state(&self, id: &str) -> MutationState {
    self.mutations.state(id)
  }

  /// Return a record whose last save has settled to `Idle`.
  pub fn acknowledge_update(&mut self, id: &str) {
    self.mutations.acknowledge(id)
  }

  /// Throw away cached data and refetch whatever is still on screen.
  pub fn reload(&mut self) {
    info!("reloading catalog");
    self.lists.reset();
    self.details.reset();
    self.categories.reset();
    self.revalidate_observed();
  }

  /// Apply settled fetches and writes. Returns `true` if anything changed.
  pub fn poll(&mut self) -> bool {
    let mut changed = self.lists.poll();
    changed |= self.details.poll();
    changed |= self.categories.poll();
    changed |= self.mutations.poll(&mut self.details, &mut self.lists);

    self.revalidate_observed();
    changed
  }

  /// Refetch stale entries that somebody is still looking at.
  fn revalidate_observed(&mut self) {
    for key in self.lists.stale_observed_keys() {
      if let Some(query) = QueryDescriptor::from_key(&key) {
        debug!(%key, "revalidating");
        self.observe_list(&query);
      }
    }
    for key in self.details.stale_observed_keys() {
      if let CacheKey::BookDetail { id } = &key {
        debug!(%key, "revalidating");
        self.observe_detail(id);
      }
    }
    if !self.categories.stale_observed_keys().is_empty() {
      self.observe_categories();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::fake::FakeCatalog;
  use crate::catalog::CatalogError;
  use std::collections::HashSet;

  fn catalog(books: usize) -> (Catalog, Arc<FakeCatalog>) {
    let fake = Arc::new(FakeCatalog::with_books(books));
    (Catalog::new(fake.clone()), fake)
  }

  async fn settle(catalog: &mut Catalog) {
    for _ in 0..20 {
      tokio::task::yield_now().await;
      catalog.poll();
    }
  }

  fn ids(page: &BookPage) -> Vec<String> {
    page.items.iter().map(|b| b.id.clone()).collect()
  }

  #[tokio::test]
  async fn test_last_partial_page() {
    let (mut catalog, _) = catalog(17);
    let rx = catalog.observe_list(&QueryDescriptor::new(8).with_page(3));
    settle(&mut catalog).await;

    let snapshot = rx.borrow().clone();
    let page = snapshot.data().unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.total_count, 17);
    assert_eq!(page.total_pages(8), 3);
  }

  #[tokio::test]
  async fn test_consecutive_pages_are_disjoint_and_contiguous() {
    let (mut catalog, _) = catalog(20);
    let first = catalog.observe_list(&QueryDescriptor::new(8));
    let second = catalog.observe_list(&QueryDescriptor::new(8).with_page(2));
    settle(&mut catalog).await;

    let mut all = ids(first.borrow().data().unwrap());
    all.extend(ids(second.borrow().data().unwrap()));
    let distinct: HashSet<_> = all.iter().collect();
    assert_eq!(distinct.len(), 16);

    let expected: Vec<String> = (1..=16).map(|n| format!("b{:03}", n)).collect();
    assert_eq!(all, expected);
  }

  #[tokio::test]
  async fn test_equivalent_descriptors_share_one_fetch() {
    let (mut catalog, fake) = catalog(12);
    let a = catalog.observe_list(&QueryDescriptor::new(8).with_search(" Book 1 "));
    let b = catalog.observe_list(&QueryDescriptor::new(8).with_search("Book 1").with_category(""));
    settle(&mut catalog).await;

    assert_eq!(FakeCatalog::calls(&fake.list_calls), 1);
    assert_eq!(a.borrow().data(), b.borrow().data());

    // Served from cache on a later visit
    catalog.observe_list(&QueryDescriptor::new(8).with_search("Book 1"));
    assert_eq!(FakeCatalog::calls(&fake.list_calls), 1);
  }

  #[tokio::test]
  async fn test_filtered_listing() {
    let (mut catalog, _) = catalog(12);
    let rx = catalog.observe_list(&QueryDescriptor::new(8).with_category("History"));
    settle(&mut catalog).await;

    let snapshot = rx.borrow().clone();
    let page = snapshot.data().unwrap();
    assert_eq!(page.total_count, 3);
    assert!(page
      .items
      .iter()
      .all(|b| b.categories.contains(&"History".to_string())));
  }

  #[tokio::test]
  async fn test_update_refetches_observed_page() {
    let (mut catalog, fake) = catalog(10);
    let list = catalog.observe_list(&QueryDescriptor::new(8));
    settle(&mut catalog).await;
    assert_eq!(FakeCatalog::calls(&fake.list_calls), 1);

    let mut edited = list.borrow().data().unwrap().items[0].clone();
    edited.title = "Renamed".to_string();
    let mut ticket = catalog.submit_update(edited).unwrap();
    assert_eq!(catalog.mutation_state("b001"), MutationState::Submitting);
    settle(&mut catalog).await;

    assert_eq!(ticket.try_outcome().unwrap().unwrap().title, "Renamed");
    assert_eq!(catalog.mutation_state("b001"), MutationState::Succeeded);
    assert_eq!(FakeCatalog::calls(&fake.list_calls), 2);
    assert_eq!(list.borrow().data().unwrap().items[0].title, "Renamed");
    assert!(!list.borrow().stale);

    // Detail entry was written from the echoed record
    let detail = catalog.observe_detail("b001");
    assert_eq!(detail.borrow().data().unwrap().title, "Renamed");
    assert_eq!(FakeCatalog::calls(&fake.detail_calls), 0);
  }

  #[tokio::test]
  async fn test_update_invalidates_unobserved_pages() {
    let (mut catalog, fake) = catalog(20);
    drop(catalog.observe_list(&QueryDescriptor::new(8).with_page(2)));
    settle(&mut catalog).await;

    let mut book = crate::catalog::fake::book(3);
    book.stock = 40;
    catalog.submit_update(book).unwrap();
    settle(&mut catalog).await;
    assert_eq!(FakeCatalog::calls(&fake.list_calls), 1);

    // Stale entry is refetched, not served as ready
    let rx = catalog.observe_list(&QueryDescriptor::new(8).with_page(2));
    assert!(rx.borrow().is_loading());
    settle(&mut catalog).await;

    assert_eq!(FakeCatalog::calls(&fake.list_calls), 2);
    let snapshot = rx.borrow().clone();
    assert!(snapshot.is_ready() && !snapshot.stale);
    assert_eq!(snapshot.data().unwrap().items[0].id, "b009");
  }

  #[tokio::test]
  async fn test_failed_update_leaves_cache_untouched() {
    let (mut catalog, fake) = catalog(5);
    let list = catalog.observe_list(&QueryDescriptor::new(8));
    settle(&mut catalog).await;

    let mut ghost = crate::catalog::fake::book(99);
    ghost.title = "Deleted elsewhere".to_string();
    let mut ticket = catalog.submit_update(ghost).unwrap();
    settle(&mut catalog).await;

    assert_eq!(
      ticket.try_outcome(),
      Some(Err(CatalogError::NotFound("b099".to_string())))
    );
    assert!(matches!(
      catalog.mutation_state("b099"),
      MutationState::Failed(CatalogError::NotFound(_))
    ));
    assert!(!list.borrow().stale);
    assert_eq!(FakeCatalog::calls(&fake.list_calls), 1);
  }

  #[tokio::test]
  async fn test_invalid_update_is_rejected_before_sending() {
    let (mut catalog, fake) = catalog(5);
    let mut book = crate::catalog::fake::book(1);
    book.title.clear();

    let result = catalog.submit_update(book);
    assert!(matches!(result, Err(CatalogError::Validation(_))));
    assert_eq!(catalog.mutation_state("b001"), MutationState::Idle);

    settle(&mut catalog).await;
    assert_eq!(FakeCatalog::calls(&fake.update_calls), 0);
  }

  #[tokio::test]
  async fn test_duplicate_submit_is_rejected() {
    let (mut catalog, fake) = catalog(5);
    let book = crate::catalog::fake::book(2);

    catalog.submit_update(book.clone()).unwrap();
    assert_eq!(
      catalog.submit_update(book.clone()).unwrap_err(),
      CatalogError::SubmitInProgress("b002".to_string())
    );

    settle(&mut catalog).await;
    assert_eq!(FakeCatalog::calls(&fake.update_calls), 1);

    // Resubmitting after settlement is allowed
    assert!(catalog.submit_update(book).is_ok());
  }

  #[tokio::test]
  async fn test_failed_update_returns_to_idle_when_acknowledged() {
    let (mut catalog, fake) = catalog(3);
    fake.offline.store(true, std::sync::atomic::Ordering::SeqCst);
    let book = crate::catalog::fake::book(1);

    catalog.submit_update(book.clone()).unwrap();
    // In flight writes are not cleared
    catalog.acknowledge_update("b001");
    assert_eq!(catalog.mutation_state("b001"), MutationState::Submitting);

    settle(&mut catalog).await;
    assert!(matches!(
      catalog.mutation_state("b001"),
      MutationState::Failed(CatalogError::Network(_))
    ));

    catalog.acknowledge_update("b001");
    assert_eq!(catalog.mutation_state("b001"), MutationState::Idle);

    fake.offline.store(false, std::sync::atomic::Ordering::SeqCst);
    catalog.submit_update(book).unwrap();
    settle(&mut catalog).await;
    assert_eq!(catalog.mutation_state("b001"), MutationState::Succeeded);
  }

  #[tokio::test]
  async fn test_ticket_outcome_resolves_after_poll() {
    let (mut catalog, _) = catalog(3);
    let ticket = catalog.submit_update(crate::catalog::fake::book(1)).unwrap();
    settle(&mut catalog).await;
    assert_eq!(ticket.outcome().await.unwrap().id, "b001");
  }

  #[tokio::test]
  async fn test_missing_detail_is_not_found() {
    let (mut catalog, _) = catalog(3);
    let rx = catalog.observe_detail("b404");
    settle(&mut catalog).await;

    assert!(rx.borrow().is_error());
    assert_eq!(
      rx.borrow().error(),
      Some(&CatalogError::NotFound("b404".to_string()))
    );
  }

  #[tokio::test]
  async fn test_categories_sorted_and_distinct() {
    let (mut catalog, fake) = catalog(10);
    let rx = catalog.observe_categories();
    settle(&mut catalog).await;

    assert_eq!(
      rx.borrow().data().unwrap(),
      &vec!["Fiction", "History", "Poetry", "Science"]
    );

    // Updates leave the category index alone
    let mut book = crate::catalog::fake::book(1);
    book.categories = vec!["Drama".to_string()];
    catalog.submit_update(book).unwrap();
    settle(&mut catalog).await;
    assert_eq!(FakeCatalog::calls(&fake.category_calls), 1);
    assert!(!rx.borrow().stale);
  }

  #[tokio::test]
  async fn test_fetch_error_is_retryable() {
    let (mut catalog, fake) = catalog(3);
    fake.offline.store(true, std::sync::atomic::Ordering::SeqCst);
    let rx = catalog.observe_list(&QueryDescriptor::new(8));
    settle(&mut catalog).await;
    assert!(rx.borrow().is_error());
    assert!(rx.borrow().error().unwrap().is_retryable());

    // Errors are not retried automatically
    assert_eq!(FakeCatalog::calls(&fake.list_calls), 1);

    fake.offline.store(false, std::sync::atomic::Ordering::SeqCst);
    catalog.observe_list(&QueryDescriptor::new(8));
    settle(&mut catalog).await;
    assert!(rx.borrow().is_ready());
  }

  #[tokio::test]
  async fn test_reload_refetches_visible_entries() {
    let (mut catalog, fake) = catalog(10);
    let list = catalog.observe_list(&QueryDescriptor::new(8));
    let _categories = catalog.observe_categories();
    drop(catalog.observe_detail("b002"));
    settle(&mut catalog).await;

    catalog.reload();
    settle(&mut catalog).await;

    assert_eq!(FakeCatalog::calls(&fake.list_calls), 2);
    assert_eq!(FakeCatalog::calls(&fake.category_calls), 2);
    assert_eq!(FakeCatalog::calls(&fake.detail_calls), 1);
    let snapshot = list.borrow().clone();
    assert!(snapshot.is_ready() && !snapshot.stale);
  }
}
