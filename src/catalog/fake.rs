//! In-memory `CatalogApi` that behaves like the json-server resource.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::categories::distinct_sorted;
use super::client::CatalogApi;
use super::descriptor::QueryDescriptor;
use super::error::{CatalogError, CatalogResult};
use super::types::{Book, BookPage, Price};

const CATEGORIES: [&str; 4] = ["Fiction", "History", "Science", "Poetry"];

#[derive(Default)]
pub struct FakeCatalog {
  books: Mutex<Vec<Book>>,
  pub list_calls: AtomicUsize,
  pub detail_calls: AtomicUsize,
  pub category_calls: AtomicUsize,
  pub update_calls: AtomicUsize,
  /// Make every request fail with a network error
  pub offline: AtomicBool,
}

impl FakeCatalog {
  /// `count` books with ids `b001`, `b002`, ... and rotating categories.
  pub fn with_books(count: usize) -> Self {
    let books = (1..=count).map(book).collect();
    Self {
      books: Mutex::new(books),
      ..Self::default()
    }
  }

  pub fn calls(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
  }

  fn check_online(&self) -> CatalogResult<()> {
    if self.offline.load(Ordering::SeqCst) {
      return Err(CatalogError::Network("connection refused".to_string()));
    }
    Ok(())
  }
}

pub fn book(n: usize) -> Book {
  Book {
    id: format!("b{:03}", n),
    title: format!("Book {}", n),
    author: format!("Author {}", n % 3),
    published_year: 1990 + n as i32,
    price: Price::from_cents(500 + n as i64 * 100),
    stock: n as i64 % 7,
    categories: vec![CATEGORIES[n % CATEGORIES.len()].to_string()],
    summary: None,
  }
}

fn matches(book: &Book, query: &QueryDescriptor) -> bool {
  let term_ok = query.search_term().map_or(true, |term| {
    let term = term.to_lowercase();
    book.title.to_lowercase().contains(&term)
      || book.author.to_lowercase().contains(&term)
      || book.categories.iter().any(|c| c.to_lowercase().contains(&term))
  });
  let category_ok = query
    .category_filter()
    .map_or(true, |category| book.categories.iter().any(|c| c == category));
  term_ok && category_ok
}

#[async_trait]
impl CatalogApi for FakeCatalog {
  async fn list_books(&self, query: &QueryDescriptor) -> CatalogResult<BookPage> {
    self.list_calls.fetch_add(1, Ordering::SeqCst);
    self.check_online()?;

    let mut hits: Vec<Book> = {
      let books = self.books.lock().unwrap();
      books.iter().filter(|b| matches(b, query)).cloned().collect()
    };
    hits.sort_by(|a, b| a.id.cmp(&b.id));

    let total_count = hits.len() as u64;
    let start = (query.page.max(1) as usize - 1) * query.limit.max(1) as usize;
    let items = hits
      .into_iter()
      .skip(start)
      .take(query.limit.max(1) as usize)
      .collect();
    Ok(BookPage { items, total_count })
  }

  async fn list_categories(&self) -> CatalogResult<Vec<String>> {
    self.category_calls.fetch_add(1, Ordering::SeqCst);
    self.check_online()?;

    let books = self.books.lock().unwrap();
    Ok(distinct_sorted(books.iter().map(|b| b.categories.clone())))
  }

  async fn get_book(&self, id: &str) -> CatalogResult<Book> {
    self.detail_calls.fetch_add(1, Ordering::SeqCst);
    self.check_online()?;

    let books = self.books.lock().unwrap();
    books
      .iter()
      .find(|b| b.id == id)
      .cloned()
      .ok_or_else(|| CatalogError::NotFound(id.to_string()))
  }

  async fn update_book(&self, book: &Book) -> CatalogResult<Book> {
    self.update_calls.fetch_add(1, Ordering::SeqCst);
    self.check_online()?;

    let mut books = self.books.lock().unwrap();
    let stored = books
      .iter_mut()
      .find(|b| b.id == book.id)
      .ok_or_else(|| CatalogError::NotFound(book.id.clone()))?;
    *stored = book.clone();
    Ok(stored.clone())
  }
}
