//! Query descriptors and the canonical cache keys derived from them.

use std::fmt;

/// Category value meaning "no category filter"
pub const ALL_CATEGORIES: &str = "all";

/// Books per page when nothing else is configured
pub const DEFAULT_PAGE_SIZE: u32 = 8;

/// One collection fetch intent: which page of which filtered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
  /// 1-based page number
  pub page: u32,
  /// Page size
  pub limit: u32,
  /// Free-text search; surrounding whitespace is insignificant
  pub search_text: String,
  /// Category label, or [`ALL_CATEGORIES`]
  pub category: String,
}

#[cfg(test)]
impl QueryDescriptor {
  pub fn with_page(mut self, page: u32) -> Self {
    self.page = page.max(1);
    self
  }

  pub fn with_search(mut self, text: impl Into<String>) -> Self {
    self.search_text = text.into();
    self
  }

  pub fn with_category(mut self, category: impl Into<String>) -> Self {
    self.category = category.into();
    self
  }
}

impl Default for QueryDescriptor {
  fn default() -> Self {
    Self::new(DEFAULT_PAGE_SIZE)
  }
}

impl QueryDescriptor {
  /// First page, no search, all categories.
  pub fn new(limit: u32) -> Self {
    Self {
      page: 1,
      limit: limit.max(1),
      search_text: String::new(),
      category: ALL_CATEGORIES.to_string(),
    }
  }

  /// Trimmed search text, or `None` when there is nothing to search for.
  pub fn search_term(&self) -> Option<&str> {
    let term = self.search_text.trim();
    (!term.is_empty()).then_some(term)
  }

  /// Category to filter on, or `None` for the "all" sentinel.
  pub fn category_filter(&self) -> Option<&str> {
    let category = self.category.trim();
    if category.is_empty() || category == ALL_CATEGORIES {
      None
    } else {
      Some(category)
    }
  }

  /// Derive the cache key for this descriptor.
  ///
  /// Equivalent descriptors (padded search text, "all" vs no category) map to
  /// the same key.
  pub fn canonicalize(&self) -> CacheKey {
    CacheKey::BookList {
      page: self.page.max(1),
      limit: self.limit.max(1),
      search: self.search_term().map(String::from),
      category: self.category_filter().map(String::from),
    }
  }

  /// Rebuild the descriptor a list key was derived from.
  pub fn from_key(key: &CacheKey) -> Option<Self> {
    match key {
      CacheKey::BookList {
        page,
        limit,
        search,
        category,
      } => Some(Self {
        page: *page,
        limit: *limit,
        search_text: search.clone().unwrap_or_default(),
        category: category
          .clone()
          .unwrap_or_else(|| ALL_CATEGORIES.to_string()),
      }),
      _ => None,
    }
  }
}

/// Key of one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
  /// One page of a (possibly filtered) book listing
  BookList {
    page: u32,
    limit: u32,
    search: Option<String>,
    category: Option<String>,
  },
  /// A single book by id
  BookDetail { id: String },
  /// The distinct category labels across the whole collection
  Categories,
}

impl CacheKey {
  pub fn detail(id: impl Into<String>) -> Self {
    CacheKey::BookDetail { id: id.into() }
  }

  pub fn is_list(&self) -> bool {
    matches!(self, CacheKey::BookList { .. })
  }
}

impl fmt::Display for CacheKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CacheKey::BookList {
        page,
        limit,
        search,
        category,
      } => {
        write!(f, "books?page={}&limit={}", page, limit)?;
        if let Some(q) = search {
          write!(f, "&q={}", q)?;
        }
        if let Some(c) = category {
          write!(f, "&category={}", c)?;
        }
        Ok(())
      }
      CacheKey::BookDetail { id } => write!(f, "books/{}", id),
      CacheKey::Categories => write!(f, "categories"),
    }
  }
}
