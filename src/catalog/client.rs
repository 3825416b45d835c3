//! Fetch executor: turns query descriptors into requests against the
//! `/books` resource and parses the responses.

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiConfig;

use super::api_types::{ApiBook, ApiCategoriesRow};
use super::categories::distinct_sorted;
use super::descriptor::QueryDescriptor;
use super::error::{CatalogError, CatalogResult};
use super::types::{Book, BookPage};

/// Response header carrying the number of matches across all pages
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Remote operations the cache layer depends on.
#[async_trait]
pub trait CatalogApi: Send + Sync + 'static {
  /// One page of books matching the descriptor, in ascending id order.
  async fn list_books(&self, query: &QueryDescriptor) -> CatalogResult<BookPage>;

  /// Sorted distinct category labels across the whole collection.
  async fn list_categories(&self) -> CatalogResult<Vec<String>>;

  async fn get_book(&self, id: &str) -> CatalogResult<Book>;

  /// Replace the stored record with `book`, returning the record as stored.
  async fn update_book(&self, book: &Book) -> CatalogResult<Book>;
}

/// HTTP client for a json-server style `/books` resource
#[derive(Clone)]
pub struct HttpCatalog {
  client: reqwest::Client,
  base: Url,
}

impl HttpCatalog {
  pub fn new(config: &ApiConfig) -> Result<Self> {
    let base = Url::parse(&config.url)
      .map_err(|e| eyre!("Invalid API url '{}': {}", config.url, e))?;
    if base.cannot_be_a_base() {
      return Err(eyre!("API url '{}' cannot have a path", config.url));
    }

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client, base })
  }

  pub fn base_url(&self) -> &Url {
    &self.base
  }

  fn endpoint(&self, segments: &[&str]) -> Url {
    let mut url = self.base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }

  /// Build the listing URL for a descriptor.
  ///
  /// Always carries an explicit ascending id sort so page boundaries stay
  /// put between requests.
  pub fn list_url(&self, query: &QueryDescriptor) -> Url {
    let mut url = self.endpoint(&["books"]);
    {
      let mut pairs = url.query_pairs_mut();
      pairs
        .append_pair("_page", &query.page.max(1).to_string())
        .append_pair("_limit", &query.limit.max(1).to_string())
        .append_pair("_sort", "id")
        .append_pair("_order", "asc");
      if let Some(term) = query.search_term() {
        pairs.append_pair("q", term);
      }
      if let Some(category) = query.category_filter() {
        pairs.append_pair("categories", category);
      }
    }
    url
  }

  pub fn categories_url(&self) -> Url {
    let mut url = self.endpoint(&["books"]);
    url.query_pairs_mut().append_pair("_fields", "categories");
    url
  }

  pub fn book_url(&self, id: &str) -> Url {
    self.endpoint(&["books", id])
  }
}

#[async_trait]
impl CatalogApi for HttpCatalog {
  async fn list_books(&self, query: &QueryDescriptor) -> CatalogResult<BookPage> {
    let url = self.list_url(query);
    debug!(%url, "fetching book page");

    let response = check_status(self.client.get(url).send().await?, None)?;
    let total_count = parse_total_count(response.headers())?;
    let books: Vec<ApiBook> = read_json(response).await?;

    Ok(BookPage {
      items: books.into_iter().map(Book::from).collect(),
      total_count,
    })
  }

  async fn list_categories(&self) -> CatalogResult<Vec<String>> {
    let url = self.categories_url();
    debug!(%url, "fetching category index");

    let response = check_status(self.client.get(url).send().await?, None)?;
    let rows: Vec<ApiCategoriesRow> = read_json(response).await?;
    Ok(distinct_sorted(rows.into_iter().map(|row| row.categories)))
  }

  async fn get_book(&self, id: &str) -> CatalogResult<Book> {
    let url = self.book_url(id);
    debug!(%url, "fetching book");

    let response = check_status(self.client.get(url).send().await?, Some(id))?;
    let book: ApiBook = read_json(response).await?;
    Ok(book.into())
  }

  async fn update_book(&self, book: &Book) -> CatalogResult<Book> {
    let url = self.book_url(&book.id);
    debug!(%url, "updating book");

    // PUT never creates on this resource, so a deleted record comes back as 404
    let body = serde_json::to_vec(&ApiBook::from(book))?;
    let response = self
      .client
      .put(url)
      .header(CONTENT_TYPE, "application/json")
      .body(body)
      .send()
      .await?;
    let response = check_status(response, Some(&book.id))?;
    let stored: ApiBook = read_json(response).await?;
    Ok(stored.into())
  }
}

/// Map non-success statuses onto the error taxonomy.
fn check_status(response: Response, record_id: Option<&str>) -> CatalogResult<Response> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }
  match (status, record_id) {
    (StatusCode::NOT_FOUND, Some(id)) => Err(CatalogError::NotFound(id.to_string())),
    _ => {
      warn!(%status, url = %response.url(), "request failed");
      Err(CatalogError::Network(format!("server responded {}", status)))
    }
  }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> CatalogResult<T> {
  let bytes = response.bytes().await?;
  Ok(serde_json::from_slice(&bytes)?)
}

/// Read the out-of-band match count from the response headers.
///
/// A missing or non-numeric header is a parse failure.
pub fn parse_total_count(headers: &HeaderMap) -> CatalogResult<u64> {
  let value = headers
    .get(TOTAL_COUNT_HEADER)
    .ok_or_else(|| CatalogError::Parse(format!("missing {} header", TOTAL_COUNT_HEADER)))?;

  value
    .to_str()
    .ok()
    .and_then(|v| v.trim().parse::<u64>().ok())
    .ok_or_else(|| {
      CatalogError::Parse(format!(
        "{} header is not a count: {:?}",
        TOTAL_COUNT_HEADER, value
      ))
    })
}

#[cfg(test)]
mod tests {
  use super::*;
  use reqwest::header::HeaderValue;

  fn client(url: &str) -> HttpCatalog {
    HttpCatalog::new(&ApiConfig {
      url: url.to_string(),
      timeout_secs: 5,
    })
    .unwrap()
  }

  #[test]
  fn test_list_url_always_sorts_by_id() {
    let url = client("http://localhost:3000").list_url(&QueryDescriptor::new(8));
    assert_eq!(
      url.as_str(),
      "http://localhost:3000/books?_page=1&_limit=8&_sort=id&_order=asc"
    );
  }

  #[test]
  fn test_list_url_with_filters() {
    let query = QueryDescriptor::new(8)
      .with_page(2)
      .with_search("  great adventure ")
      .with_category("Science Fiction");
    let url = client("http://localhost:3000").list_url(&query);
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert!(pairs.contains(&("_page".into(), "2".into())));
    assert!(pairs.contains(&("_sort".into(), "id".into())));
    assert!(pairs.contains(&("q".into(), "great adventure".into())));
    assert!(pairs.contains(&("categories".into(), "Science Fiction".into())));
  }

  #[test]
  fn test_list_url_omits_all_category_and_blank_search() {
    let query = QueryDescriptor::new(8).with_search("   ").with_category("all");
    let url = client("http://localhost:3000").list_url(&query);
    assert!(!url.query_pairs().any(|(k, _)| k == "q" || k == "categories"));
  }

  #[test]
  fn test_urls_respect_base_path() {
    let api = client("http://example.com/api/");
    assert_eq!(api.book_url("b 1").as_str(), "http://example.com/api/books/b%201");
    assert_eq!(
      api.categories_url().as_str(),
      "http://example.com/api/books?_fields=categories"
    );

    let api = client("http://example.com/api");
    assert_eq!(api.book_url("7").as_str(), "http://example.com/api/books/7");
  }

  #[test]
  fn test_invalid_base_url_is_rejected() {
    let result = HttpCatalog::new(&ApiConfig {
      url: "mailto:someone@example.com".to_string(),
      timeout_secs: 5,
    });
    assert!(result.is_err());
  }

  fn response(status: u16) -> Response {
    let response = http::Response::builder()
      .status(status)
      .body("{}")
      .unwrap();
    Response::from(response)
  }

  #[test]
  fn test_missing_record_is_not_found() {
    assert_eq!(
      check_status(response(404), Some("b007")).unwrap_err(),
      CatalogError::NotFound("b007".to_string())
    );
  }

  #[test]
  fn test_missing_collection_is_network_error() {
    assert!(matches!(
      check_status(response(404), None),
      Err(CatalogError::Network(_))
    ));
  }

  #[test]
  fn test_server_error_is_network_error() {
    assert!(matches!(
      check_status(response(500), Some("b007")),
      Err(CatalogError::Network(_))
    ));
    assert!(check_status(response(200), Some("b007")).is_ok());
  }

  #[test]
  fn test_total_count_header() {
    let mut headers = HeaderMap::new();
    headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from_static("17"));
    assert_eq!(parse_total_count(&headers), Ok(17));
  }

  #[test]
  fn test_missing_total_count_is_parse_error() {
    let headers = HeaderMap::new();
    assert!(matches!(
      parse_total_count(&headers),
      Err(CatalogError::Parse(_))
    ));
  }

  #[test]
  fn test_garbage_total_count_is_parse_error() {
    let mut headers = HeaderMap::new();
    headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from_static("lots"));
    assert!(matches!(
      parse_total_count(&headers),
      Err(CatalogError::Parse(_))
    ));
  }
}
