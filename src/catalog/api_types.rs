//! Serde types matching the `/books` resource on the wire.
//!
//! These types are separate from domain types so the wire quirks (numeric or
//! string ids, dollar amounts as floats) stay out of the rest of the crate.

use serde::{Deserialize, Serialize};

use super::types::{Book, Price};

/// Record id as sent by the server: json-server accepts both forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiId {
  Text(String),
  Number(i64),
}

impl ApiId {
  pub fn into_string(self) -> String {
    match self {
      ApiId::Text(s) => s,
      ApiId::Number(n) => n.to_string(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiBook {
  pub id: ApiId,
  pub title: String,
  pub author: String,
  pub published_year: i32,
  #[serde(default)]
  pub categories: Vec<String>,
  /// USD
  pub price: f64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub summary: Option<String>,
  pub stock: i64,
}

impl From<ApiBook> for Book {
  fn from(api: ApiBook) -> Self {
    Book {
      id: api.id.into_string(),
      title: api.title,
      author: api.author,
      published_year: api.published_year,
      price: Price::from_dollars(api.price),
      stock: api.stock,
      categories: api.categories,
      summary: api.summary,
    }
  }
}

impl From<&Book> for ApiBook {
  fn from(book: &Book) -> Self {
    ApiBook {
      id: ApiId::Text(book.id.clone()),
      title: book.title.clone(),
      author: book.author.clone(),
      published_year: book.published_year,
      categories: book.categories.clone(),
      price: book.price.as_dollars(),
      summary: book.summary.clone(),
      stock: book.stock,
    }
  }
}

/// Row of the `_fields=categories` listing
#[derive(Debug, Deserialize)]
pub struct ApiCategoriesRow {
  #[serde(default)]
  pub categories: Vec<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_numeric_id_is_read_as_string() {
    let json = r#"{"id": 12, "title": "T", "author": "A", "publishedYear": 1999,
                   "categories": ["CS"], "price": 12.5, "stock": 3}"#;
    let book: Book = serde_json::from_str::<ApiBook>(json).unwrap().into();
    assert_eq!(book.id, "12");
    assert_eq!(book.price.cents(), 1250);
    assert_eq!(book.summary, None);
  }

  #[test]
  fn test_missing_categories_default_to_empty() {
    let json = r#"{"id": "x", "title": "T", "author": "A", "publishedYear": 1999,
                   "price": 1, "stock": 0}"#;
    let book: Book = serde_json::from_str::<ApiBook>(json).unwrap().into();
    assert!(book.categories.is_empty());
  }

  #[test]
  fn test_update_body_uses_camel_case_and_dollars() {
    let book = Book {
      id: "b1".to_string(),
      title: "T".to_string(),
      author: "A".to_string(),
      published_year: 2001,
      price: Price::from_cents(1999),
      stock: 4,
      categories: vec!["History".to_string()],
      summary: Some("s".to_string()),
    };
    let value = serde_json::to_value(ApiBook::from(&book)).unwrap();
    assert_eq!(value["publishedYear"], 2001);
    assert_eq!(value["price"], 19.99);
    assert_eq!(value["id"], "b1");
  }

  #[test]
  fn test_missing_required_field_is_an_error() {
    let json = r#"{"id": "x", "author": "A", "publishedYear": 1999, "price": 1, "stock": 0}"#;
    assert!(serde_json::from_str::<ApiBook>(json).is_err());
  }
}
