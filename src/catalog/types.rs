use std::fmt;

use super::error::{CatalogError, CatalogResult};

/// Currency amount held in integer cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
  cents: i64,
}

impl Price {
  #[cfg(test)]
  pub const fn from_cents(cents: i64) -> Self {
    Self { cents }
  }

  /// Convert a wire amount (e.g. `19.99`) to cents, rounding half away from zero.
  pub fn from_dollars(amount: f64) -> Self {
    Self {
      cents: (amount * 100.0).round() as i64,
    }
  }

  #[cfg(test)]
  pub fn cents(self) -> i64 {
    self.cents
  }

  pub fn as_dollars(self) -> f64 {
    self.cents as f64 / 100.0
  }

  pub fn is_negative(self) -> bool {
    self.cents < 0
  }

  /// Parse user input such as `19.99`, `$5`, or `0.5`.
  ///
  /// At most two fractional digits are accepted.
  pub fn parse(input: &str) -> CatalogResult<Self> {
    let invalid = || CatalogError::Validation(format!("'{}' is not a valid price", input.trim()));

    let s = input.trim();
    let (negative, s) = match s.strip_prefix('-') {
      Some(rest) => (true, rest),
      None => (false, s),
    };
    let s = s.strip_prefix('$').unwrap_or(s);
    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));

    if whole.is_empty() && frac.is_empty() {
      return Err(invalid());
    }
    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if !all_digits(whole) || !all_digits(frac) || frac.len() > 2 {
      return Err(invalid());
    }

    let whole: i64 = if whole.is_empty() {
      0
    } else {
      whole.parse().map_err(|_| invalid())?
    };
    let frac: i64 = match frac.len() {
      0 => 0,
      1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
      _ => frac.parse().map_err(|_| invalid())?,
    };

    let cents = whole
      .checked_mul(100)
      .and_then(|c| c.checked_add(frac))
      .ok_or_else(invalid)?;

    Ok(Self {
      cents: if negative { -cents } else { cents },
    })
  }
}

impl fmt::Display for Price {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let sign = if self.cents < 0 { "-" } else { "" };
    let abs = self.cents.unsigned_abs();
    write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
  }
}

/// A book record as held by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
  pub id: String,
  pub title: String,
  pub author: String,
  pub published_year: i32,
  pub price: Price,
  pub stock: i64,
  pub categories: Vec<String>,
  pub summary: Option<String>,
}

impl Book {
  /// Check the field constraints an update must satisfy before it is sent.
  pub fn validate(&self) -> CatalogResult<()> {
    if self.id.trim().is_empty() {
      return Err(CatalogError::Validation("id must not be empty".to_string()));
    }
    if self.title.trim().is_empty() {
      return Err(CatalogError::Validation("title must not be empty".to_string()));
    }
    if self.author.trim().is_empty() {
      return Err(CatalogError::Validation("author must not be empty".to_string()));
    }
    if self.price.is_negative() {
      return Err(CatalogError::Validation(format!(
        "price must not be negative (got {})",
        self.price
      )));
    }
    if self.stock < 0 {
      return Err(CatalogError::Validation(format!(
        "stock must not be negative (got {})",
        self.stock
      )));
    }
    if self.categories.iter().any(|c| c.trim().is_empty()) {
      return Err(CatalogError::Validation(
        "categories must not contain empty labels".to_string(),
      ));
    }
    Ok(())
  }

  pub fn stock_level(&self) -> StockLevel {
    StockLevel::from_stock(self.stock)
  }
}

/// Availability badge shown next to a book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
  OutOfStock,
  Low,
  InStock,
}

impl StockLevel {
  /// Below this many copies a book is shown as running low
  pub const LOW_THRESHOLD: i64 = 5;

  pub fn from_stock(stock: i64) -> Self {
    if stock <= 0 {
      StockLevel::OutOfStock
    } else if stock < Self::LOW_THRESHOLD {
      StockLevel::Low
    } else {
      StockLevel::InStock
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      StockLevel::OutOfStock => "Out of stock",
      StockLevel::Low => "Low stock",
      StockLevel::InStock => "In stock",
    }
  }
}

/// One page of a book listing plus the collection-wide match count
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPage {
  pub items: Vec<Book>,
  pub total_count: u64,
}

impl BookPage {
  /// Number of pages needed to show every match at `limit` books per page.
  pub fn total_pages(&self, limit: u32) -> u32 {
    let limit = u64::from(limit.max(1));
    let pages = self.total_count.div_ceil(limit);
    u32::try_from(pages).unwrap_or(u32::MAX)
  }
}
