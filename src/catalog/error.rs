use thiserror::Error;

/// Failure taxonomy for catalog fetches and updates.
///
/// Every failure is local to one cache entry or one submission. Variants carry
/// rendered messages rather than source errors so snapshots stay `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
  /// Transport failure, timeout, or an unexpected HTTP status
  #[error("network error: {0}")]
  Network(String),
  /// Response body or envelope was malformed or incomplete
  #[error("malformed response: {0}")]
  Parse(String),
  /// The requested (or updated) book does not exist
  #[error("book {0} not found")]
  NotFound(String),
  /// Caller-supplied record failed field constraints before submission
  #[error("invalid book: {0}")]
  Validation(String),
  /// An update for this book is still in flight
  #[error("an update for book {0} is already being saved")]
  SubmitInProgress(String),
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

impl CatalogError {
  /// Whether an explicit retry of the same request could succeed.
  pub fn is_retryable(&self) -> bool {
    matches!(self, CatalogError::Network(_) | CatalogError::Parse(_))
  }
}

impl From<reqwest::Error> for CatalogError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_timeout() {
      CatalogError::Network("request timed out".to_string())
    } else if err.is_decode() {
      CatalogError::Parse(err.to_string())
    } else {
      CatalogError::Network(err.to_string())
    }
  }
}

impl From<serde_json::Error> for CatalogError {
  fn from(err: serde_json::Error) -> Self {
    CatalogError::Parse(err.to_string())
  }
}
