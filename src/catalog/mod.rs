//! Book catalog domain: query descriptors, the remote API, and the cached
//! facade the UI reads from.

mod api_types;
mod categories;
mod client;
mod descriptor;
mod error;
#[cfg(test)]
pub(crate) mod fake;
mod mutation;
mod pagination;
mod service;
mod types;

pub use client::HttpCatalog;
pub use descriptor::{CacheKey, QueryDescriptor, ALL_CATEGORIES};
pub use error::{CatalogError, CatalogResult};
pub use mutation::{MutationState, MutationTicket};
pub use pagination::{page_window, PageSlot};
pub use service::{Catalog, CategoriesSnapshot, DetailSnapshot, ListSnapshot};
pub use types::{Book, BookPage, Price, StockLevel};
