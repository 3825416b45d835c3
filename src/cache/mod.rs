//! Keyed in-memory cache with shared in-flight fetches.
//!
//! Entries are published to subscribers as [`Snapshot`]s over
//! `tokio::sync::watch` channels:
//! - an entry is fetched at most once at a time, however many callers ask
//! - invalidated entries keep their last value visible until the refetch lands
//! - responses for superseded fetches are discarded

mod entry;
mod store;

pub use entry::Snapshot;
pub use store::CacheStore;
