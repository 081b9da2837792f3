//! Storage backends behind the generic repository
//!
//! A [`Store`] executes single statements against one table and reports raw
//! outcomes (`None` for "no row", an affected-row count for deletes). Turning
//! those outcomes into `NotFound`/`EditConflict`, enforcing deadlines and
//! validating filters is the repository's job, so every backend shares the same
//! protocol.
//!
//! - [`PgStore`]: PostgreSQL via `sqlx` (feature `database`)
//! - [`MemoryStore`]: in-process tables with the same listing semantics

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::repository::{ListingQuery, RepositoryResult, Resource};

mod memory;
#[cfg(feature = "database")]
mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "database")]
pub use postgres::{PgQuery, PgResource, PgStore};

/// One page of listing rows plus the total match count across all pages
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage<R> {
    pub records: Vec<R>,
    pub total_records: i64,
}

impl<R> Default for ListingPage<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            total_records: 0,
        }
    }
}

/// Single-statement access to the table holding records of type `R`
pub trait Store<R: Resource>: Send + Sync {
    /// Insert the mutable fields of `record`, returning the assigned id and timestamp
    fn insert(
        &self,
        record: &R,
    ) -> impl Future<Output = RepositoryResult<(i64, DateTime<Utc>)>> + Send;

    /// Load the record with `id`, `None` when no row matches
    fn fetch(&self, id: i64) -> impl Future<Output = RepositoryResult<Option<R>>> + Send;

    /// Overwrite the mutable fields of the row with `record.id()`
    ///
    /// Returns the full row as stored after the write, `None` when no row
    /// matched.
    fn update(&self, record: &R) -> impl Future<Output = RepositoryResult<Option<R>>> + Send;

    /// Delete the row with `id`, returning the number of rows removed
    fn delete(&self, id: i64) -> impl Future<Output = RepositoryResult<u64>> + Send;

    /// Run a listing query
    fn list(
        &self,
        query: &ListingQuery,
    ) -> impl Future<Output = RepositoryResult<ListingPage<R>>> + Send;
}
