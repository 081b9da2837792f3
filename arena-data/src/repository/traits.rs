//! Repository trait definitions
//!
//! [`Repository`] is the one calling convention shared by every resource type.
//! It uses RPITIT (Return Position Impl Trait In Traits), so implementations
//! write plain `async fn` without `async_trait`.
//!
//! # Example
//!
//! ```rust,ignore
//! use arena_data::models::Character;
//! use arena_data::repository::{Filters, Repository, Resource};
//!
//! async fn strongest<R: Repository<Character>>(repo: &R) -> RepositoryResult<Vec<Character>> {
//!     let filters = Filters::new(1, 5, "-health", Character::SORT_SAFELIST);
//!     Ok(repo.get_all("", &[], &filters).await?.records)
//! }
//! ```

use std::future::Future;

use serde::Serialize;

use super::error::RepositoryError;
use super::pagination::{Filters, Metadata};

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// One page of a filtered listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing<R> {
    pub records: Vec<R>,
    pub metadata: Metadata,
}

impl<R> Listing<R> {
    /// A listing with no records and all-zero metadata
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            metadata: Metadata::default(),
        }
    }
}

/// CRUD and listing operations for one record type `R`
///
/// Records carry their own identity: `insert` ignores the incoming `id` and
/// `created_at` and returns the record with the store-assigned values filled
/// in, while `update` uses the record's `id` to locate the row it replaces.
pub trait Repository<R>: Send + Sync {
    /// Persist a new record, returning it with `id` and `created_at` populated
    fn insert(&self, record: R) -> impl Future<Output = RepositoryResult<R>> + Send;

    /// Fetch one record by id
    ///
    /// # Errors
    ///
    /// `NotFound` when no record has this id, including any id below 1.
    fn get(&self, id: i64) -> impl Future<Output = RepositoryResult<R>> + Send;

    /// Replace every mutable field of the stored record with `record`'s values
    ///
    /// Returns the record as stored after the write.
    ///
    /// # Errors
    ///
    /// `EditConflict` when the row vanished between the caller's read and
    /// this write. Two concurrent updates to the same row are not detected;
    /// the later write wins.
    fn update(&self, record: R) -> impl Future<Output = RepositoryResult<R>> + Send;

    /// Remove one record by id
    ///
    /// # Errors
    ///
    /// `NotFound` when no record has this id, including any id below 1.
    fn delete(&self, id: i64) -> impl Future<Output = RepositoryResult<()>> + Send;

    /// List records matching `search` and containing every tag in `tags`
    ///
    /// An empty `search` matches everything and an empty `tags` slice places
    /// no constraint. Results are ordered by the filters' sort expression
    /// with ties broken by ascending id.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` with field errors when `filters` are invalid. The
    /// store is not touched in that case.
    fn get_all(
        &self,
        search: &str,
        tags: &[String],
        filters: &Filters,
    ) -> impl Future<Output = RepositoryResult<Listing<R>>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryOperation;

    #[test]
    fn test_repository_result_type() {
        let ok_result: RepositoryResult<i32> = Ok(42);
        assert!(ok_result.is_ok());

        let err_result: RepositoryResult<i32> = Err(RepositoryError::not_found("Test", 123));
        assert!(err_result.is_err());
    }

    #[test]
    fn test_empty_listing() {
        let listing: Listing<u8> = Listing::empty();
        assert!(listing.records.is_empty());
        assert_eq!(listing.metadata, Metadata::default());
    }

    #[derive(Debug, Clone, PartialEq)]
    struct MockRecord {
        id: i64,
        label: String,
    }

    // Verifies the trait can be implemented with plain async fns
    struct MockRepository;

    impl Repository<MockRecord> for MockRepository {
        async fn insert(&self, mut record: MockRecord) -> RepositoryResult<MockRecord> {
            record.id = 1;
            Ok(record)
        }

        async fn get(&self, id: i64) -> RepositoryResult<MockRecord> {
            Err(RepositoryError::not_found("MockRecord", id))
        }

        async fn update(&self, record: MockRecord) -> RepositoryResult<MockRecord> {
            Err(RepositoryError::edit_conflict("MockRecord", record.id))
        }

        async fn delete(&self, _id: i64) -> RepositoryResult<()> {
            Ok(())
        }

        async fn get_all(
            &self,
            _search: &str,
            _tags: &[String],
            _filters: &Filters,
        ) -> RepositoryResult<Listing<MockRecord>> {
            Ok(Listing::empty())
        }
    }

    #[tokio::test]
    async fn test_mock_repository_insert() {
        let repo = MockRepository;
        let record = repo
            .insert(MockRecord {
                id: 0,
                label: "test".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(record.label, "test");
    }

    #[tokio::test]
    async fn test_mock_repository_errors() {
        let repo = MockRepository;

        let err = repo.get(7).await.unwrap_err();
        assert!(err.is_not_found());

        let err = repo
            .update(MockRecord {
                id: 7,
                label: "x".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.is_edit_conflict());
        assert_eq!(err.operation, RepositoryOperation::Update);
    }

    #[tokio::test]
    async fn test_mock_repository_get_all() {
        const SAFELIST: &[&str] = &["id"];
        let repo = MockRepository;
        let listing = repo
            .get_all("", &[], &Filters::first_page(SAFELIST))
            .await
            .unwrap();
        assert_eq!(listing, Listing::empty());
    }
}
