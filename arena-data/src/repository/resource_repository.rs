//! Generic repository over any [`Resource`] and [`Store`]
//!
//! [`ResourceRepository`] owns the protocol every resource shares:
//!
//! - ids below 1 are rejected as `NotFound` without a store call
//! - filters are validated before any listing query is built
//! - an update that matches no row is an `EditConflict`, not `NotFound`
//! - every store call runs under a deadline and surfaces as `Timeout` when it
//!   elapses
//!
//! Dropping a returned future drops the in-flight store call with it.

use std::future::Future;
use std::marker::PhantomData;
use std::time::Duration;

use super::error::{RepositoryError, RepositoryOperation};
use super::pagination::{Filters, Metadata};
use super::query::ListingQuery;
use super::resource::Resource;
use super::traits::{Listing, Repository, RepositoryResult};
use crate::store::Store;

/// Default per-call deadline for store operations
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(3);

/// Repository for records of type `R` backed by store `S`
///
/// Holds no mutable state; share it freely between tasks.
#[derive(Debug)]
pub struct ResourceRepository<R, S> {
    store: S,
    deadline: Duration,
    _resource: PhantomData<fn() -> R>,
}

impl<R, S: Clone> Clone for ResourceRepository<R, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            deadline: self.deadline,
            _resource: PhantomData,
        }
    }
}

impl<R: Resource, S: Store<R>> ResourceRepository<R, S> {
    pub fn new(store: S) -> Self {
        Self::with_timeout(store, DEFAULT_QUERY_TIMEOUT)
    }

    pub fn with_timeout(store: S, deadline: Duration) -> Self {
        Self {
            store,
            deadline,
            _resource: PhantomData,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Run a store call under the per-call deadline
    async fn bounded<T>(
        &self,
        operation: RepositoryOperation,
        call: impl Future<Output = RepositoryResult<T>>,
    ) -> RepositoryResult<T> {
        match tokio::time::timeout(self.deadline, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    resource = R::NAME,
                    %operation,
                    "store call exceeded {:?} deadline",
                    self.deadline
                );
                Err(RepositoryError::timeout(operation, self.deadline).with_entity_type(R::NAME))
            }
        }
    }
}

impl<R: Resource, S: Store<R>> Repository<R> for ResourceRepository<R, S> {
    #[tracing::instrument(skip_all, fields(resource = R::NAME))]
    async fn insert(&self, mut record: R) -> RepositoryResult<R> {
        let (id, created_at) = self
            .bounded(RepositoryOperation::Insert, self.store.insert(&record))
            .await?;
        record.assign_identity(id, created_at);

        tracing::debug!(id, "record inserted");
        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(resource = R::NAME))]
    async fn get(&self, id: i64) -> RepositoryResult<R> {
        if id < 1 {
            return Err(RepositoryError::not_found(R::NAME, id));
        }

        self.bounded(RepositoryOperation::Get, self.store.fetch(id))
            .await?
            .ok_or_else(|| RepositoryError::not_found(R::NAME, id))
    }

    #[tracing::instrument(skip_all, fields(resource = R::NAME, id = record.id()))]
    async fn update(&self, record: R) -> RepositoryResult<R> {
        let id = record.id();
        match self
            .bounded(RepositoryOperation::Update, self.store.update(&record))
            .await?
        {
            Some(stored) => {
                tracing::debug!("record updated");
                Ok(stored)
            }
            None => {
                tracing::warn!("update matched no row, reporting edit conflict");
                Err(RepositoryError::edit_conflict(R::NAME, id))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(resource = R::NAME))]
    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let not_found =
            || RepositoryError::not_found(R::NAME, id).with_operation(RepositoryOperation::Delete);
        if id < 1 {
            return Err(not_found());
        }

        let removed = self
            .bounded(RepositoryOperation::Delete, self.store.delete(id))
            .await?;
        if removed == 0 {
            return Err(not_found());
        }

        tracing::debug!("record deleted");
        Ok(())
    }

    #[tracing::instrument(
        skip(self, tags, filters),
        fields(resource = R::NAME, page = filters.page, sort = %filters.sort)
    )]
    async fn get_all(
        &self,
        search: &str,
        tags: &[String],
        filters: &Filters,
    ) -> RepositoryResult<Listing<R>> {
        let query = ListingQuery::build::<R>(search, tags, filters).map_err(|errors| {
            RepositoryError::validation_failed(RepositoryOperation::List, errors)
                .with_entity_type(R::NAME)
        })?;

        let page = self
            .bounded(RepositoryOperation::List, self.store.list(&query))
            .await?;
        let metadata = Metadata::calculate(page.total_records, filters.page, filters.page_size);

        tracing::debug!(
            returned = page.records.len(),
            total = metadata.total_records,
            "listing served"
        );
        Ok(Listing {
            records: page.records,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Character, Player};
    use crate::repository::RepositoryErrorKind;
    use crate::store::MemoryStore;

    type CharacterRepo = ResourceRepository<Character, MemoryStore<Character>>;

    fn roles(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn character(name: &str, health: i32, tags: &[&str]) -> Character {
        Character::new(name, health, 300, 150, roles(tags))
    }

    fn repo() -> CharacterRepo {
        ResourceRepository::new(MemoryStore::new())
    }

    fn filters(page: i64, page_size: i64, sort: &str) -> Filters {
        Filters::new(page, page_size, sort, Character::SORT_SAFELIST)
    }

    #[tokio::test]
    async fn test_insert_then_get_round_trip() {
        let repo = repo();
        let inserted = repo
            .insert(character("Frost Mage", 450, &["mage", "support"]))
            .await
            .unwrap();
        assert!(inserted.id >= 1);

        let fetched = repo.get(inserted.id).await.unwrap();
        assert_eq!(fetched, inserted);
        assert_eq!(fetched.created_at, inserted.created_at);
        assert_eq!(fetched.name, "Frost Mage");
    }

    #[tokio::test]
    async fn test_get_rejects_non_positive_ids_without_store_call() {
        let repo = repo();
        for id in [0, -5] {
            let err = repo.get(id).await.unwrap_err();
            assert_eq!(err.kind, RepositoryErrorKind::NotFound);
            assert_eq!(err.operation, RepositoryOperation::Get);
        }
        assert_eq!(repo.store().calls(), 0);
    }

    #[tokio::test]
    async fn test_delete_rejects_zero_id_without_store_call() {
        let repo = repo();
        let err = repo.delete(0).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.operation, RepositoryOperation::Delete);
        assert_eq!(repo.store().calls(), 0);
    }

    #[tokio::test]
    async fn test_get_missing_record() {
        let repo = repo();
        let err = repo.get(42).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.entity_id.as_deref(), Some("42"));
        assert_eq!(repo.store().calls(), 1);
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let repo = repo();
        let c = repo.insert(character("A", 10, &["tank"])).await.unwrap();
        repo.delete(c.id).await.unwrap();

        let err = repo.delete(c.id).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(repo.get(c.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_replaces_mutable_fields() {
        let repo = repo();
        let mut c = repo.insert(character("A", 10, &["tank"])).await.unwrap();
        c.name = "B".to_string();
        c.mana = 999;
        c.roles = roles(&["tank", "support"]);

        let updated = repo.update(c.clone()).await.unwrap();
        assert_eq!(updated, c);
        assert_eq!(repo.get(c.id).await.unwrap(), c);
    }

    #[tokio::test]
    async fn test_update_after_concurrent_delete_is_edit_conflict() {
        let repo = repo();
        let c = repo.insert(character("A", 10, &["tank"])).await.unwrap();

        let mut stale = repo.get(c.id).await.unwrap();
        repo.delete(c.id).await.unwrap();
        stale.health = 20;

        let err = repo.update(stale).await.unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::EditConflict);
        assert_eq!(err.operation, RepositoryOperation::Update);
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_concurrent_updates_last_write_wins() {
        let repo = repo();
        let c = repo.insert(character("A", 10, &["tank"])).await.unwrap();

        let mut first = repo.get(c.id).await.unwrap();
        let mut second = repo.get(c.id).await.unwrap();
        first.health = 11;
        second.health = 12;
        repo.update(first).await.unwrap();
        repo.update(second).await.unwrap();

        assert_eq!(repo.get(c.id).await.unwrap().health, 12);
    }

    #[tokio::test]
    async fn test_get_all_invalid_sort_never_reaches_store() {
        let repo = repo();
        let err = repo
            .get_all("", &[], &filters(1, 10, "health; DROP TABLE characters"))
            .await
            .unwrap_err();

        assert_eq!(err.kind, RepositoryErrorKind::ValidationFailed);
        assert_eq!(err.field_errors.get("sort"), Some("invalid sort value"));
        assert_eq!(repo.store().calls(), 0);
    }

    #[tokio::test]
    async fn test_get_all_reports_every_filter_error() {
        let repo = repo();
        let err = repo
            .get_all("", &[], &filters(0, 101, "id"))
            .await
            .unwrap_err();
        assert_eq!(err.field_errors.get("page"), Some("must be greater than zero"));
        assert_eq!(err.field_errors.get("page_size"), Some("must be a maximum of 100"));
        assert_eq!(repo.store().calls(), 0);
    }

    #[tokio::test]
    async fn test_get_all_unfiltered_returns_everything_in_order() {
        let repo = repo();
        for (name, health) in [("C", 5), ("A", 9), ("B", 5)] {
            repo.insert(character(name, health, &["mage"])).await.unwrap();
        }

        let listing = repo.get_all("", &[], &filters(1, 20, "health")).await.unwrap();
        let ids: Vec<i64> = listing.records.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
        assert_eq!(listing.metadata.total_records, 3);
        assert_eq!(listing.metadata.last_page, 1);
    }

    #[tokio::test]
    async fn test_get_all_tag_filter_returns_supersets() {
        let repo = repo();
        repo.insert(character("A", 1, &["mage", "support"])).await.unwrap();
        repo.insert(character("B", 1, &["mage"])).await.unwrap();
        repo.insert(character("C", 1, &["support", "tank", "mage"])).await.unwrap();

        let listing = repo
            .get_all("", &roles(&["mage", "support"]), &filters(1, 20, "id"))
            .await
            .unwrap();
        let names: Vec<&str> = listing.records.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
        for record in &listing.records {
            assert!(record.roles.contains(&"mage".to_string()));
            assert!(record.roles.contains(&"support".to_string()));
        }
    }

    #[tokio::test]
    async fn test_get_all_whitespace_search_matches_everything() {
        let repo = repo();
        repo.insert(character("A", 1, &["mage"])).await.unwrap();
        repo.insert(character("B", 1, &["mage"])).await.unwrap();

        let listing = repo.get_all("   ", &[], &filters(1, 20, "id")).await.unwrap();
        assert_eq!(listing.metadata.total_records, 2);
    }

    #[tokio::test]
    async fn test_get_all_empty_result_has_zero_metadata() {
        let repo = repo();
        repo.insert(character("Frost Mage", 1, &["mage"])).await.unwrap();

        let listing = repo
            .get_all("necromancer", &[], &filters(1, 20, "id"))
            .await
            .unwrap();
        assert!(listing.records.is_empty());
        assert_eq!(listing.metadata, Metadata::default());
    }

    #[tokio::test]
    async fn test_get_all_paginates_25_characters_by_descending_health() {
        let repo = repo();
        // Health repeats every 5 records so ties exercise the id tie-breaker
        for n in 1..=25 {
            let health = 100 + (n % 5) * 10;
            repo.insert(character(&format!("Hero {}", n), health, &["fighter"]))
                .await
                .unwrap();
        }

        let listing = repo
            .get_all("", &[], &filters(2, 10, "-health"))
            .await
            .unwrap();

        assert_eq!(
            listing.metadata,
            Metadata {
                current_page: 2,
                page_size: 10,
                first_page: 1,
                last_page: 3,
                total_records: 25,
            }
        );

        let mut expected: Vec<(i32, i64)> = (1..=25)
            .map(|n: i64| (100 + (n as i32 % 5) * 10, n))
            .collect();
        expected.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        let expected_ids: Vec<i64> = expected[10..20].iter().map(|(_, id)| *id).collect();

        let ids: Vec<i64> = listing.records.iter().map(|c| c.id).collect();
        assert_eq!(ids, expected_ids);
        for pair in listing.records.windows(2) {
            assert!(pair[0].health >= pair[1].health);
            if pair[0].health == pair[1].health {
                assert!(pair[0].id < pair[1].id);
            }
        }
    }

    #[tokio::test]
    async fn test_slow_store_times_out() {
        let store = MemoryStore::new().with_latency(Duration::from_millis(200));
        let repo: CharacterRepo = ResourceRepository::with_timeout(store, Duration::from_millis(20));

        let err = repo.get(1).await.unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::Timeout);
        assert_eq!(err.operation, RepositoryOperation::Get);
        assert!(err.is_retriable());
        assert_eq!(err.entity_type.as_deref(), Some("Character"));
    }

    #[tokio::test]
    async fn test_timed_out_listing_is_tagged_list() {
        let store = MemoryStore::new().with_latency(Duration::from_millis(200));
        let repo: CharacterRepo = ResourceRepository::with_timeout(store, Duration::from_millis(20));

        let err = repo.get_all("", &[], &filters(1, 10, "id")).await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.operation, RepositoryOperation::List);
    }

    #[tokio::test]
    async fn test_player_repository_shares_protocol() {
        let repo: ResourceRepository<Player, MemoryStore<Player>> =
            ResourceRepository::new(MemoryStore::new());
        let p = repo
            .insert(Player::new("ShadowStep", 2400, 55, 0, roles(&["carry"])))
            .await
            .unwrap();

        let listing = repo
            .get_all(
                "shadowstep",
                &[],
                &Filters::new(1, 10, "-mmr", Player::SORT_SAFELIST),
            )
            .await
            .unwrap();
        assert_eq!(listing.records, vec![p]);
        assert_eq!(repo.deadline(), DEFAULT_QUERY_TIMEOUT);
    }
}
