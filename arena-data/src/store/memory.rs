//! In-process store
//!
//! Rows live in a `BTreeMap` keyed by id behind a `tokio` `RwLock`; clones
//! share the same table. Listing follows the SQL statement's semantics:
//! whole-word, case-insensitive term matching for search, superset matching
//! for tags, then the requested sort with ascending id as tie-breaker. Text
//! columns compare by byte order rather than by database collation.
//!
//! Every store call bumps an invocation counter, which lets tests prove that
//! a rejected request never reached the store.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{ListingPage, Store};
use crate::repository::{ListingQuery, OrderDirection, RepositoryResult, Resource};

#[derive(Debug)]
struct Table<R> {
    next_id: i64,
    rows: BTreeMap<i64, R>,
}

/// Shared in-memory table for records of type `R`
#[derive(Debug)]
pub struct MemoryStore<R> {
    table: Arc<RwLock<Table<R>>>,
    calls: Arc<AtomicUsize>,
    latency: Option<Duration>,
}

impl<R> Clone for MemoryStore<R> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            calls: Arc::clone(&self.calls),
            latency: self.latency,
        }
    }
}

impl<R> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> MemoryStore<R> {
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(Table {
                next_id: 1,
                rows: BTreeMap::new(),
            })),
            calls: Arc::new(AtomicUsize::new(0)),
            latency: None,
        }
    }

    /// Delay every call by `latency` before touching the table
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of store calls made so far, across all clones
    pub fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    /// Number of rows currently stored
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn enter(&self) {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl<R: Resource> Store<R> for MemoryStore<R> {
    async fn insert(&self, record: &R) -> RepositoryResult<(i64, DateTime<Utc>)> {
        self.enter().await;
        let mut table = self.table.write().await;

        let id = table.next_id;
        table.next_id += 1;
        let created_at = Utc::now();

        let mut row = record.clone();
        row.assign_identity(id, created_at);
        table.rows.insert(id, row);

        Ok((id, created_at))
    }

    async fn fetch(&self, id: i64) -> RepositoryResult<Option<R>> {
        self.enter().await;
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn update(&self, record: &R) -> RepositoryResult<Option<R>> {
        self.enter().await;
        let mut table = self.table.write().await;

        let Some(row) = table.rows.get_mut(&record.id()) else {
            return Ok(None);
        };
        // id and created_at are immutable once assigned
        let created_at = row.created_at();
        let mut replacement = record.clone();
        replacement.assign_identity(record.id(), created_at);
        *row = replacement;

        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> RepositoryResult<u64> {
        self.enter().await;
        let removed = self.table.write().await.rows.remove(&id);
        Ok(u64::from(removed.is_some()))
    }

    async fn list(&self, query: &ListingQuery) -> RepositoryResult<ListingPage<R>> {
        self.enter().await;
        let table = self.table.read().await;

        let mut matched: Vec<&R> = table
            .rows
            .values()
            .filter(|row| matches_search(row.search_text(), &query.search))
            .filter(|row| contains_tags(row.tags(), &query.tags))
            .collect();

        matched.sort_by(|a, b| {
            let by_column = a
                .sort_value(query.sort_column)
                .cmp(&b.sort_value(query.sort_column));
            let by_column = match query.direction {
                OrderDirection::Ascending => by_column,
                OrderDirection::Descending => by_column.reverse(),
            };
            by_column.then_with(|| a.id().cmp(&b.id()))
        });

        let total_records = i64::try_from(matched.len()).unwrap_or(i64::MAX);
        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(0);

        let records = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect::<Vec<_>>();

        // count(*) OVER() only exists on returned rows
        let total_records = if records.is_empty() { 0 } else { total_records };

        Ok(ListingPage {
            records,
            total_records,
        })
    }
}

fn terms(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
}

/// Whole-word, case-insensitive match of every search term
///
/// An empty search matches everything. A search made only of punctuation
/// yields no terms and matches nothing.
fn matches_search(text: &str, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let words: HashSet<String> = terms(text).collect();
    let mut wanted = terms(search).peekable();
    if wanted.peek().is_none() {
        return false;
    }
    wanted.all(|term| words.contains(&term))
}

/// Whether `tags` is a superset of `required`
fn contains_tags(tags: &[String], required: &[String]) -> bool {
    required.iter().all(|tag| tags.contains(tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Character;
    use crate::repository::Filters;

    fn character(name: &str, health: i32, roles: &[&str]) -> Character {
        Character::new(name, health, 300, 200, roles.iter().map(|r| r.to_string()).collect())
    }

    fn listing(search: &str, tags: &[&str], sort: &str) -> ListingQuery {
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        let filters = Filters::new(1, 100, sort, Character::SORT_SAFELIST);
        ListingQuery::build::<Character>(search, &tags, &filters).unwrap()
    }

    async fn seeded() -> MemoryStore<Character> {
        let store = MemoryStore::new();
        for c in [
            character("Frost Mage", 450, &["mage", "support"]),
            character("Fire Mage", 500, &["mage"]),
            character("Stone Guardian", 900, &["tank"]),
            character("Mage Hunter", 500, &["assassin", "mage"]),
        ] {
            store.insert(&c).await.unwrap();
        }
        store
    }

    #[test]
    fn test_matches_search_whole_words() {
        assert!(matches_search("Frost Mage", "mage"));
        assert!(matches_search("Frost Mage", "MAGE frost"));
        assert!(!matches_search("Frost Mage", "mag"));
        assert!(!matches_search("Frost Mage", "frost fire"));
        assert!(matches_search("anything", ""));
        assert!(!matches_search("anything", "!!"));
    }

    #[test]
    fn test_contains_tags() {
        let tags = vec!["mage".to_string(), "support".to_string()];
        assert!(contains_tags(&tags, &[]));
        assert!(contains_tags(&tags, &["support".to_string()]));
        assert!(!contains_tags(&tags, &["support".to_string(), "tank".to_string()]));
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = MemoryStore::new();
        let (first, _) = store.insert(&character("A", 1, &["x"])).await.unwrap();
        let (second, _) = store.insert(&character("B", 1, &["x"])).await.unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = MemoryStore::new();
        let (id, _) = store.insert(&character("A", 1, &["x"])).await.unwrap();
        assert_eq!(store.delete(id).await.unwrap(), 1);
        assert_eq!(store.delete(id).await.unwrap(), 0);
        let (next, _) = store.insert(&character("B", 1, &["x"])).await.unwrap();
        assert_eq!(next, id + 1);
    }

    #[tokio::test]
    async fn test_update_keeps_created_at() {
        let store = MemoryStore::new();
        let (id, created_at) = store.insert(&character("A", 1, &["x"])).await.unwrap();

        let mut changed = store.fetch(id).await.unwrap().unwrap();
        changed.health = 77;
        changed.created_at = Utc::now() + chrono::Duration::days(1);

        let stored = store.update(&changed).await.unwrap().unwrap();
        assert_eq!(stored.health, 77);
        assert_eq!(stored.created_at, created_at);
    }

    #[tokio::test]
    async fn test_update_missing_row() {
        let store = MemoryStore::new();
        let mut ghost = character("Ghost", 1, &["x"]);
        ghost.id = 99;
        assert!(store.update(&ghost).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_search_and_tags() {
        let store = seeded().await;

        let page = store.list(&listing("mage", &[], "id")).await.unwrap();
        assert_eq!(page.total_records, 3);

        let page = store.list(&listing("mage", &["support"], "id")).await.unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].name, "Frost Mage");

        let page = store.list(&listing("", &["tank"], "id")).await.unwrap();
        assert_eq!(page.records[0].name, "Stone Guardian");
    }

    #[tokio::test]
    async fn test_list_sort_with_id_tiebreaker() {
        let store = seeded().await;
        let page = store.list(&listing("", &[], "-health")).await.unwrap();
        let ids: Vec<i64> = page.records.iter().map(|c| c.id).collect();
        // Fire Mage (2) and Mage Hunter (4) tie on health
        assert_eq!(ids, vec![3, 2, 4, 1]);
    }

    #[tokio::test]
    async fn test_list_past_last_page_is_empty() {
        let store = seeded().await;
        let filters = Filters::new(9, 10, "id", Character::SORT_SAFELIST);
        let query = ListingQuery::build::<Character>("", &[], &filters).unwrap();
        let page = store.list(&query).await.unwrap();
        assert_eq!(page, ListingPage::default());
    }

    #[tokio::test]
    async fn test_clones_share_rows_and_counter() {
        let store = MemoryStore::new();
        let clone = store.clone();
        clone.insert(&character("A", 1, &["x"])).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.calls(), 1);
    }
}
