//! PostgreSQL store
//!
//! Statements are built from each resource's column metadata and executed
//! with positional binds; record values never appear in statement text.

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, PgPool, PgRow};
use sqlx::query::Query;
use sqlx::{FromRow, Postgres, Row};

use super::{ListingPage, Store};
use crate::repository::{
    ListingQuery, RepositoryError, RepositoryOperation, RepositoryResult, Resource,
    TOTAL_RECORDS_COLUMN,
};

/// A query with binds still to be added
pub type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Row mapping for resources stored in PostgreSQL
///
/// `FromRow` decodes a full row (`id`, `created_at` and every mutable column);
/// [`bind_mutable`](Self::bind_mutable) binds the mutable columns in
/// [`Resource::MUTABLE_COLUMNS`] order.
pub trait PgResource: Resource + for<'r> FromRow<'r, PgRow> {
    fn bind_mutable<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q>;
}

/// Store backed by a shared connection pool
///
/// Cloning is cheap; every clone uses the same pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn placeholders(range: std::ops::RangeInclusive<usize>) -> Vec<String> {
    range.map(|n| format!("${}", n)).collect()
}

fn insert_sql<R: Resource>() -> String {
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING id, created_at",
        R::TABLE,
        R::MUTABLE_COLUMNS.join(", "),
        placeholders(1..=R::MUTABLE_COLUMNS.len()).join(", "),
    )
}

fn fetch_sql<R: Resource>() -> String {
    format!(
        "SELECT {} FROM {} WHERE id = $1",
        R::select_columns(),
        R::TABLE
    )
}

fn update_sql<R: Resource>() -> String {
    let assignments: Vec<String> = R::MUTABLE_COLUMNS
        .iter()
        .zip(placeholders(1..=R::MUTABLE_COLUMNS.len()))
        .map(|(column, placeholder)| format!("{} = {}", column, placeholder))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE id = ${} RETURNING {}",
        R::TABLE,
        assignments.join(", "),
        R::MUTABLE_COLUMNS.len() + 1,
        R::select_columns(),
    )
}

fn delete_sql<R: Resource>() -> String {
    format!("DELETE FROM {} WHERE id = $1", R::TABLE)
}

fn store_error(
    operation: RepositoryOperation,
    entity_type: &str,
    err: sqlx::Error,
) -> RepositoryError {
    RepositoryError::from(err)
        .with_operation(operation)
        .with_entity_type(entity_type)
}

impl<R: PgResource> Store<R> for PgStore {
    async fn insert(&self, record: &R) -> RepositoryResult<(i64, DateTime<Utc>)> {
        let sql = insert_sql::<R>();
        let row = record
            .bind_mutable(sqlx::query(&sql))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| store_error(RepositoryOperation::Insert, R::NAME, e))?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| store_error(RepositoryOperation::Insert, R::NAME, e))?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| store_error(RepositoryOperation::Insert, R::NAME, e))?;
        Ok((id, created_at))
    }

    async fn fetch(&self, id: i64) -> RepositoryResult<Option<R>> {
        let sql = fetch_sql::<R>();
        sqlx::query_as::<_, R>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error(RepositoryOperation::Get, R::NAME, e))
    }

    async fn update(&self, record: &R) -> RepositoryResult<Option<R>> {
        let sql = update_sql::<R>();
        let row = record
            .bind_mutable(sqlx::query(&sql))
            .bind(record.id())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error(RepositoryOperation::Update, R::NAME, e))?;

        row.map(|row| R::from_row(&row))
            .transpose()
            .map_err(|e| store_error(RepositoryOperation::Update, R::NAME, e))
    }

    async fn delete(&self, id: i64) -> RepositoryResult<u64> {
        let sql = delete_sql::<R>();
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error(RepositoryOperation::Delete, R::NAME, e))?;
        Ok(result.rows_affected())
    }

    async fn list(&self, query: &ListingQuery) -> RepositoryResult<ListingPage<R>> {
        let rows = sqlx::query(&query.sql)
            .bind(query.search.as_str())
            .bind(query.tags.as_slice())
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error(RepositoryOperation::List, R::NAME, e))?;

        let mut page = ListingPage::default();
        for row in &rows {
            page.total_records = row
                .try_get(TOTAL_RECORDS_COLUMN)
                .map_err(|e| store_error(RepositoryOperation::List, R::NAME, e))?;
            page.records.push(
                R::from_row(row).map_err(|e| store_error(RepositoryOperation::List, R::NAME, e))?,
            );
        }
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Character, Player};

    #[test]
    fn test_insert_sql() {
        assert_eq!(
            insert_sql::<Character>(),
            "INSERT INTO characters (name, health, move_speed, mana, roles) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id, created_at"
        );
    }

    #[test]
    fn test_fetch_sql() {
        assert_eq!(
            fetch_sql::<Player>(),
            "SELECT id, created_at, nickname, mmr, win_rate, total_matches, roles \
             FROM players WHERE id = $1"
        );
    }

    #[test]
    fn test_update_sql_returns_full_row() {
        assert_eq!(
            update_sql::<Character>(),
            "UPDATE characters SET name = $1, health = $2, move_speed = $3, mana = $4, roles = $5 \
             WHERE id = $6 RETURNING id, created_at, name, health, move_speed, mana, roles"
        );
    }

    #[test]
    fn test_delete_sql() {
        assert_eq!(delete_sql::<Player>(), "DELETE FROM players WHERE id = $1");
    }
}
