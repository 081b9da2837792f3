//! Listing query construction
//!
//! A [`ListingQuery`] is the one parameterized SELECT each resource listing
//! runs. It combines three independent filter axes:
//!
//! 1. free-text match on the resource's search column (`$1`, empty = all),
//! 2. role containment on the tags column (`$2`, empty = no constraint),
//! 3. safelisted ORDER BY with `id ASC` as a mandatory tie-breaker,
//!    then LIMIT `$3` / OFFSET `$4`.
//!
//! Each row also carries `count(*) OVER()` so the total match count comes back
//! with the page instead of needing a second query.
//!
//! # Example
//!
//! ```rust
//! use arena_data::models::Character;
//! use arena_data::repository::{Filters, ListingQuery, Resource};
//!
//! let filters = Filters::new(2, 10, "-health", Character::SORT_SAFELIST);
//! let query = ListingQuery::build::<Character>("frost mage", &[], &filters).unwrap();
//!
//! assert!(query.sql.contains("ORDER BY health DESC, id ASC"));
//! assert_eq!(query.limit, 10);
//! assert_eq!(query.offset, 10);
//! ```

use super::pagination::{Filters, OrderDirection};
use super::resource::Resource;
use crate::validator::{ValidationErrors, Validator};

/// Name of the windowed count column in listing rows
pub const TOTAL_RECORDS_COLUMN: &str = "total_records";

/// A fully parameterized listing statement plus its bind values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    /// Statement text; only safelisted identifiers are interpolated
    pub sql: String,
    /// `$1`: free-text search, trimmed; empty matches everything
    pub search: String,
    /// `$2`: required role tags; empty means no constraint
    pub tags: Vec<String>,
    /// Primary sort column, always a safelisted identifier
    pub sort_column: &'static str,
    pub direction: OrderDirection,
    /// `$3`
    pub limit: i64,
    /// `$4`
    pub offset: i64,
}

impl ListingQuery {
    /// Build the listing statement for resource `R`
    ///
    /// Fails with field errors when the filters are invalid or the sort
    /// expression does not name a sortable column of `R`. Nothing is built in
    /// that case, so an unchecked sort value never reaches the statement text.
    pub fn build<R: Resource>(
        search: &str,
        tags: &[String],
        filters: &Filters,
    ) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new();
        filters.validate_into(&mut v);

        let sort_column = filters.sort_column().and_then(|requested| {
            R::SORT_SAFELIST
                .iter()
                .map(|safe| safe.trim_start_matches('-'))
                .find(|column| *column == requested)
        });
        let Some(sort_column) = sort_column.filter(|_| v.is_valid()) else {
            if sort_column.is_none() {
                v.add_error("sort", "invalid sort value");
            }
            return Err(v.finish().err().unwrap_or_default());
        };
        let direction = filters.sort_direction();

        let sql = format!(
            "SELECT count(*) OVER() AS {total}, {columns} \
             FROM {table} \
             WHERE (to_tsvector('simple', {search}) @@ plainto_tsquery('simple', $1) OR $1 = '') \
             AND ({tags} @> $2 OR $2 = '{{}}') \
             ORDER BY {sort} {dir}, id ASC \
             LIMIT $3 OFFSET $4",
            total = TOTAL_RECORDS_COLUMN,
            columns = R::select_columns(),
            table = R::TABLE,
            search = R::SEARCH_COLUMN,
            tags = R::TAGS_COLUMN,
            sort = sort_column,
            dir = direction.as_sql(),
        );

        Ok(Self {
            sql,
            search: search.trim().to_string(),
            tags: tags.to_vec(),
            sort_column,
            direction,
            limit: filters.limit(),
            offset: filters.offset(),
        })
    }
}
