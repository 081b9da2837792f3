//! Resource descriptions shared by every store backend
//!
//! A [`Resource`] tells the generic repository everything it needs to know
//! about one record type: where it lives, which attribute is searchable, which
//! columns may be sorted on, and how to validate it. Concrete record types live
//! in [`crate::models`].

use std::fmt;

use chrono::{DateTime, Utc};

use crate::validator::{ValidationErrors, Validator};

/// A comparable value extracted from a record for in-process sorting
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue<'a> {
    Integer(i64),
    Text(&'a str),
    Timestamp(DateTime<Utc>),
    Tags(&'a [String]),
}

/// A record type the repository layer can persist and list
///
/// Every resource table has a store-assigned `id BIGSERIAL` primary key and a
/// store-assigned `created_at` timestamp; everything else is described here.
pub trait Resource: Clone + fmt::Debug + Send + Sync + Unpin + 'static {
    /// Type name used in errors and logs (e.g. `"Character"`)
    const NAME: &'static str;

    /// Table holding the records
    const TABLE: &'static str;

    /// Columns written by insert and update, in bind order
    const MUTABLE_COLUMNS: &'static [&'static str];

    /// Text column matched by free-text search
    const SEARCH_COLUMN: &'static str;

    /// Array column holding the record's role tags
    const TAGS_COLUMN: &'static str;

    /// Query-string parameter that carries the free-text search
    const SEARCH_PARAM: &'static str;

    /// Every sort expression listings accept, ascending and `-`descending
    const SORT_SAFELIST: &'static [&'static str];

    fn id(&self) -> i64;

    fn created_at(&self) -> DateTime<Utc>;

    /// Store the identity the store assigned on insert
    fn assign_identity(&mut self, id: i64, created_at: DateTime<Utc>);

    /// Value of [`Self::SEARCH_COLUMN`]
    fn search_text(&self) -> &str;

    /// Value of [`Self::TAGS_COLUMN`]
    fn tags(&self) -> &[String];

    /// Value of a sortable column, `None` for unknown columns
    fn sort_value(&self, column: &str) -> Option<SortValue<'_>>;

    /// Record domain rule violations into `v`
    fn validate(&self, v: &mut Validator);

    /// Run [`validate`](Self::validate) on a fresh validator
    fn check(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        self.validate(&mut v);
        v.finish()
    }

    /// Comma-separated column list for SELECT and RETURNING clauses
    fn select_columns() -> String {
        let mut columns = vec!["id", "created_at"];
        columns.extend_from_slice(Self::MUTABLE_COLUMNS);
        columns.join(", ")
    }

    /// Whether `column` may appear in ORDER BY
    fn is_sortable(column: &str) -> bool {
        Self::SORT_SAFELIST
            .iter()
            .any(|safe| safe.trim_start_matches('-') == column)
    }
}

/// Partial update for a resource
///
/// Each field of a patch is either present (overwrite) or absent (keep the
/// stored value).
pub trait Patch<R>: Send {
    /// Overwrite the fields of `record` that are present in this patch
    fn apply_to(self, record: &mut R);

    /// Whether the patch carries no fields at all
    fn is_empty(&self) -> bool;
}
