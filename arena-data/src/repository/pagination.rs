//! Pagination and sort parameters for listing queries
//!
//! [`Filters`] carries the page, page size and sort expression a caller asked
//! for, together with the endpoint's sort safelist. [`Metadata`] summarizes a
//! listing result for the response body.
//!
//! # Example
//!
//! ```rust
//! use arena_data::repository::{Filters, Metadata, OrderDirection};
//!
//! const SAFELIST: &[&str] = &["id", "health", "-id", "-health"];
//!
//! let filters = Filters::new(3, 10, "-health", SAFELIST);
//! assert!(filters.validate().is_ok());
//! assert_eq!(filters.limit(), 10);
//! assert_eq!(filters.offset(), 20);
//! assert_eq!(filters.sort_column(), Some("health"));
//! assert_eq!(filters.sort_direction(), OrderDirection::Descending);
//!
//! let metadata = Metadata::calculate(25, filters.page, filters.page_size);
//! assert_eq!(metadata.last_page, 3);
//! ```

use std::fmt;

use serde::Serialize;

use crate::validator::{permitted_value, ValidationErrors, Validator};

/// Default page size when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page size a caller may request
pub const MAX_PAGE_SIZE: i64 = 100;

/// Direction for ordering results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Sort in ascending order (A-Z, 0-9)
    #[default]
    Ascending,
    /// Sort in descending order (Z-A, 9-0)
    Descending,
}

impl OrderDirection {
    /// SQL keyword for this direction
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// Page, page size and sort expression for a listing
///
/// `sort` names a column, optionally prefixed with `-` for descending order.
/// It is only honoured when it appears verbatim in `sort_safelist`; column
/// names cannot be bound as query parameters, so the safelist is what keeps
/// caller input out of the query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    /// Requested page, 1-indexed
    pub page: i64,
    /// Records per page
    pub page_size: i64,
    /// Sort expression, e.g. `"name"` or `"-health"`
    pub sort: String,
    /// Every sort expression the endpoint accepts, ascending and descending
    pub sort_safelist: &'static [&'static str],
}

impl Filters {
    pub fn new(
        page: i64,
        page_size: i64,
        sort: impl Into<String>,
        sort_safelist: &'static [&'static str],
    ) -> Self {
        Self {
            page,
            page_size,
            sort: sort.into(),
            sort_safelist,
        }
    }

    /// First page, default page size, sorted by `id` ascending
    pub fn first_page(sort_safelist: &'static [&'static str]) -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE, "id", sort_safelist)
    }

    /// Record every rule violation into `v`
    pub fn validate_into(&self, v: &mut Validator) {
        v.check(self.page > 0, "page", "must be greater than zero");

        v.check(self.page_size > 0, "page_size", "must be greater than zero");
        v.check(
            self.page_size <= MAX_PAGE_SIZE,
            "page_size",
            "must be a maximum of 100",
        );

        v.check(
            permitted_value(&self.sort, self.sort_safelist),
            "sort",
            "invalid sort value",
        );
    }

    /// Validate page, page size and sort, reporting all violations together
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        self.validate_into(&mut v);
        v.finish()
    }

    /// Column named by the sort expression, without any `-` prefix
    ///
    /// Returns `None` when the expression is not in the safelist, so an
    /// unchecked value can never be turned into a column name.
    pub fn sort_column(&self) -> Option<&str> {
        self.sort_safelist
            .iter()
            .find(|safe| **safe == self.sort)
            .map(|safe| safe.trim_start_matches('-'))
    }

    pub fn sort_direction(&self) -> OrderDirection {
        if self.sort.starts_with('-') {
            OrderDirection::Descending
        } else {
            OrderDirection::Ascending
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Rows to skip: `(page - 1) * page_size`, saturating for huge pages
    pub fn offset(&self) -> i64 {
        self.page
            .saturating_sub(1)
            .max(0)
            .saturating_mul(self.page_size.max(0))
    }
}

/// Pagination summary returned alongside a listing
///
/// Every field is zero when no record matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

impl Metadata {
    /// Build metadata for `total_records` matches at `page` / `page_size`
    #[must_use]
    pub fn calculate(total_records: i64, page: i64, page_size: i64) -> Self {
        if total_records <= 0 || page_size <= 0 {
            return Self::default();
        }

        Self {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: (total_records + page_size - 1) / page_size,
            total_records,
        }
    }
}
