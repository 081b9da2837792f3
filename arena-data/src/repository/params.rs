//! Listing parameters read from a query string
//!
//! Missing parameters fall back to defaults (`page=1`, `page_size=20`,
//! `sort=id`, no search, no tags). Malformed integers are reported as field
//! errors together with any filter rule violations.

use std::collections::HashMap;
use std::str::FromStr;

use super::pagination::{Filters, DEFAULT_PAGE_SIZE};
use super::resource::Resource;
use crate::validator::{ValidationErrors, Validator};

/// Decoded arguments for [`Repository::get_all`](super::Repository::get_all)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub search: String,
    pub tags: Vec<String>,
    pub filters: Filters,
}

impl ListRequest {
    /// Read listing parameters for resource `R` from decoded query pairs
    ///
    /// The search text comes from `R::SEARCH_PARAM` (e.g. `name` for
    /// characters) and tags from the comma-separated `roles` parameter.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use arena_data::models::Character;
    /// use arena_data::repository::ListRequest;
    ///
    /// let qs: HashMap<String, String> = [("roles", "mage,support"), ("sort", "-health")]
    ///     .into_iter()
    ///     .map(|(k, v)| (k.to_string(), v.to_string()))
    ///     .collect();
    ///
    /// let request = ListRequest::from_query::<Character>(&qs).unwrap();
    /// assert_eq!(request.tags, vec!["mage", "support"]);
    /// assert_eq!(request.filters.page, 1);
    /// ```
    pub fn from_query<R: Resource>(
        qs: &HashMap<String, String>,
    ) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new();

        let search = read_string(qs, R::SEARCH_PARAM, "");
        let tags = read_csv(qs, "roles");
        let page = read_int(qs, "page", 1, &mut v);
        let page_size = read_int(qs, "page_size", DEFAULT_PAGE_SIZE, &mut v);
        let sort = read_string(qs, "sort", "id");

        let filters = Filters::new(page, page_size, sort, R::SORT_SAFELIST);
        filters.validate_into(&mut v);
        v.finish()?;

        Ok(Self {
            search,
            tags,
            filters,
        })
    }
}

fn read_string(qs: &HashMap<String, String>, key: &str, default: &str) -> String {
    match qs.get(key) {
        Some(value) if !value.is_empty() => value.clone(),
        _ => default.to_string(),
    }
}

fn read_csv(qs: &HashMap<String, String>, key: &str) -> Vec<String> {
    qs.get(key)
        .map(|csv| {
            csv.split(',')
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn read_int<T: FromStr>(
    qs: &HashMap<String, String>,
    key: &str,
    default: T,
    v: &mut Validator,
) -> T {
    match qs.get(key) {
        Some(value) if !value.is_empty() => value.parse().unwrap_or_else(|_| {
            v.add_error(key, "must be an integer value");
            default
        }),
        _ => default,
    }
}
