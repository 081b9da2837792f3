//! Generic repository layer shared by every resource type
//!
//! # Features
//!
//! - **Uniform CRUD**: [`Repository`] exposes insert, get, update, delete and
//!   filtered listing for any record type
//! - **One implementation**: [`ResourceRepository`] runs the shared protocol
//!   (id guards, edit conflicts, per-call deadlines) over any [`Store`](crate::store::Store)
//! - **Safe listings**: [`Filters`] and [`ListingQuery`] keep caller input out of
//!   statement text; sort columns must come from a fixed safelist
//! - **Partial updates**: [`apply_patch`] runs the read-modify-write cycle
//! - **Registry**: [`Repositories`] groups one repository per resource
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use arena_data::models::Character;
//! use arena_data::repository::{Filters, Repositories, Repository, Resource};
//!
//! let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
//! rt.block_on(async {
//!     let repos = Repositories::in_memory(Duration::from_secs(3));
//!     let mage = Character::new("Frost Mage", 450, 300, 200, vec!["mage".into()]);
//!     let stored = repos.characters.insert(mage).await.unwrap();
//!
//!     let filters = Filters::new(1, 10, "-health", Character::SORT_SAFELIST);
//!     let listing = repos.characters.get_all("frost", &[], &filters).await.unwrap();
//!     assert_eq!(listing.records, vec![stored]);
//!     assert_eq!(listing.metadata.total_records, 1);
//! });
//! ```

mod error;
mod pagination;
mod params;
mod patch;
mod query;
mod registry;
mod resource;
mod resource_repository;
mod traits;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use pagination::{Filters, Metadata, OrderDirection, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use params::ListRequest;
pub use patch::apply_patch;
pub use query::{ListingQuery, TOTAL_RECORDS_COLUMN};
#[cfg(feature = "database")]
pub use registry::{PgCharacters, PgPlayers};
pub use registry::{MemoryCharacters, MemoryPlayers, Repositories};
pub use resource::{Patch, Resource, SortValue};
pub use resource_repository::{ResourceRepository, DEFAULT_QUERY_TIMEOUT};
pub use traits::{Listing, Repository, RepositoryResult};
