//! # arena-data
//!
//! Typed data-access layer for game characters and players on PostgreSQL.
//!
//! ## Features
//!
//! - **Uniform repositories**: insert, get, full-replace update, delete and
//!   filtered listing for every resource through one [`Repository`](repository::Repository) trait
//! - **Listings**: full-text search, role-tag containment, safelisted sorting
//!   with a stable id tie-breaker, page metadata from a windowed count
//! - **Optimistic concurrency**: updates that race with a delete surface as edit conflicts
//! - **Deadlines**: every store call is bounded and times out as a retriable error
//! - **Backends**: PostgreSQL via `sqlx` (feature `database`, on by default) and
//!   an in-process store with the same semantics
//!
//! ## Example
//!
//! ```rust,no_run
//! use arena_data::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let pool = create_pool(&config.database).await?;
//!     run_migrations(&pool).await?;
//!
//!     let repos = Repositories::postgres(pool, config.database.query_timeout());
//!     let request = ListRequest::from_query::<Character>(&Default::default())
//!         .map_err(|e| RepositoryError::validation_failed(RepositoryOperation::List, e))?;
//!     let listing = repos
//!         .characters
//!         .get_all(&request.search, &request.tags, &request.filters)
//!         .await?;
//!
//!     tracing::info!(total = listing.metadata.total_records, "characters listed");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod repository;
pub mod store;
pub mod validator;

#[cfg(feature = "database")]
pub mod database;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, DatabaseConfig, ServiceConfig};
    pub use crate::error::{Error, Result};
    pub use crate::models::{Character, CharacterPatch, Player, PlayerPatch};
    pub use crate::observability::init_tracing;
    pub use crate::repository::{
        apply_patch, Filters, ListRequest, Listing, Metadata, OrderDirection, Patch,
        Repositories, Repository, RepositoryError, RepositoryErrorKind, RepositoryOperation,
        RepositoryResult, Resource, ResourceRepository,
    };
    pub use crate::store::{MemoryStore, Store};
    pub use crate::validator::{ValidationErrors, Validator};

    #[cfg(feature = "database")]
    pub use crate::database::{create_pool, run_migrations};

    #[cfg(feature = "database")]
    pub use crate::store::{PgResource, PgStore};
}
