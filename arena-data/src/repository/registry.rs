//! One repository per resource type, built once and passed around explicitly

use std::time::Duration;

use super::resource_repository::{ResourceRepository, DEFAULT_QUERY_TIMEOUT};
use super::traits::Repository;
use crate::models::{Character, Player};
use crate::store::MemoryStore;

#[cfg(feature = "database")]
use crate::store::PgStore;

/// Character repository over PostgreSQL
#[cfg(feature = "database")]
pub type PgCharacters = ResourceRepository<Character, PgStore>;

/// Player repository over PostgreSQL
#[cfg(feature = "database")]
pub type PgPlayers = ResourceRepository<Player, PgStore>;

/// Character repository over an in-process store
pub type MemoryCharacters = ResourceRepository<Character, MemoryStore<Character>>;

/// Player repository over an in-process store
pub type MemoryPlayers = ResourceRepository<Player, MemoryStore<Player>>;

/// The data-access surface handed to request handlers
///
/// Each field exposes the same [`Repository`] operations for its record
/// type, so handlers are generic over the backend.
///
/// # Example
///
/// ```rust,ignore
/// use arena_data::repository::{Filters, Repositories, Repository, Resource};
/// use arena_data::models::Character;
///
/// let repos = Repositories::postgres(pool, config.database.query_timeout());
/// let tanks = repos
///     .characters
///     .get_all("", &["tank".into()], &Filters::first_page(Character::SORT_SAFELIST))
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct Repositories<C, P> {
    pub characters: C,
    pub players: P,
}

impl<C, P> Repositories<C, P>
where
    C: Repository<Character>,
    P: Repository<Player>,
{
    pub fn new(characters: C, players: P) -> Self {
        Self {
            characters,
            players,
        }
    }
}

#[cfg(feature = "database")]
impl Repositories<PgCharacters, PgPlayers> {
    /// Wire both repositories to one shared pool
    pub fn postgres(pool: sqlx::PgPool, query_timeout: Duration) -> Self {
        let store = PgStore::new(pool);
        Self::new(
            ResourceRepository::with_timeout(store.clone(), query_timeout),
            ResourceRepository::with_timeout(store, query_timeout),
        )
    }
}

impl Repositories<MemoryCharacters, MemoryPlayers> {
    /// Wire both repositories to fresh in-process stores
    pub fn in_memory(query_timeout: Duration) -> Self {
        Self::new(
            ResourceRepository::with_timeout(MemoryStore::new(), query_timeout),
            ResourceRepository::with_timeout(MemoryStore::new(), query_timeout),
        )
    }
}

impl Default for Repositories<MemoryCharacters, MemoryPlayers> {
    fn default() -> Self {
        Self::in_memory(DEFAULT_QUERY_TIMEOUT)
    }
}
