//! Record types served by the repository layer
//!
//! Each record implements [`Resource`](crate::repository::Resource) for the
//! shared repository protocol and, with the `database` feature,
//! [`PgResource`](crate::store::PgResource) for row mapping.

mod character;
mod player;

pub use character::{Character, CharacterPatch};
pub use player::{Player, PlayerPatch};

use crate::validator::{unique, Validator};

/// Longest accepted display name, in bytes
pub const MAX_NAME_BYTES: usize = 500;

/// Rules shared by every display-name column
pub(crate) fn validate_display_name(v: &mut Validator, field: &str, value: &str) {
    v.check(!value.is_empty(), field, "must be provided");
    v.check(
        value.len() <= MAX_NAME_BYTES,
        field,
        "must not be more than 500 bytes long",
    );
}

/// Rules shared by every role-tag column
pub(crate) fn validate_roles(v: &mut Validator, roles: &[String]) {
    v.check(!roles.is_empty(), "roles", "must contain at least 1 role");
    v.check(unique(roles), "roles", "must not contain duplicate values");
}
