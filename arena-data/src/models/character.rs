use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{validate_display_name, validate_roles};
use crate::repository::{Patch, Resource, SortValue};
use crate::validator::Validator;

/// A playable character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct Character {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub health: i32,
    pub move_speed: i32,
    pub mana: i32,
    pub roles: Vec<String>,
}

impl Character {
    /// A character that has not been stored yet
    pub fn new(
        name: impl Into<String>,
        health: i32,
        move_speed: i32,
        mana: i32,
        roles: Vec<String>,
    ) -> Self {
        Self {
            id: 0,
            created_at: DateTime::<Utc>::default(),
            name: name.into(),
            health,
            move_speed,
            mana,
            roles,
        }
    }
}

impl Resource for Character {
    const NAME: &'static str = "Character";
    const TABLE: &'static str = "characters";
    const MUTABLE_COLUMNS: &'static [&'static str] =
        &["name", "health", "move_speed", "mana", "roles"];
    const SEARCH_COLUMN: &'static str = "name";
    const TAGS_COLUMN: &'static str = "roles";
    const SEARCH_PARAM: &'static str = "name";
    const SORT_SAFELIST: &'static [&'static str] = &[
        "id",
        "name",
        "health",
        "move_speed",
        "mana",
        "roles",
        "-id",
        "-name",
        "-health",
        "-move_speed",
        "-mana",
        "-roles",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn assign_identity(&mut self, id: i64, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }

    fn search_text(&self) -> &str {
        &self.name
    }

    fn tags(&self) -> &[String] {
        &self.roles
    }

    fn sort_value(&self, column: &str) -> Option<SortValue<'_>> {
        match column {
            "id" => Some(SortValue::Integer(self.id)),
            "created_at" => Some(SortValue::Timestamp(self.created_at)),
            "name" => Some(SortValue::Text(&self.name)),
            "health" => Some(SortValue::Integer(i64::from(self.health))),
            "move_speed" => Some(SortValue::Integer(i64::from(self.move_speed))),
            "mana" => Some(SortValue::Integer(i64::from(self.mana))),
            "roles" => Some(SortValue::Tags(&self.roles)),
            _ => None,
        }
    }

    fn validate(&self, v: &mut Validator) {
        validate_display_name(v, "name", &self.name);
        v.check(self.health > 0, "health", "must be greater than zero");
        v.check(self.move_speed > 0, "move_speed", "must be greater than zero");
        v.check(self.mana > 0, "mana", "must be greater than zero");
        validate_roles(v, &self.roles);
    }
}

#[cfg(feature = "database")]
impl crate::store::PgResource for Character {
    fn bind_mutable<'q>(&'q self, query: crate::store::PgQuery<'q>) -> crate::store::PgQuery<'q> {
        query
            .bind(&self.name)
            .bind(self.health)
            .bind(self.move_speed)
            .bind(self.mana)
            .bind(&self.roles)
    }
}

/// Fields to overwrite on a stored character; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CharacterPatch {
    pub name: Option<String>,
    pub health: Option<i32>,
    pub move_speed: Option<i32>,
    pub mana: Option<i32>,
    pub roles: Option<Vec<String>>,
}

impl Patch<Character> for CharacterPatch {
    fn apply_to(self, record: &mut Character) {
        if let Some(name) = self.name {
            record.name = name;
        }
        if let Some(health) = self.health {
            record.health = health;
        }
        if let Some(move_speed) = self.move_speed {
            record.move_speed = move_speed;
        }
        if let Some(mana) = self.mana {
            record.mana = mana;
        }
        if let Some(roles) = self.roles {
            record.roles = roles;
        }
    }

    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.health.is_none()
            && self.move_speed.is_none()
            && self.mana.is_none()
            && self.roles.is_none()
    }
}
