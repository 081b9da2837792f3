use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{validate_display_name, validate_roles};
use crate::repository::{Patch, Resource, SortValue};
use crate::validator::Validator;

/// A ranked player account
///
/// `total_matches` is zero for a player who has not finished a match yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct Player {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub nickname: String,
    pub mmr: i32,
    pub win_rate: i64,
    pub total_matches: i64,
    pub roles: Vec<String>,
}

impl Player {
    pub fn new(
        nickname: impl Into<String>,
        mmr: i32,
        win_rate: i64,
        total_matches: i64,
        roles: Vec<String>,
    ) -> Self {
        Self {
            id: 0,
            created_at: DateTime::<Utc>::default(),
            nickname: nickname.into(),
            mmr,
            win_rate,
            total_matches,
            roles,
        }
    }
}

impl Resource for Player {
    const NAME: &'static str = "Player";
    const TABLE: &'static str = "players";
    const MUTABLE_COLUMNS: &'static [&'static str] =
        &["nickname", "mmr", "win_rate", "total_matches", "roles"];
    const SEARCH_COLUMN: &'static str = "nickname";
    const TAGS_COLUMN: &'static str = "roles";
    const SEARCH_PARAM: &'static str = "nickname";
    const SORT_SAFELIST: &'static [&'static str] = &[
        "id",
        "nickname",
        "mmr",
        "win_rate",
        "total_matches",
        "roles",
        "-id",
        "-nickname",
        "-mmr",
        "-win_rate",
        "-total_matches",
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
        &self.nickname
    }

    fn tags(&self) -> &[String] {
        &self.roles
    }

    fn sort_value(&self, column: &str) -> Option<SortValue<'_>> {
        let value = match column {
            "id" => SortValue::Integer(self.id),
            "created_at" => SortValue::Timestamp(self.created_at),
            "nickname" => SortValue::Text(&self.nickname),
            "mmr" => SortValue::Integer(i64::from(self.mmr)),
            "win_rate" => SortValue::Integer(self.win_rate),
            "total_matches" => SortValue::Integer(self.total_matches),
            "roles" => SortValue::Tags(&self.roles),
            _ => return None,
        };
        Some(value)
    }

    fn validate(&self, v: &mut Validator) {
        validate_display_name(v, "nickname", &self.nickname);
        v.check(self.mmr > 0, "mmr", "must be greater than zero");
        v.check(self.win_rate > 0, "win_rate", "must be greater than zero");
        v.check(self.total_matches >= 0, "total_matches", "must not be negative");
        validate_roles(v, &self.roles);
    }
}

#[cfg(feature = "database")]
impl crate::store::PgResource for Player {
    fn bind_mutable<'q>(&'q self, query: crate::store::PgQuery<'q>) -> crate::store::PgQuery<'q> {
        query
            .bind(&self.nickname)
            .bind(self.mmr)
            .bind(self.win_rate)
            .bind(self.total_matches)
            .bind(&self.roles)
    }
}

/// Fields to overwrite on a stored player; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlayerPatch {
    pub nickname: Option<String>,
    pub mmr: Option<i32>,
    pub win_rate: Option<i64>,
    pub total_matches: Option<i64>,
    pub roles: Option<Vec<String>>,
}

impl Patch<Player> for PlayerPatch {
    fn apply_to(self, record: &mut Player) {
        if let Some(nickname) = self.nickname {
            record.nickname = nickname;
        }
        if let Some(mmr) = self.mmr {
            record.mmr = mmr;
        }
        if let Some(win_rate) = self.win_rate {
            record.win_rate = win_rate;
        }
        if let Some(total_matches) = self.total_matches {
            record.total_matches = total_matches;
        }
        if let Some(roles) = self.roles {
            record.roles = roles;
        }
    }

    fn is_empty(&self) -> bool {
        self.nickname.is_none()
            && self.mmr.is_none()
            && self.win_rate.is_none()
            && self.total_matches.is_none()
            && self.roles.is_none()
    }
}
