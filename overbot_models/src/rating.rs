use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::id::ProfileId;

/// The three gameplay role categories. Declaration order is the canonical order
/// used whenever roles are listed.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Tank,
    Offense,
    Support,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Tank, Role::Offense, Role::Support];

    /// Marker placed in front of the rating inside a nickname.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Role::Tank => '🛡',
            Role::Offense => '⚔',
            Role::Support => '✚',
        }
    }

    /// Column name in the `rating` table.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Role::Tank => "tank",
            Role::Offense => "damage",
            Role::Support => "support",
        }
    }

    /// Maps the role names used by the stats provider.
    #[must_use]
    pub fn from_provider(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "tank" => Some(Role::Tank),
            "damage" | "offense" => Some(Role::Offense),
            "support" => Some(Role::Support),
            _ => None,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Role::Tank => f.write_str("Tank"),
            Role::Offense => f.write_str("Damage"),
            Role::Support => f.write_str("Support"),
        }
    }
}

/// Per-role ratings. `None` means the role was not played or not ranked.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Ratings {
    pub tank: Option<i32>,
    pub offense: Option<i32>,
    pub support: Option<i32>,
}

impl Ratings {
    #[must_use]
    pub const fn get(&self, role: Role) -> Option<i32> {
        match role {
            Role::Tank => self.tank,
            Role::Offense => self.offense,
            Role::Support => self.support,
        }
    }

    pub fn set(&mut self, role: Role, value: Option<i32>) {
        match role {
            Role::Tank => self.tank = value,
            Role::Offense => self.offense = value,
            Role::Support => self.support = value,
        }
    }

    /// Ranked roles in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Role, i32)> + '_ {
        Role::ALL
            .into_iter()
            .filter_map(|role| self.get(role).map(|value| (role, value)))
    }

    #[must_use]
    pub fn is_unranked(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl FromIterator<(Role, i32)> for Ratings {
    fn from_iter<I: IntoIterator<Item = (Role, i32)>>(iter: I) -> Self {
        let mut ratings = Ratings::default();
        for (role, value) in iter {
            ratings.set(role, Some(value));
        }
        ratings
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RatingSnapshot {
    pub profile_id: ProfileId,
    pub ratings: Ratings,
    pub captured_at: DateTime<Utc>,
}

impl TryFrom<tokio_postgres::Row> for RatingSnapshot {
    type Error = tokio_postgres::Error;

    fn try_from(row: tokio_postgres::Row) -> Result<Self, Self::Error> {
        let profile_id = row.try_get("profile_id")?;
        let tank = row.try_get(Role::Tank.column())?;
        let offense = row.try_get(Role::Offense.column())?;
        let support = row.try_get(Role::Support.column())?;
        let captured_at = row.try_get("date")?;

        Ok(Self {
            profile_id,
            ratings: Ratings {
                tank,
                offense,
                support,
            },
            captured_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_follows_canonical_order() {
        let ratings = Ratings {
            tank: None,
            offense: Some(2800),
            support: Some(2500),
        };
        let roles = ratings.iter().map(|(r, _)| r).collect::<Vec<_>>();
        assert_eq!(roles, vec![Role::Offense, Role::Support]);
    }

    #[test]
    fn empty_ratings_are_unranked() {
        assert!(Ratings::default().is_unranked());
        assert!(!Ratings {
            support: Some(1),
            ..Ratings::default()
        }
        .is_unranked());
    }

    #[test]
    fn provider_role_names() {
        assert_eq!(Role::from_provider("DAMAGE"), Some(Role::Offense));
        assert_eq!(Role::from_provider("offense"), Some(Role::Offense));
        assert_eq!(Role::from_provider("open"), None);
    }

    #[test]
    fn collect_from_pairs() {
        let ratings = [(Role::Support, 3000), (Role::Tank, 2000)]
            .into_iter()
            .collect::<Ratings>();
        assert_eq!(ratings.tank, Some(2000));
        assert_eq!(ratings.offense, None);
        assert_eq!(ratings.support, Some(3000));
    }
}
