use overbot_models::rating::{Ratings, Role};
use serde::Deserialize;

/// The subset of the provider's `profile` payload the bot reads.
#[derive(Debug, Deserialize)]
pub struct PlayerProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub ratings: Option<Vec<RoleRating>>,
    #[serde(rename = "gamesWon", default)]
    pub games_won: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RoleRating {
    pub role: String,
    pub level: i32,
}

impl PlayerProfile {
    /// Folds the provider's rating list into per-role ratings. Unknown roles and
    /// non-positive levels are ignored.
    #[must_use]
    pub fn ratings(&self) -> Ratings {
        self.ratings
            .iter()
            .flatten()
            .filter(|r| r.level > 0)
            .filter_map(|r| Role::from_provider(&r.role).map(|role| (role, r.level)))
            .collect()
    }
}
