use async_trait::async_trait;
use overbot_database::Database;
use overbot_models::{
    id::ProfileId,
    profile::Profile,
    rating::{RatingSnapshot, Ratings},
};
use overbot_overwatch::OverwatchClient;

use crate::error::OverError;

/// Append-only time series of computed ratings per profile.
#[async_trait]
pub trait RatingStore: Send + Sync {
    async fn insert(&self, snapshot: &RatingSnapshot) -> Result<(), OverError>;

    async fn latest(&self, profile_id: ProfileId) -> Result<Option<RatingSnapshot>, OverError>;

    /// Every snapshot of the profile, oldest first.
    async fn history(&self, profile_id: ProfileId) -> Result<Vec<RatingSnapshot>, OverError>;
}

/// Result of asking the stats provider for a profile's ratings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RatingOutcome {
    /// The player hides their career profile. Nothing may be derived from it.
    Private,
    Public(Ratings),
}

/// Computes the current ratings of a profile.
#[async_trait]
pub trait RatingSource: Send + Sync {
    async fn compute(&self, profile: &Profile) -> Result<RatingOutcome, OverError>;
}

#[async_trait]
impl RatingStore for Database {
    async fn insert(&self, snapshot: &RatingSnapshot) -> Result<(), OverError> {
        self.execute(
            "INSERT INTO rating (profile_id, tank, damage, support, date) VALUES ($1, $2, $3, $4, $5)",
            &[
                &snapshot.profile_id,
                &snapshot.ratings.tank,
                &snapshot.ratings.offense,
                &snapshot.ratings.support,
                &snapshot.captured_at,
            ],
        )
        .await?;
        Ok(())
    }

    async fn latest(&self, profile_id: ProfileId) -> Result<Option<RatingSnapshot>, OverError> {
        let snapshot = self
            .query_opt::<RatingSnapshot>(
                "SELECT profile_id, tank, damage, support, date FROM rating WHERE profile_id = $1 ORDER BY date DESC LIMIT 1",
                &[&profile_id],
            )
            .await?;
        Ok(snapshot)
    }

    async fn history(&self, profile_id: ProfileId) -> Result<Vec<RatingSnapshot>, OverError> {
        let snapshots = self
            .query::<RatingSnapshot>(
                "SELECT profile_id, tank, damage, support, date FROM rating WHERE profile_id = $1 ORDER BY date",
                &[&profile_id],
            )
            .await?;
        Ok(snapshots)
    }
}

#[async_trait]
impl RatingSource for OverwatchClient {
    #[tracing::instrument(skip_all, fields(profile = %profile.id))]
    async fn compute(&self, profile: &Profile) -> Result<RatingOutcome, OverError> {
        let player = self.get_profile(profile.platform, &profile.username).await?;
        if player.private {
            tracing::debug!("profile is private");
            return Ok(RatingOutcome::Private);
        }
        Ok(RatingOutcome::Public(player.ratings()))
    }
}
