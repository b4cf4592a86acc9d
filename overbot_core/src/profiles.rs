use async_trait::async_trait;
use overbot_database::{Database, DatabaseError};
use overbot_models::{
    id::{ProfileId, UserId},
    profile::{Platform, Profile},
};

use crate::error::OverError;

/// Read and write access to linked profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Profiles of an account, oldest first, at most `limit` of them.
    async fn profiles_for_account(
        &self,
        account: UserId,
        limit: i64,
    ) -> Result<Vec<Profile>, OverError>;

    async fn profile_by_id(&self, id: ProfileId) -> Result<Option<Profile>, OverError>;

    async fn profile_count(&self, account: UserId) -> Result<i64, OverError>;

    async fn is_premium(&self, account: UserId) -> Result<bool, OverError>;

    async fn link(
        &self,
        account: UserId,
        platform: Platform,
        username: &str,
    ) -> Result<Profile, OverError>;

    async fn update(
        &self,
        id: ProfileId,
        platform: Platform,
        username: &str,
    ) -> Result<bool, OverError>;

    /// Deletes the profile together with any nickname binding that points at it.
    async fn unlink(&self, id: ProfileId) -> Result<bool, OverError>;
}

/// How many profiles an account may link, by tier.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProfileLimits {
    pub free: i64,
    pub premium: i64,
}

impl ProfileLimits {
    #[must_use]
    pub const fn for_tier(self, premium: bool) -> i64 {
        if premium {
            self.premium
        } else {
            self.free
        }
    }

    /// Resolves the limit that applies to `account`.
    ///
    /// # Errors
    ///
    /// Returns Err if the tier cannot be read.
    pub async fn resolve(
        self,
        store: &dyn ProfileStore,
        account: UserId,
    ) -> Result<i64, OverError> {
        let premium = store.is_premium(account).await?;
        Ok(self.for_tier(premium))
    }
}

impl Default for ProfileLimits {
    fn default() -> Self {
        Self {
            free: 5,
            premium: 25,
        }
    }
}

#[async_trait]
impl ProfileStore for Database {
    async fn profiles_for_account(
        &self,
        account: UserId,
        limit: i64,
    ) -> Result<Vec<Profile>, OverError> {
        let profiles = self
            .query::<Profile>(
                "SELECT id, member_id, platform, username FROM profile WHERE member_id = $1 ORDER BY id LIMIT $2",
                &[&account, &limit],
            )
            .await?;
        Ok(profiles)
    }

    async fn profile_by_id(&self, id: ProfileId) -> Result<Option<Profile>, OverError> {
        let profile = self
            .query_opt::<Profile>(
                "SELECT id, member_id, platform, username FROM profile WHERE id = $1",
                &[&id],
            )
            .await?;
        Ok(profile)
    }

    async fn profile_count(&self, account: UserId) -> Result<i64, OverError> {
        let row = self
            .query_one("SELECT COUNT(*) FROM profile WHERE member_id = $1", &[&account])
            .await?;
        Ok(row.try_get(0).map_err(DatabaseError::from)?)
    }

    async fn is_premium(&self, account: UserId) -> Result<bool, OverError> {
        let row = self
            .query_one(
                "SELECT EXISTS (SELECT TRUE FROM member WHERE id = $1 AND premium)",
                &[&account],
            )
            .await?;
        Ok(row.try_get(0).map_err(DatabaseError::from)?)
    }

    async fn link(
        &self,
        account: UserId,
        platform: Platform,
        username: &str,
    ) -> Result<Profile, OverError> {
        self.execute(
            "INSERT INTO member (id) VALUES ($1) ON CONFLICT (id) DO NOTHING",
            &[&account],
        )
        .await?;
        let row = self
            .query_one(
                "INSERT INTO profile (member_id, platform, username) VALUES ($1, $2, $3) RETURNING id, member_id, platform, username",
                &[&account, &platform, &username],
            )
            .await?;
        Ok(Profile::try_from(row).map_err(DatabaseError::from)?)
    }

    async fn update(
        &self,
        id: ProfileId,
        platform: Platform,
        username: &str,
    ) -> Result<bool, OverError> {
        let rows = self
            .execute(
                "UPDATE profile SET platform = $2, username = $3 WHERE id = $1",
                &[&id, &platform, &username],
            )
            .await?;
        Ok(rows > 0)
    }

    async fn unlink(&self, id: ProfileId) -> Result<bool, OverError> {
        let rows = self
            .execute(
                "WITH binding AS (DELETE FROM nickname WHERE profile_id = $1) DELETE FROM profile WHERE id = $1",
                &[&id],
            )
            .await?;
        Ok(rows > 0)
    }
}
