use crate::id::{GuildId, ProfileId, UserId};

/// The single per-account display-name slot: which guild carries the nickname
/// and which profile's ratings drive it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NicknameBinding {
    pub account_id: UserId,
    pub guild_id: GuildId,
    pub profile_id: ProfileId,
}

impl TryFrom<tokio_postgres::Row> for NicknameBinding {
    type Error = tokio_postgres::Error;

    fn try_from(row: tokio_postgres::Row) -> Result<Self, Self::Error> {
        let account_id = row.try_get("id")?;
        let guild_id = row.try_get("server_id")?;
        let profile_id = row.try_get("profile_id")?;

        Ok(Self {
            account_id,
            guild_id,
            profile_id,
        })
    }
}
