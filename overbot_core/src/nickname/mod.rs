pub mod encode;
pub mod sync;

use async_trait::async_trait;
use overbot_database::Database;
use overbot_models::{
    id::{GuildId, UserId},
    nickname::NicknameBinding,
};
use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
};

use crate::error::OverError;

pub use encode::encode;
pub use sync::{BindOutcome, NicknameSync, RefreshOutcome, UnbindOutcome};

/// Storage of the single nickname slot per account.
#[async_trait]
pub trait NicknameStore: Send + Sync {
    async fn binding(&self, account: UserId) -> Result<Option<NicknameBinding>, OverError>;

    /// Insert-or-replace keyed by the account: an account never has two rows.
    async fn save(&self, binding: &NicknameBinding) -> Result<(), OverError>;

    async fn delete(&self, account: UserId) -> Result<bool, OverError>;
}

/// Changes a member's display name in a guild. `None` clears it.
#[async_trait]
pub trait DisplayNameMutator: Send + Sync {
    async fn set_display_name(
        &self,
        account: UserId,
        guild: GuildId,
        name: Option<&str>,
    ) -> Result<(), MutationError>;
}

#[derive(Debug)]
pub struct MutationError {
    source: Option<Box<dyn StdError + Send + Sync>>,
    kind: MutationErrorKind,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MutationErrorKind {
    /// Missing permission or the member sits above the bot in the role hierarchy.
    Forbidden,
    RateLimited,
    Unexpected,
}

impl MutationError {
    #[must_use]
    pub fn new(kind: MutationErrorKind, source: Option<Box<dyn StdError + Send + Sync>>) -> Self {
        Self { source, kind }
    }

    #[must_use]
    pub const fn kind(&self) -> MutationErrorKind {
        self.kind
    }

    /// Platform rejections the user can act on. Everything else is unexpected.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self.kind,
            MutationErrorKind::Forbidden | MutationErrorKind::RateLimited
        )
    }
}

impl Display for MutationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.kind {
            MutationErrorKind::Forbidden => f.write_str("not allowed to change the nickname")?,
            MutationErrorKind::RateLimited => f.write_str("rate limited changing the nickname")?,
            MutationErrorKind::Unexpected => f.write_str("could not change the nickname")?,
        }
        match &self.source {
            Some(err) => write!(f, ": {err}"),
            None => Ok(()),
        }
    }
}

impl StdError for MutationError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| &**source as &(dyn StdError + 'static))
    }
}

/// Where a display-name mutation is attempted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CallSite {
    Refresh,
    Bind,
    Unbind,
}

/// What happens to a failed mutation at a call site.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Reporting {
    /// Logged only. The caller's flow carries on untouched.
    LogOnly,
    /// Logged and handed back to the caller to show the user.
    Surface,
}

#[must_use]
pub const fn reporting(site: CallSite) -> Reporting {
    match site {
        CallSite::Refresh => Reporting::LogOnly,
        CallSite::Bind | CallSite::Unbind => Reporting::Surface,
    }
}

pub(crate) fn log_mutation_failure(site: CallSite, account: UserId, err: &MutationError) {
    if err.is_recoverable() {
        tracing::warn!(?site, %account, err = %err, "display name mutation rejected");
    } else {
        tracing::error!(?site, %account, err = ?err, "display name mutation failed");
    }
}

#[async_trait]
impl NicknameStore for Database {
    async fn binding(&self, account: UserId) -> Result<Option<NicknameBinding>, OverError> {
        let binding = self
            .query_opt::<NicknameBinding>(
                "SELECT id, server_id, profile_id FROM nickname WHERE id = $1",
                &[&account],
            )
            .await?;
        Ok(binding)
    }

    async fn save(&self, binding: &NicknameBinding) -> Result<(), OverError> {
        self.execute(
            "INSERT INTO nickname (id, server_id, profile_id) VALUES ($1, $2, $3) ON CONFLICT (id) DO UPDATE SET server_id = EXCLUDED.server_id, profile_id = EXCLUDED.profile_id",
            &[&binding.account_id, &binding.guild_id, &binding.profile_id],
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, account: UserId) -> Result<bool, OverError> {
        let rows = self
            .execute("DELETE FROM nickname WHERE id = $1", &[&account])
            .await?;
        Ok(rows > 0)
    }
}
