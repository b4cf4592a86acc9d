use overbot_models::{
    id::{GuildId, ProfileId, UserId},
    nickname::NicknameBinding,
    profile::Profile,
    rating::Ratings,
};

use super::{
    encode, log_mutation_failure, reporting, CallSite, DisplayNameMutator, MutationError,
    MutationErrorKind, NicknameStore, Reporting,
};
use crate::{error::OverError, profiles::ProfileStore, ratings::RatingStore};

/// Keeps an account's nickname in one guild in step with the ratings of the
/// profile it opted in with.
///
/// Binding rows are only ever written from here. Every operation re-reads the
/// stores, nothing is cached between calls.
pub struct NicknameSync<'s> {
    pub bindings: &'s dyn NicknameStore,
    pub profiles: &'s dyn ProfileStore,
    pub ratings: &'s dyn RatingStore,
    pub mutator: &'s dyn DisplayNameMutator,
    pub max_length: usize,
}

#[derive(Debug)]
pub enum BindOutcome {
    /// The account already has a binding. Nothing was changed.
    AlreadyBound(NicknameBinding),
    /// The binding was stored. `failure` holds the reason the nickname itself
    /// could not be applied, if it could not.
    Bound {
        binding: NicknameBinding,
        nickname: String,
        failure: Option<MutationError>,
    },
}

#[derive(Debug)]
pub enum UnbindOutcome {
    NotBound,
    /// The binding was deleted, whether or not the nickname could be cleared.
    Unbound { failure: Option<MutationError> },
}

#[derive(Debug)]
pub enum RefreshOutcome {
    Unbound,
    /// The binding follows a different profile than the one recomputed.
    OtherProfile,
    /// The bound profile no longer exists.
    ProfileMissing,
    Applied { nickname: String },
    /// The nickname could not be applied. The failure was logged.
    MutationFailed {
        nickname: String,
        kind: MutationErrorKind,
    },
    StoreFailed,
}

impl NicknameSync<'_> {
    /// Whether the account currently has a nickname binding.
    ///
    /// # Errors
    ///
    /// Returns Err if the binding cannot be read.
    pub async fn exists(&self, account: UserId) -> Result<bool, OverError> {
        Ok(self.bindings.binding(account).await?.is_some())
    }

    /// Re-applies the nickname of a bound account from the latest stored ratings.
    /// Best effort: every failure is logged and reported only through the outcome.
    #[tracing::instrument(skip_all, fields(account = %account))]
    pub async fn refresh(&self, account: UserId, base_name: &str) -> RefreshOutcome {
        self.refresh_inner(account, None, base_name).await
    }

    /// Like [`refresh`](Self::refresh), but only when the binding follows `profile_id`.
    /// Called after the ratings of that profile were recomputed.
    #[tracing::instrument(skip_all, fields(account = %account, profile = %profile_id))]
    pub async fn refresh_for(
        &self,
        account: UserId,
        profile_id: ProfileId,
        base_name: &str,
    ) -> RefreshOutcome {
        self.refresh_inner(account, Some(profile_id), base_name)
            .await
    }

    async fn refresh_inner(
        &self,
        account: UserId,
        only: Option<ProfileId>,
        base_name: &str,
    ) -> RefreshOutcome {
        match self.try_refresh(account, only, base_name).await {
            Ok(outcome) => {
                tracing::trace!(outcome = ?outcome);
                outcome
            }
            Err(err) => {
                tracing::error!(err = ?err, "nickname refresh aborted");
                RefreshOutcome::StoreFailed
            }
        }
    }

    async fn try_refresh(
        &self,
        account: UserId,
        only: Option<ProfileId>,
        base_name: &str,
    ) -> Result<RefreshOutcome, OverError> {
        let Some(binding) = self.bindings.binding(account).await? else {
            return Ok(RefreshOutcome::Unbound);
        };
        if only.is_some_and(|id| id != binding.profile_id) {
            return Ok(RefreshOutcome::OtherProfile);
        }

        if self.profiles.profile_by_id(binding.profile_id).await?.is_none() {
            tracing::debug!(profile = %binding.profile_id, "bound profile is gone");
            return Ok(RefreshOutcome::ProfileMissing);
        }

        let ratings = self
            .ratings
            .latest(binding.profile_id)
            .await?
            .map(|s| s.ratings)
            .unwrap_or_default();
        let nickname = encode(base_name, &ratings, self.max_length);

        let res = self
            .mutator
            .set_display_name(account, binding.guild_id, Some(&nickname))
            .await;
        match res {
            Ok(()) => Ok(RefreshOutcome::Applied { nickname }),
            Err(err) => {
                log_mutation_failure(CallSite::Refresh, account, &err);
                Ok(RefreshOutcome::MutationFailed {
                    nickname,
                    kind: err.kind(),
                })
            }
        }
    }

    /// Opts the account in: shows `ratings` in its nickname in `guild` and
    /// remembers `profile` as the source for later refreshes.
    ///
    /// An account that is already bound is left untouched; it has to unbind first.
    ///
    /// # Errors
    ///
    /// Returns Err if the binding cannot be read or written. A failed nickname
    /// change is not an error, see [`BindOutcome::Bound`].
    #[tracing::instrument(skip_all, fields(account = %account, guild = %guild, profile = %profile.id))]
    pub async fn bind(
        &self,
        account: UserId,
        guild: GuildId,
        profile: &Profile,
        ratings: &Ratings,
        base_name: &str,
    ) -> Result<BindOutcome, OverError> {
        if let Some(existing) = self.bindings.binding(account).await? {
            tracing::debug!("account already has a nickname binding");
            return Ok(BindOutcome::AlreadyBound(existing));
        }

        let nickname = encode(base_name, ratings, self.max_length);
        let failure = match self
            .mutator
            .set_display_name(account, guild, Some(&nickname))
            .await
        {
            Ok(()) => None,
            Err(err) => settle(CallSite::Bind, account, err),
        };

        let binding = NicknameBinding {
            account_id: account,
            guild_id: guild,
            profile_id: profile.id,
        };
        self.bindings.save(&binding).await?;

        Ok(BindOutcome::Bound {
            binding,
            nickname,
            failure,
        })
    }

    /// Opts the account out: clears the nickname and deletes the binding. The
    /// binding is deleted even when the nickname cannot be cleared.
    ///
    /// # Errors
    ///
    /// Returns Err if the binding cannot be read or deleted.
    #[tracing::instrument(skip_all, fields(account = %account))]
    pub async fn unbind(&self, account: UserId) -> Result<UnbindOutcome, OverError> {
        let Some(binding) = self.bindings.binding(account).await? else {
            return Ok(UnbindOutcome::NotBound);
        };

        let failure = match self
            .mutator
            .set_display_name(account, binding.guild_id, None)
            .await
        {
            Ok(()) => None,
            Err(err) => settle(CallSite::Unbind, account, err),
        };

        self.bindings.delete(account).await?;

        Ok(UnbindOutcome::Unbound { failure })
    }

    /// Unbinds the account if its binding follows `profile_id`. Runs before that
    /// profile is unlinked so the nickname stops showing its ratings.
    ///
    /// # Errors
    ///
    /// Returns Err if the binding cannot be read or deleted.
    #[tracing::instrument(skip_all, fields(account = %account, profile = %profile_id))]
    pub async fn release_profile(
        &self,
        account: UserId,
        profile_id: ProfileId,
    ) -> Result<UnbindOutcome, OverError> {
        match self.bindings.binding(account).await? {
            Some(binding) if binding.profile_id == profile_id => self.unbind(account).await,
            _ => Ok(UnbindOutcome::NotBound),
        }
    }
}

/// Logs the failure and keeps it when the call site surfaces failures.
fn settle(site: CallSite, account: UserId, err: MutationError) -> Option<MutationError> {
    log_mutation_failure(site, account, &err);
    match reporting(site) {
        Reporting::LogOnly => None,
        Reporting::Surface => Some(err),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use overbot_models::{profile::Platform, rating::RatingSnapshot};

    use super::*;
    use crate::testing::{MemoryStore, RecordingMutator};

    const GUILD: u64 = 500;

    fn sync<'s>(store: &'s MemoryStore, mutator: &'s RecordingMutator) -> NicknameSync<'s> {
        NicknameSync {
            bindings: store,
            profiles: store,
            ratings: store,
            mutator,
            max_length: 32,
        }
    }

    async fn linked(store: &MemoryStore, account: UserId) -> Profile {
        store.link(account, Platform::Pc, "Alice#1234").await.unwrap()
    }

    fn tank(value: i32) -> Ratings {
        Ratings {
            tank: Some(value),
            ..Ratings::default()
        }
    }

    #[tokio::test]
    async fn bind_applies_and_persists() {
        let store = MemoryStore::default();
        let mutator = RecordingMutator::default();
        let account = UserId::new(1);
        let profile = linked(&store, account).await;
        let sync = sync(&store, &mutator);

        assert!(!sync.exists(account).await.unwrap());
        let outcome = sync
            .bind(account, GuildId::new(GUILD), &profile, &tank(1000), "Alice")
            .await
            .unwrap();

        let BindOutcome::Bound {
            binding,
            nickname,
            failure,
        } = outcome
        else {
            panic!("expected a new binding");
        };
        assert_eq!(nickname, "Alice [🛡1000]");
        assert!(failure.is_none());
        assert_eq!(binding.profile_id, profile.id);
        assert_eq!(store.binding_of(account), Some(binding));
        assert_eq!(
            mutator.calls(),
            vec![(account, GuildId::new(GUILD), Some("Alice [🛡1000]".to_string()))]
        );
        assert!(sync.exists(account).await.unwrap());
    }

    #[tokio::test]
    async fn bind_persists_even_when_the_platform_refuses() {
        let store = MemoryStore::default();
        let mutator = RecordingMutator::failing(MutationErrorKind::Forbidden);
        let account = UserId::new(2);
        let profile = linked(&store, account).await;

        let outcome = sync(&store, &mutator)
            .bind(account, GuildId::new(GUILD), &profile, &tank(2000), "Bob")
            .await
            .unwrap();

        match outcome {
            BindOutcome::Bound { failure, .. } => {
                let failure = failure.expect("failure is surfaced");
                assert_eq!(failure.kind(), MutationErrorKind::Forbidden);
                assert!(failure.is_recoverable());
            }
            BindOutcome::AlreadyBound(_) => panic!("expected a new binding"),
        }
        assert!(store.binding_of(account).is_some());
    }

    #[tokio::test]
    async fn bind_while_bound_is_rejected_without_changes() {
        let store = MemoryStore::default();
        let mutator = RecordingMutator::default();
        let account = UserId::new(3);
        let first = linked(&store, account).await;
        let second = store
            .link(account, Platform::Xbox, "Other")
            .await
            .unwrap();
        let sync = sync(&store, &mutator);

        sync.bind(account, GuildId::new(GUILD), &first, &tank(1), "Carol")
            .await
            .unwrap();
        let before = store.binding_of(account);
        let calls_before = mutator.calls().len();

        let outcome = sync
            .bind(account, GuildId::new(GUILD + 1), &second, &tank(2), "Carol")
            .await
            .unwrap();

        assert!(matches!(outcome, BindOutcome::AlreadyBound(b) if Some(b) == before));
        assert_eq!(store.binding_of(account), before);
        assert_eq!(mutator.calls().len(), calls_before);
    }

    #[tokio::test]
    async fn bind_then_unbind_leaves_no_binding() {
        let kinds = [None, Some(MutationErrorKind::Forbidden), Some(MutationErrorKind::Unexpected)];
        for bind_failure in kinds {
            for unbind_failure in kinds {
                let store = MemoryStore::default();
                let account = UserId::new(4);
                let profile = linked(&store, account).await;

                let mutator = RecordingMutator::with_failure(bind_failure);
                sync(&store, &mutator)
                    .bind(account, GuildId::new(GUILD), &profile, &tank(1500), "Dave")
                    .await
                    .unwrap();

                let mutator = RecordingMutator::with_failure(unbind_failure);
                let outcome = sync(&store, &mutator).unbind(account).await.unwrap();

                match outcome {
                    UnbindOutcome::Unbound { failure } => {
                        assert_eq!(failure.map(|f| f.kind()), unbind_failure);
                    }
                    UnbindOutcome::NotBound => panic!("binding should have existed"),
                }
                assert!(store.binding_of(account).is_none());
            }
        }
    }

    #[tokio::test]
    async fn unbind_clears_the_nickname_in_the_bound_guild() {
        let store = MemoryStore::default();
        let mutator = RecordingMutator::default();
        let account = UserId::new(5);
        let profile = linked(&store, account).await;
        store.insert_binding(account, 777, profile.id);

        sync(&store, &mutator).unbind(account).await.unwrap();

        assert_eq!(mutator.calls(), vec![(account, GuildId::new(777), None)]);
    }

    #[tokio::test]
    async fn unbind_without_binding_does_nothing() {
        let store = MemoryStore::default();
        let mutator = RecordingMutator::default();

        let outcome = sync(&store, &mutator).unbind(UserId::new(6)).await.unwrap();

        assert!(matches!(outcome, UnbindOutcome::NotBound));
        assert!(mutator.calls().is_empty());
    }

    #[tokio::test]
    async fn refresh_without_binding_is_a_no_op() {
        let store = MemoryStore::default();
        let mutator = RecordingMutator::default();

        let outcome = sync(&store, &mutator).refresh(UserId::new(7), "Eve").await;

        assert!(matches!(outcome, RefreshOutcome::Unbound));
        assert!(mutator.calls().is_empty());
    }

    #[tokio::test]
    async fn refresh_uses_the_latest_snapshot() {
        let store = MemoryStore::default();
        let mutator = RecordingMutator::default();
        let account = UserId::new(8);
        let profile = linked(&store, account).await;
        store.insert_binding(account, GUILD, profile.id);
        let now = Utc::now();
        store.push_snapshot(RatingSnapshot {
            profile_id: profile.id,
            ratings: tank(1000),
            captured_at: now - Duration::days(1),
        });
        store.push_snapshot(RatingSnapshot {
            profile_id: profile.id,
            ratings: Ratings {
                tank: Some(1100),
                support: Some(2500),
                ..Ratings::default()
            },
            captured_at: now,
        });

        let outcome = sync(&store, &mutator).refresh(account, "Frank").await;

        assert!(
            matches!(outcome, RefreshOutcome::Applied { ref nickname } if nickname == "Frank [🛡1100/✚2500]")
        );
    }

    #[tokio::test]
    async fn refresh_without_snapshot_shows_unranked() {
        let store = MemoryStore::default();
        let mutator = RecordingMutator::default();
        let account = UserId::new(9);
        let profile = linked(&store, account).await;
        store.insert_binding(account, GUILD, profile.id);

        let outcome = sync(&store, &mutator).refresh(account, "Grace").await;

        assert!(
            matches!(outcome, RefreshOutcome::Applied { ref nickname } if nickname == "Grace [Unranked]")
        );
    }

    #[tokio::test]
    async fn refresh_swallows_mutation_failures() {
        let store = MemoryStore::default();
        let mutator = RecordingMutator::failing(MutationErrorKind::Unexpected);
        let account = UserId::new(10);
        let profile = linked(&store, account).await;
        store.insert_binding(account, GUILD, profile.id);

        let outcome = sync(&store, &mutator).refresh(account, "Heidi").await;

        assert!(matches!(
            outcome,
            RefreshOutcome::MutationFailed {
                kind: MutationErrorKind::Unexpected,
                ..
            }
        ));
        assert!(store.binding_of(account).is_some());
    }

    #[tokio::test]
    async fn refresh_tells_refusals_apart() {
        let store = MemoryStore::default();
        let mutator = RecordingMutator::failing(MutationErrorKind::Forbidden);
        let account = UserId::new(14);
        let profile = linked(&store, account).await;
        store.insert_binding(account, GUILD, profile.id);

        let outcome = sync(&store, &mutator).refresh(account, "Niaj").await;

        assert!(matches!(
            outcome,
            RefreshOutcome::MutationFailed {
                kind: MutationErrorKind::Forbidden,
                ref nickname,
            } if nickname == "Niaj [Unranked]"
        ));
    }

    #[tokio::test]
    async fn releasing_the_bound_profile_clears_the_nickname() {
        let store = MemoryStore::default();
        let mutator = RecordingMutator::default();
        let account = UserId::new(15);
        let profile = linked(&store, account).await;
        let sync = sync(&store, &mutator);
        sync.bind(account, GuildId::new(GUILD), &profile, &tank(1000), "Olivia")
            .await
            .unwrap();

        let outcome = sync.release_profile(account, profile.id).await.unwrap();
        assert!(matches!(outcome, UnbindOutcome::Unbound { failure: None }));
        assert_eq!(
            mutator.calls().last(),
            Some(&(account, GuildId::new(GUILD), None))
        );
        assert!(store.binding_of(account).is_none());

        assert!(store.unlink(profile.id).await.unwrap());
        assert!(!sync.exists(account).await.unwrap());
    }

    #[tokio::test]
    async fn releasing_another_profile_keeps_the_binding() {
        let store = MemoryStore::default();
        let mutator = RecordingMutator::default();
        let account = UserId::new(16);
        let bound = linked(&store, account).await;
        let other = store.link(account, Platform::Xbox, "Peggy").await.unwrap();
        store.insert_binding(account, GUILD, bound.id);

        let outcome = sync(&store, &mutator)
            .release_profile(account, other.id)
            .await
            .unwrap();

        assert!(matches!(outcome, UnbindOutcome::NotBound));
        assert!(mutator.calls().is_empty());
        assert!(store.binding_of(account).is_some());
    }

    #[tokio::test]
    async fn releasing_deletes_the_binding_when_the_platform_refuses() {
        let store = MemoryStore::default();
        let mutator = RecordingMutator::failing(MutationErrorKind::Forbidden);
        let account = UserId::new(17);
        let profile = linked(&store, account).await;
        store.insert_binding(account, GUILD, profile.id);

        let outcome = sync(&store, &mutator)
            .release_profile(account, profile.id)
            .await
            .unwrap();

        let UnbindOutcome::Unbound { failure: Some(err) } = outcome else {
            panic!("expected a surfaced failure");
        };
        assert_eq!(err.kind(), MutationErrorKind::Forbidden);
        assert!(store.binding_of(account).is_none());
    }

    #[tokio::test]
    async fn refresh_for_ignores_other_profiles() {
        let store = MemoryStore::default();
        let mutator = RecordingMutator::default();
        let account = UserId::new(11);
        let bound = linked(&store, account).await;
        let other = store.link(account, Platform::Playstation, "Ivan").await.unwrap();
        store.insert_binding(account, GUILD, bound.id);
        let sync = sync(&store, &mutator);

        let outcome = sync.refresh_for(account, other.id, "Ivan").await;
        assert!(matches!(outcome, RefreshOutcome::OtherProfile));
        assert!(mutator.calls().is_empty());

        let outcome = sync.refresh_for(account, bound.id, "Ivan").await;
        assert!(matches!(outcome, RefreshOutcome::Applied { .. }));
    }

    #[tokio::test]
    async fn refresh_tolerates_a_missing_profile() {
        let store = MemoryStore::default();
        let mutator = RecordingMutator::default();
        let account = UserId::new(12);
        store.insert_binding(account, GUILD, ProfileId(404));

        let outcome = sync(&store, &mutator).refresh(account, "Judy").await;

        assert!(matches!(outcome, RefreshOutcome::ProfileMissing));
        assert!(mutator.calls().is_empty());
    }

    #[tokio::test]
    async fn refresh_reports_store_failures_without_erroring() {
        let store = MemoryStore::default();
        store.fail_reads();
        let mutator = RecordingMutator::default();

        let outcome = sync(&store, &mutator).refresh(UserId::new(13), "Mallory").await;

        assert!(matches!(outcome, RefreshOutcome::StoreFailed));
    }
}
