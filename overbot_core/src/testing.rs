//! In-memory stand-ins for the store and collaborator traits.

use async_trait::async_trait;
use overbot_models::{
    id::{GuildId, ProfileId, UserId},
    nickname::NicknameBinding,
    profile::{Platform, Profile},
    rating::RatingSnapshot,
};
use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use crate::{
    error::{ErrorKind, OverError},
    nickname::{DisplayNameMutator, MutationError, MutationErrorKind, NicknameStore},
    profiles::ProfileStore,
    ratings::RatingStore,
    selector::{Choice, ChoiceRequest, ProfileChooser},
};

#[derive(Default)]
struct State {
    next_id: i64,
    premium: HashSet<UserId>,
    profiles: Vec<Profile>,
    snapshots: Vec<RatingSnapshot>,
    bindings: HashMap<UserId, NicknameBinding>,
    fail_reads: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn set_premium(&self, account: UserId) {
        self.state.lock().unwrap().premium.insert(account);
    }

    pub fn insert_binding(&self, account: UserId, guild: u64, profile_id: ProfileId) {
        self.state.lock().unwrap().bindings.insert(
            account,
            NicknameBinding {
                account_id: account,
                guild_id: GuildId::new(guild),
                profile_id,
            },
        );
    }

    pub fn binding_of(&self, account: UserId) -> Option<NicknameBinding> {
        self.state.lock().unwrap().bindings.get(&account).copied()
    }

    pub fn push_snapshot(&self, snapshot: RatingSnapshot) {
        self.state.lock().unwrap().snapshots.push(snapshot);
    }

    /// Makes every later binding read fail.
    pub fn fail_reads(&self) {
        self.state.lock().unwrap().fail_reads = true;
    }
}

fn unavailable() -> OverError {
    OverError::from_parts(ErrorKind::Database, Some("store unavailable".into()))
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn profiles_for_account(
        &self,
        account: UserId,
        limit: i64,
    ) -> Result<Vec<Profile>, OverError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .profiles
            .iter()
            .filter(|p| p.member_id == account)
            .take(usize::try_from(limit).unwrap_or_default())
            .cloned()
            .collect())
    }

    async fn profile_by_id(&self, id: ProfileId) -> Result<Option<Profile>, OverError> {
        let state = self.state.lock().unwrap();
        Ok(state.profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn profile_count(&self, account: UserId) -> Result<i64, OverError> {
        let state = self.state.lock().unwrap();
        let count = state.profiles.iter().filter(|p| p.member_id == account).count();
        Ok(i64::try_from(count).unwrap())
    }

    async fn is_premium(&self, account: UserId) -> Result<bool, OverError> {
        Ok(self.state.lock().unwrap().premium.contains(&account))
    }

    async fn link(
        &self,
        account: UserId,
        platform: Platform,
        username: &str,
    ) -> Result<Profile, OverError> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let profile = Profile {
            id: ProfileId(state.next_id),
            member_id: account,
            platform,
            username: username.to_string(),
        };
        state.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn update(
        &self,
        id: ProfileId,
        platform: Platform,
        username: &str,
    ) -> Result<bool, OverError> {
        let mut state = self.state.lock().unwrap();
        match state.profiles.iter_mut().find(|p| p.id == id) {
            Some(profile) => {
                profile.platform = platform;
                profile.username = username.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn unlink(&self, id: ProfileId) -> Result<bool, OverError> {
        let mut state = self.state.lock().unwrap();
        let before = state.profiles.len();
        state.profiles.retain(|p| p.id != id);
        state.snapshots.retain(|s| s.profile_id != id);
        state.bindings.retain(|_, b| b.profile_id != id);
        Ok(state.profiles.len() < before)
    }
}

#[async_trait]
impl RatingStore for MemoryStore {
    async fn insert(&self, snapshot: &RatingSnapshot) -> Result<(), OverError> {
        self.push_snapshot(snapshot.clone());
        Ok(())
    }

    async fn latest(&self, profile_id: ProfileId) -> Result<Option<RatingSnapshot>, OverError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .snapshots
            .iter()
            .filter(|s| s.profile_id == profile_id)
            .max_by_key(|s| s.captured_at)
            .cloned())
    }

    async fn history(&self, profile_id: ProfileId) -> Result<Vec<RatingSnapshot>, OverError> {
        let state = self.state.lock().unwrap();
        let mut history = state
            .snapshots
            .iter()
            .filter(|s| s.profile_id == profile_id)
            .cloned()
            .collect::<Vec<_>>();
        history.sort_by_key(|s| s.captured_at);
        Ok(history)
    }
}

#[async_trait]
impl NicknameStore for MemoryStore {
    async fn binding(&self, account: UserId) -> Result<Option<NicknameBinding>, OverError> {
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(unavailable());
        }
        Ok(state.bindings.get(&account).copied())
    }

    async fn save(&self, binding: &NicknameBinding) -> Result<(), OverError> {
        let mut state = self.state.lock().unwrap();
        state.bindings.insert(binding.account_id, *binding);
        Ok(())
    }

    async fn delete(&self, account: UserId) -> Result<bool, OverError> {
        let mut state = self.state.lock().unwrap();
        Ok(state.bindings.remove(&account).is_some())
    }
}

/// Records every display name change and optionally fails all of them.
#[derive(Default)]
pub struct RecordingMutator {
    failure: Option<MutationErrorKind>,
    calls: Mutex<Vec<(UserId, GuildId, Option<String>)>>,
}

impl RecordingMutator {
    pub fn failing(kind: MutationErrorKind) -> Self {
        Self::with_failure(Some(kind))
    }

    pub fn with_failure(failure: Option<MutationErrorKind>) -> Self {
        Self {
            failure,
            calls: Mutex::default(),
        }
    }

    pub fn calls(&self) -> Vec<(UserId, GuildId, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DisplayNameMutator for RecordingMutator {
    async fn set_display_name(
        &self,
        account: UserId,
        guild: GuildId,
        name: Option<&str>,
    ) -> Result<(), MutationError> {
        self.calls
            .lock()
            .unwrap()
            .push((account, guild, name.map(ToString::to_string)));
        match self.failure {
            Some(kind) => Err(MutationError::new(kind, None)),
            None => Ok(()),
        }
    }
}

/// Answers every request with the same choice and keeps the requests.
pub struct ScriptedChooser {
    answer: Choice,
    requests: Mutex<Vec<ChoiceRequest>>,
}

impl ScriptedChooser {
    pub fn answering(answer: Choice) -> Self {
        Self {
            answer,
            requests: Mutex::default(),
        }
    }

    pub fn requests(&self) -> Vec<ChoiceRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileChooser for ScriptedChooser {
    async fn choose(&self, request: ChoiceRequest) -> Result<Choice, OverError> {
        self.requests.lock().unwrap().push(request);
        Ok(self.answer.clone())
    }
}
