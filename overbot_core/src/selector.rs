use async_trait::async_trait;
use overbot_models::{id::UserId, profile::Profile};
use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
    time::Duration,
};

use crate::{
    error::OverError,
    profiles::{ProfileLimits, ProfileStore},
};

/// Discord caps select menu labels at 100 characters.
pub const LABEL_LIMIT: usize = 100;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
    pub description: Option<String>,
}

/// A single-choice question put to one account.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChoiceRequest {
    /// Only this account may answer.
    pub requester: UserId,
    pub prompt: String,
    pub options: Vec<ChoiceOption>,
    pub timeout: Duration,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Choice {
    /// The `value` of the chosen option.
    Selected(String),
    TimedOut,
    /// A newer question for the same requester replaced this one.
    Superseded,
}

/// Presents a [`ChoiceRequest`] and waits for the answer.
///
/// Implementors must reject answers from any account other than the requester
/// and must not wait longer than the request's timeout.
#[async_trait]
pub trait ProfileChooser: Send + Sync {
    async fn choose(&self, request: ChoiceRequest) -> Result<Choice, OverError>;
}

#[derive(Debug)]
pub enum SelectError {
    /// No profile was chosen. Nothing should be done.
    NoSelectionMade,
    Generic(OverError),
}

/// Resolves which of an account's profiles an operation applies to.
pub struct ProfileSelector<'s> {
    pub profiles: &'s dyn ProfileStore,
    pub chooser: &'s dyn ProfileChooser,
    pub limits: ProfileLimits,
    pub timeout: Duration,
}

impl ProfileSelector<'_> {
    /// Picks one of `owner`'s profiles on behalf of `requester`.
    ///
    /// A single profile is returned straight away. With more than one, the
    /// requester is asked to choose.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::NoSelectionMade`] if the owner has no profiles or
    /// the requester did not choose in time.
    #[tracing::instrument(skip_all, fields(requester = %requester, owner = %owner))]
    pub async fn select(
        &self,
        requester: UserId,
        owner: UserId,
        prompt: &str,
    ) -> Result<Profile, SelectError> {
        let limit = self.limits.resolve(self.profiles, owner).await?;
        let mut profiles = self.profiles.profiles_for_account(owner, limit).await?;

        match profiles.len() {
            0 => {
                tracing::debug!("owner has no profiles to choose from");
                return Err(SelectError::NoSelectionMade);
            }
            1 => return profiles.pop().ok_or(SelectError::NoSelectionMade),
            _ => {}
        }

        let request = ChoiceRequest {
            requester,
            prompt: prompt.to_string(),
            options: profiles.iter().map(option).collect(),
            timeout: self.timeout,
        };

        match self.chooser.choose(request).await? {
            Choice::Selected(value) => {
                let chosen = profiles.into_iter().find(|p| p.id.to_string() == value);
                if chosen.is_none() {
                    tracing::warn!(value = %value, "chosen value matches no profile");
                }
                chosen.ok_or(SelectError::NoSelectionMade)
            }
            Choice::TimedOut | Choice::Superseded => Err(SelectError::NoSelectionMade),
        }
    }
}

fn option(profile: &Profile) -> ChoiceOption {
    let label = format!("{} ({})", profile.username, profile.platform.display_name());
    let label = match label.char_indices().nth(LABEL_LIMIT) {
        Some((idx, _)) => label[..idx].to_string(),
        None => label,
    };
    ChoiceOption {
        value: profile.id.to_string(),
        label,
        description: None,
    }
}

impl Display for SelectError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::NoSelectionMade => f.write_str("no profile was selected"),
            Self::Generic(err) => Display::fmt(err, f),
        }
    }
}

impl StdError for SelectError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::NoSelectionMade => None,
            Self::Generic(err) => Some(err),
        }
    }
}

impl From<OverError> for SelectError {
    fn from(err: OverError) -> Self {
        Self::Generic(err)
    }
}
