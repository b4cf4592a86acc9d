use overbot_database::DatabaseError;
use overbot_overwatch::error::OverwatchError;
use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
};
use twilight_http::{response::DeserializeBodyError, Error as DiscordHttpError};

#[derive(Debug)]
pub struct OverError {
    source: Option<Box<dyn StdError + Send + Sync>>,
    kind: ErrorKind,
}

#[derive(Debug)]
pub enum ErrorKind {
    Database,
    Discord,
    Function,
    Overwatch,
}

impl OverError {
    #[must_use]
    pub const fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    #[must_use]
    pub fn into_source(self) -> Option<Box<dyn StdError + Send + Sync>> {
        self.source
    }

    #[must_use]
    pub fn into_parts(self) -> (ErrorKind, Option<Box<dyn StdError + Send + Sync>>) {
        (self.kind, self.source)
    }

    #[must_use]
    pub fn from_parts(kind: ErrorKind, source: Option<Box<dyn StdError + Send + Sync>>) -> Self {
        Self { source, kind }
    }
}

impl Display for OverError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.kind {
            ErrorKind::Database => f.write_str("profile storage failed: ")?,
            ErrorKind::Discord => f.write_str("discord request failed: ")?,
            ErrorKind::Function => f.write_str("profile operation failed: ")?,
            ErrorKind::Overwatch => f.write_str("ratings lookup failed: ")?,
        }
        match &self.source {
            Some(err) => Display::fmt(&err, f),
            None => f.write_str("no further details"),
        }
    }
}

impl StdError for OverError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| &**source as &(dyn StdError + 'static))
    }
}

impl From<DatabaseError> for OverError {
    fn from(err: DatabaseError) -> Self {
        Self {
            source: Some(Box::new(err)),
            kind: ErrorKind::Database,
        }
    }
}

impl From<DiscordHttpError> for OverError {
    fn from(err: DiscordHttpError) -> Self {
        Self {
            source: Some(Box::new(err)),
            kind: ErrorKind::Discord,
        }
    }
}

impl From<DeserializeBodyError> for OverError {
    fn from(err: DeserializeBodyError) -> Self {
        Self {
            source: Some(Box::new(err)),
            kind: ErrorKind::Discord,
        }
    }
}

impl From<OverwatchError> for OverError {
    fn from(err: OverwatchError) -> Self {
        Self {
            source: Some(Box::new(err)),
            kind: ErrorKind::Overwatch,
        }
    }
}
