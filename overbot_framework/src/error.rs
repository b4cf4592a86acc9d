use overbot_core::error::OverError;
use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
};
use twilight_http::{response::DeserializeBodyError, Error as DiscordHttpError};

use crate::arguments::ArgumentError;

#[derive(Debug)]
pub struct FrameworkError {
    source: Option<Box<dyn StdError + Send + Sync>>,
    kind: ErrorKind,
}

#[derive(Debug)]
pub enum ErrorKind {
    Argument,
    Core,
    Discord,
    Render,
    Signature,
}

impl FrameworkError {
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

impl Display for FrameworkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.kind {
            ErrorKind::Argument => f.write_str("argument error: ")?,
            ErrorKind::Core => f.write_str("core error: ")?,
            ErrorKind::Discord => f.write_str("discord error: ")?,
            ErrorKind::Render => f.write_str("render error: ")?,
            ErrorKind::Signature => f.write_str("signature error: ")?,
        }
        match &self.source {
            Some(err) => Display::fmt(&err, f),
            None => f.write_str(""),
        }
    }
}

impl StdError for FrameworkError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| &**source as &(dyn StdError + 'static))
    }
}

impl From<ArgumentError> for FrameworkError {
    fn from(err: ArgumentError) -> Self {
        Self {
            source: Some(Box::new(err)),
            kind: ErrorKind::Argument,
        }
    }
}

impl From<OverError> for FrameworkError {
    fn from(err: OverError) -> Self {
        Self {
            source: Some(Box::new(err)),
            kind: ErrorKind::Core,
        }
    }
}

impl From<DiscordHttpError> for FrameworkError {
    fn from(err: DiscordHttpError) -> Self {
        Self {
            source: Some(Box::new(err)),
            kind: ErrorKind::Discord,
        }
    }
}

impl From<DeserializeBodyError> for FrameworkError {
    fn from(err: DeserializeBodyError) -> Self {
        Self {
            source: Some(Box::new(err)),
            kind: ErrorKind::Discord,
        }
    }
}
