use hyper::StatusCode;
use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
};

#[derive(Debug)]
pub enum ErrorKind {
    BuildingRequest,
    Sending,
    ChunkingResponse,
    /// The provider has no player with this name on this platform.
    NotFound,
    Response {
        route: String,
        status: StatusCode,
        bytes: Vec<u8>,
    },
    Deserialize,
}

#[derive(Debug)]
pub struct OverwatchError {
    pub(super) source: Option<Box<dyn StdError + Send + Sync>>,
    pub(super) kind: ErrorKind,
}

#[derive(Debug)]
pub struct DeserializeBodyError {
    pub(super) source: Option<Box<dyn StdError + Send + Sync>>,
    pub(super) bytes: Vec<u8>,
}

impl OverwatchError {
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
}

impl Display for OverwatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.kind() {
            ErrorKind::BuildingRequest => write!(f, "could not build the player profile request"),
            ErrorKind::Sending => write!(f, "the stats provider could not be reached"),
            ErrorKind::ChunkingResponse => {
                write!(f, "the stats provider's response was cut off")
            }
            ErrorKind::NotFound => write!(f, "no player with this name on this platform"),
            ErrorKind::Response {
                route,
                status,
                bytes: _,
            } => write!(f, "the stats provider answered {status} for {route}"),
            ErrorKind::Deserialize => write!(f, "the player profile could not be parsed"),
        }
    }
}

impl StdError for OverwatchError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| &**source as &(dyn StdError + 'static))
    }
}

impl Display for DeserializeBodyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let display = String::from_utf8_lossy(&self.bytes);
        write!(f, "bytes: {display}")
    }
}

impl StdError for DeserializeBodyError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| &**source as &(dyn StdError + 'static))
    }
}
