use deadpool_postgres::{CreatePoolError, PoolError};
use std::{
    error::Error as StdError,
    fmt::{Display, Formatter},
};
use tokio_postgres::Error as PostgresError;

#[derive(Debug)]
pub struct DatabaseError {
    pub(crate) source: Option<Box<dyn StdError + Send + Sync>>,
    pub(crate) kind: ErrorKind,
}

#[derive(Debug)]
pub enum ErrorKind {
    CreatePool,
    Pool,
    Postgres,
    /// A row could not be converted into the requested model.
    Conversion,
}

impl DatabaseError {
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

impl From<CreatePoolError> for DatabaseError {
    fn from(value: CreatePoolError) -> Self {
        DatabaseError {
            source: Some(Box::new(value)),
            kind: ErrorKind::CreatePool,
        }
    }
}

impl From<PoolError> for DatabaseError {
    fn from(value: PoolError) -> Self {
        DatabaseError {
            source: Some(Box::new(value)),
            kind: ErrorKind::Pool,
        }
    }
}

impl From<PostgresError> for DatabaseError {
    fn from(value: PostgresError) -> Self {
        DatabaseError {
            source: Some(Box::new(value)),
            kind: ErrorKind::Postgres,
        }
    }
}

impl Display for DatabaseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ErrorKind::CreatePool => write!(f, "pool creation error - {:?}", self.source),
            ErrorKind::Postgres => write!(f, "postgres error - {:?}", self.source),
            ErrorKind::Pool => write!(f, "pool error - {:?}", self.source),
            ErrorKind::Conversion => write!(f, "row conversion error - {:?}", self.source),
        }
    }
}

impl StdError for DatabaseError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| &**source as &(dyn StdError + 'static))
    }
}
