#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use deadpool_postgres::{Config, Object, Pool, Runtime};
use tokio_postgres::{types::ToSql, NoTls, Row};

pub use crate::error::{DatabaseError, ErrorKind};

mod error;

const SCHEMA: &str = include_str!("schema.sql");

pub struct Database {
    pool: Pool,
}

impl Database {
    /// Creates the connection pool. Connections are opened lazily.
    ///
    /// # Errors
    ///
    /// Returns Err if the connection string cannot be turned into a pool.
    pub fn new(connection_string: &str) -> Result<Self, DatabaseError> {
        let config = Config {
            url: Some(connection_string.to_string()),
            ..Config::default()
        };
        let pool = config.create_pool(Some(Runtime::Tokio1), NoTls)?;

        Ok(Self { pool })
    }

    /// Applies the schema. Every statement is idempotent.
    ///
    /// # Errors
    ///
    /// Returns Err if no connection is available or a statement fails.
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        let client = self.get().await?;
        client.batch_execute(SCHEMA).await?;
        tracing::info!("database schema is up to date");
        Ok(())
    }

    /// Returns a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns Err if there are no more connections left or the connection fails.
    pub async fn get(&self) -> Result<Object, DatabaseError> {
        Ok(self.pool.get().await?)
    }

    /// Runs the statement and converts every returned row.
    ///
    /// # Errors
    ///
    /// Returns Err if the statement fails or a row does not match `T`.
    pub async fn query<T>(
        &self,
        statement: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<T>, DatabaseError>
    where
        T: TryFrom<Row, Error = tokio_postgres::Error>,
    {
        let client = self.get().await?;
        let statement = client.prepare_cached(statement).await?;
        let rows = client.query(&statement, params).await?;
        rows.into_iter().map(convert).collect()
    }

    /// Runs the statement and converts the row, if one was returned.
    ///
    /// # Errors
    ///
    /// Returns Err if the statement fails, returns more than one row or the row
    /// does not match `T`.
    pub async fn query_opt<T>(
        &self,
        statement: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<T>, DatabaseError>
    where
        T: TryFrom<Row, Error = tokio_postgres::Error>,
    {
        let client = self.get().await?;
        let statement = client.prepare_cached(statement).await?;
        let row = client.query_opt(&statement, params).await?;
        row.map(convert).transpose()
    }

    /// Runs the statement and returns the raw row. Used for scalar queries such
    /// as `SELECT EXISTS (...)`.
    ///
    /// # Errors
    ///
    /// Returns Err if the statement fails or does not return exactly one row.
    pub async fn query_one(
        &self,
        statement: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Row, DatabaseError> {
        let client = self.get().await?;
        let statement = client.prepare_cached(statement).await?;
        Ok(client.query_one(&statement, params).await?)
    }

    /// Runs the statement and returns the number of modified rows.
    ///
    /// # Errors
    ///
    /// Returns Err if the statement fails.
    pub async fn execute(
        &self,
        statement: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, DatabaseError> {
        let client = self.get().await?;
        let statement = client.prepare_cached(statement).await?;
        Ok(client.execute(&statement, params).await?)
    }
}

fn convert<T>(row: Row) -> Result<T, DatabaseError>
where
    T: TryFrom<Row, Error = tokio_postgres::Error>,
{
    T::try_from(row).map_err(|err| DatabaseError {
        source: Some(Box::new(err)),
        kind: ErrorKind::Conversion,
    })
}
