//! The session abstraction over the run's two database connections.
//!
//! A run holds exactly one read-only session and one write session, each
//! bound to its own connection for the run's whole duration. The engine only
//! ever talks to sessions through [`RefreshSession`] so tests can substitute
//! scripted sessions for real connections.

use sqlx::mysql::MySqlConnectOptions;
use sqlx::{ConnectOptions, Connection, Executor, MySqlConnection, Row};

use crate::error::RefreshResult;
use crate::schema::TableDefinition;

/// Access mode of a session within the run's session pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAccess {
    ReadOnly,
    ReadWrite,
}

/// One database session of the run's read/write pair.
pub trait RefreshSession {
    /// Executes a statement and returns the number of affected rows.
    fn execute(&mut self, sql: &str) -> impl Future<Output = RefreshResult<u64>>;

    /// Runs a query expected to return a single scalar count.
    fn fetch_count(&mut self, sql: &str) -> impl Future<Output = RefreshResult<u64>>;

    /// Runs a `SHOW CREATE TABLE` statement and returns the captured
    /// definition.
    fn fetch_table_definition(
        &mut self,
        sql: &str,
    ) -> impl Future<Output = RefreshResult<TableDefinition>>;

    /// Commits the session's open transaction.
    fn commit(&mut self) -> impl Future<Output = RefreshResult<()>>;

    /// Rolls back the session's open transaction.
    fn rollback(&mut self) -> impl Future<Output = RefreshResult<()>>;

    /// Releases the underlying connection.
    fn close(self) -> impl Future<Output = RefreshResult<()>>;
}

/// A [`RefreshSession`] bound to a dedicated MySQL connection.
pub struct MySqlSession {
    conn: MySqlConnection,
}

impl MySqlSession {
    /// Opens a new session.
    ///
    /// Autocommit is disabled so the per-page COMMIT/ROLLBACK cadence is
    /// controlled entirely by the engine. Read-only sessions are additionally
    /// pinned to read-only transactions server side, which keeps introspection
    /// from ever interfering with the write session's transaction boundaries.
    pub async fn connect(options: MySqlConnectOptions, access: SessionAccess) -> RefreshResult<Self> {
        let mut conn = options.connect().await?;

        conn.execute("SET autocommit = 0").await?;
        if access == SessionAccess::ReadOnly {
            conn.execute("SET SESSION TRANSACTION READ ONLY").await?;
        }

        Ok(Self { conn })
    }
}

impl RefreshSession for MySqlSession {
    async fn execute(&mut self, sql: &str) -> RefreshResult<u64> {
        let result = self.conn.execute(sql).await?;

        Ok(result.rows_affected())
    }

    async fn fetch_count(&mut self, sql: &str) -> RefreshResult<u64> {
        let row = self.conn.fetch_one(sql).await?;
        let count: i64 = row.try_get(0)?;

        Ok(count.max(0) as u64)
    }

    async fn fetch_table_definition(&mut self, sql: &str) -> RefreshResult<TableDefinition> {
        // `SHOW CREATE TABLE` returns one row shaped (table name, DDL text).
        let row = self.conn.fetch_one(sql).await?;

        Ok(TableDefinition {
            name: row.try_get(0)?,
            ddl: row.try_get(1)?,
        })
    }

    async fn commit(&mut self) -> RefreshResult<()> {
        self.conn.execute("COMMIT").await?;

        Ok(())
    }

    async fn rollback(&mut self) -> RefreshResult<()> {
        self.conn.execute("ROLLBACK").await?;

        Ok(())
    }

    async fn close(self) -> RefreshResult<()> {
        self.conn.close().await?;

        Ok(())
    }
}
