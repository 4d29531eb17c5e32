//! The execution gate: the single choke point for statement execution.
//!
//! Every statement of a run is routed through [`ExecutionGate::execute`] with
//! an explicit [`Route`], so the dry-run guarantee is structural instead of
//! being scattered across call sites.

use tracing::{debug, info};

use crate::error::RefreshResult;
use crate::schema::TableDefinition;
use crate::session::RefreshSession;

/// Which session a statement is routed to.
///
/// Modeled as a two-variant tagged choice rather than two independently
/// implemented call paths, keeping the dry-run suppression centralized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Read,
    Write,
}

/// Routes every statement of a run to the read or the write session and
/// suppresses write execution when dry-run is enabled.
///
/// Owns the session pair for the run's lifetime; [`ExecutionGate::close`]
/// releases both connections.
pub struct ExecutionGate<R, W> {
    read: R,
    write: W,
    dry_run: bool,
}

impl<R, W> ExecutionGate<R, W>
where
    R: RefreshSession,
    W: RefreshSession,
{
    pub fn new(read: R, write: W, dry_run: bool) -> Self {
        Self {
            read,
            write,
            dry_run,
        }
    }

    /// Returns whether this gate suppresses write statements.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Executes a statement on the session selected by `route`.
    ///
    /// Read statements always execute, independent of dry-run, so previews
    /// stay truthful even when nothing will be written. Write statements are
    /// discarded without touching any session when dry-run is enabled,
    /// reported as zero affected rows.
    pub async fn execute(&mut self, sql: &str, route: Route) -> RefreshResult<u64> {
        match route {
            Route::Read => self.read.execute(sql).await,
            Route::Write if self.dry_run => {
                info!(statement = sql, "dry run, discarding write statement");

                Ok(0)
            }
            Route::Write => self.write.execute(sql).await,
        }
    }

    /// Runs a scalar count query on the read session. Never suppressed.
    pub async fn fetch_count(&mut self, sql: &str) -> RefreshResult<u64> {
        self.read.fetch_count(sql).await
    }

    /// Captures a table definition through the read session. Never
    /// suppressed.
    pub async fn fetch_table_definition(&mut self, sql: &str) -> RefreshResult<TableDefinition> {
        self.read.fetch_table_definition(sql).await
    }

    /// Closes out one page.
    ///
    /// The read session is rolled back unconditionally, releasing its locks
    /// and snapshot promptly. The write session is committed only when
    /// dry-run is disabled: with dry-run enabled the gate never issued a
    /// write, so there is nothing to commit and no commit is attempted.
    pub async fn complete_page(&mut self) -> RefreshResult<()> {
        self.read.rollback().await?;

        if self.dry_run {
            debug!("dry run, writes would be committed here");

            return Ok(());
        }

        self.write.commit().await
    }

    /// Releases both sessions. Both closes are attempted even if the first
    /// fails.
    pub async fn close(self) -> RefreshResult<()> {
        let read = self.read.close().await;
        let write = self.write.close().await;

        read.and(write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ScriptedSession;

    #[tokio::test]
    async fn test_read_statements_execute_even_under_dry_run() {
        let read = ScriptedSession::new();
        let read_log = read.log();
        let write = ScriptedSession::new();
        let write_log = write.log();

        let mut gate = ExecutionGate::new(read, write, true);
        gate.execute("SELECT 1", Route::Read).await.unwrap();

        assert_eq!(read_log.executed(), vec!["SELECT 1"]);
        assert!(write_log.executed().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_discards_write_statements_without_touching_any_session() {
        let read = ScriptedSession::new();
        let read_log = read.log();
        let write = ScriptedSession::new().with_insert_results([7]);
        let write_log = write.log();

        let mut gate = ExecutionGate::new(read, write, true);
        let affected = gate
            .execute("INSERT INTO t SELECT * FROM s", Route::Write)
            .await
            .unwrap();

        assert_eq!(affected, 0);
        assert!(read_log.executed().is_empty());
        assert!(write_log.executed().is_empty());
    }

    #[tokio::test]
    async fn test_write_statements_reach_the_write_session_when_live() {
        let read = ScriptedSession::new();
        let read_log = read.log();
        let write = ScriptedSession::new().with_insert_results([7]);
        let write_log = write.log();

        let mut gate = ExecutionGate::new(read, write, false);
        let affected = gate
            .execute("INSERT INTO t SELECT * FROM s", Route::Write)
            .await
            .unwrap();

        assert_eq!(affected, 7);
        assert!(read_log.executed().is_empty());
        assert_eq!(write_log.executed(), vec!["INSERT INTO t SELECT * FROM s"]);
    }

    #[tokio::test]
    async fn test_complete_page_rolls_back_read_and_commits_write() {
        let read = ScriptedSession::new();
        let read_log = read.log();
        let write = ScriptedSession::new();
        let write_log = write.log();

        let mut gate = ExecutionGate::new(read, write, false);
        gate.complete_page().await.unwrap();

        assert_eq!(read_log.rollbacks(), 1);
        assert_eq!(write_log.commits(), 1);
    }

    #[tokio::test]
    async fn test_complete_page_never_commits_under_dry_run() {
        let read = ScriptedSession::new();
        let read_log = read.log();
        let write = ScriptedSession::new();
        let write_log = write.log();

        let mut gate = ExecutionGate::new(read, write, true);
        gate.complete_page().await.unwrap();

        assert_eq!(read_log.rollbacks(), 1);
        assert_eq!(write_log.commits(), 0);
    }

    #[tokio::test]
    async fn test_close_releases_both_sessions() {
        let read = ScriptedSession::new();
        let read_log = read.log();
        let write = ScriptedSession::new();
        let write_log = write.log();

        let gate = ExecutionGate::new(read, write, false);
        gate.close().await.unwrap();

        assert!(read_log.is_closed());
        assert!(write_log.is_closed());
    }
}
