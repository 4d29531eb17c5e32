use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::{RefreshError, RefreshResult};
use crate::schema::TableDefinition;
use crate::session::RefreshSession;

#[derive(Debug, Default)]
struct Recorded {
    executed: Vec<String>,
    queried: Vec<String>,
    commits: usize,
    rollbacks: usize,
    closed: bool,
}

/// Shared view into everything a [`ScriptedSession`] has been asked to do.
///
/// The engine consumes its sessions, so tests keep a [`SessionLog`] clone
/// around to inspect the session after the run finished.
#[derive(Debug, Clone, Default)]
pub struct SessionLog(Arc<Mutex<Recorded>>);

impl SessionLog {
    /// Statements passed to `execute`, in order.
    pub fn executed(&self) -> Vec<String> {
        self.0.lock().unwrap().executed.clone()
    }

    /// Queries passed to the read-path fetches, in order.
    pub fn queried(&self) -> Vec<String> {
        self.0.lock().unwrap().queried.clone()
    }

    pub fn commits(&self) -> usize {
        self.0.lock().unwrap().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.0.lock().unwrap().rollbacks
    }

    pub fn is_closed(&self) -> bool {
        self.0.lock().unwrap().closed
    }
}

/// In-memory session that records every statement and replays scripted
/// responses.
#[derive(Debug, Default)]
pub struct ScriptedSession {
    log: SessionLog,
    insert_results: VecDeque<u64>,
    counts: VecDeque<u64>,
    table_definitions: VecDeque<TableDefinition>,
    fail_on: Option<String>,
    fail_skip: usize,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a shared log that stays inspectable after the session has been
    /// consumed by the engine.
    pub fn log(&self) -> SessionLog {
        self.log.clone()
    }

    /// Scripts the rows-affected responses for successive INSERT statements.
    ///
    /// All other statements report zero affected rows, matching how MySQL
    /// reports DDL.
    pub fn with_insert_results(mut self, rows: impl IntoIterator<Item = u64>) -> Self {
        self.insert_results = rows.into_iter().collect();
        self
    }

    /// Scripts the response to the next `fetch_count` call.
    pub fn with_count(mut self, count: u64) -> Self {
        self.counts.push_back(count);
        self
    }

    /// Scripts the response to the next `fetch_table_definition` call.
    pub fn with_table_definition(mut self, definition: TableDefinition) -> Self {
        self.table_definitions.push_back(definition);
        self
    }

    /// Makes every statement containing `needle` fail with an execution
    /// error.
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    /// Like [`ScriptedSession::failing_on`], but lets the first `skip`
    /// matching statements succeed before failing.
    pub fn failing_on_after(mut self, needle: &str, skip: usize) -> Self {
        self.fail_on = Some(needle.to_string());
        self.fail_skip = skip;
        self
    }

    fn scripted_failure(&mut self, sql: &str) -> Option<RefreshError> {
        let needle = self.fail_on.as_deref()?;
        if !sql.contains(needle) {
            return None;
        }
        if self.fail_skip > 0 {
            self.fail_skip -= 1;
            return None;
        }

        Some(RefreshError::Execution(sqlx::Error::Protocol(format!(
            "scripted failure for statement: {sql}"
        ))))
    }
}

impl RefreshSession for ScriptedSession {
    async fn execute(&mut self, sql: &str) -> RefreshResult<u64> {
        if let Some(err) = self.scripted_failure(sql) {
            return Err(err);
        }

        self.log.0.lock().unwrap().executed.push(sql.to_string());

        if sql.starts_with("INSERT") {
            return Ok(self.insert_results.pop_front().unwrap_or(0));
        }

        Ok(0)
    }

    async fn fetch_count(&mut self, sql: &str) -> RefreshResult<u64> {
        if let Some(err) = self.scripted_failure(sql) {
            return Err(err);
        }

        self.log.0.lock().unwrap().queried.push(sql.to_string());

        self.counts.pop_front().ok_or_else(|| {
            RefreshError::Execution(sqlx::Error::Protocol(
                "no scripted count response left".to_string(),
            ))
        })
    }

    async fn fetch_table_definition(&mut self, sql: &str) -> RefreshResult<TableDefinition> {
        if let Some(err) = self.scripted_failure(sql) {
            return Err(err);
        }

        self.log.0.lock().unwrap().queried.push(sql.to_string());

        self.table_definitions.pop_front().ok_or_else(|| {
            RefreshError::Execution(sqlx::Error::Protocol(
                "no scripted table definition left".to_string(),
            ))
        })
    }

    async fn commit(&mut self) -> RefreshResult<()> {
        self.log.0.lock().unwrap().commits += 1;

        Ok(())
    }

    async fn rollback(&mut self) -> RefreshResult<()> {
        self.log.0.lock().unwrap().rollbacks += 1;

        Ok(())
    }

    async fn close(self) -> RefreshResult<()> {
        self.log.0.lock().unwrap().closed = true;

        Ok(())
    }
}
