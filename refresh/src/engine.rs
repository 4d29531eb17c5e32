//! The paginated copy engine and run orchestration.
//!
//! A run counts the source table once, then copies it page by page into the
//! shadow table with INSERT-from-SELECT statements over a deterministic
//! primary-key ordering, committing the write session after every page. One
//! page is built, inserted, measured, and closed out before the next begins;
//! there are no overlapping pages and no connections beyond the fixed
//! read/write pair.

use std::time::{Duration, Instant};

use config::shared::RefreshConfig;
use tracing::{debug, info, warn};

use crate::error::RefreshResult;
use crate::gate::{ExecutionGate, Route};
use crate::lifecycle;
use crate::schema;
use crate::session::RefreshSession;
use crate::statements;

/// Phases of a refresh run, advanced strictly in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CopyPhase {
    NotStarted,
    Counting,
    Copying,
    Done,
}

/// Per-run copy bookkeeping, created at loop start and discarded at loop end.
///
/// A restarted run always re-counts and re-copies from the beginning against
/// a freshly recreated shadow table; no partial progress is persisted.
#[derive(Debug, Clone, Copy)]
struct CopyProgress {
    /// Rows scanned so far; advances by the batch size each page.
    offset: u64,
    /// Rows confirmed inserted into the shadow table.
    total_inserted: u64,
    /// Point-in-time snapshot of the source row count, taken once at run
    /// start and never refreshed. It can go stale if the source mutates
    /// mid-run; the zero-row page guard keeps the loop safe regardless.
    source_row_count: u64,
}

/// Summary of a completed refresh run.
#[derive(Debug, Clone, Copy)]
pub struct RefreshReport {
    /// The source row count snapshot the run worked against.
    pub source_row_count: u64,
    /// Rows confirmed inserted into the shadow table.
    pub total_inserted: u64,
    /// Number of pages processed.
    pub pages: u64,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// A single full refresh run against one table.
///
/// Owns the session pair for the run's whole lifetime and releases it on
/// every exit path. All per-run mutable state lives on this value, so
/// multiple runs can be exercised safely in one process.
pub struct RefreshRun<R, W> {
    config: RefreshConfig,
    shadow_table: String,
    gate: ExecutionGate<R, W>,
    phase: CopyPhase,
}

impl<R, W> RefreshRun<R, W>
where
    R: RefreshSession,
    W: RefreshSession,
{
    /// Builds a run from its options and session pair.
    ///
    /// Fails with a configuration error before any database access when the
    /// options are invalid.
    pub fn new(config: RefreshConfig, read: R, write: W) -> RefreshResult<Self> {
        config.validate()?;

        let shadow_table = schema::shadow_table_name(&config.table_name);
        let gate = ExecutionGate::new(read, write, config.dry_run);

        Ok(Self {
            config,
            shadow_table,
            gate,
            phase: CopyPhase::NotStarted,
        })
    }

    /// Runs the refresh: shadow table creation, the page-by-page copy, and
    /// teardown.
    ///
    /// Teardown also runs on the error path, best-effort: a run aborting
    /// mid-copy leaves a partially populated shadow table, which is always
    /// safe to drop since the discard engine holds no durable rows. Both
    /// sessions are released before returning, whatever the outcome.
    pub async fn run(mut self) -> RefreshResult<RefreshReport> {
        let started = Instant::now();

        info!(
            table = %self.config.table_name,
            shadow_table = %self.shadow_table,
            dry_run = self.config.dry_run,
            "starting full refresh"
        );

        let outcome = self.refresh_table().await;
        let teardown = lifecycle::teardown(&mut self.gate, &self.shadow_table).await;
        let closed = self.gate.close().await;

        let (progress, pages) = match (outcome, teardown) {
            (Ok(result), Ok(())) => result,
            (Ok(_), Err(err)) => return Err(err),
            (Err(err), Ok(())) => return Err(err),
            (Err(err), Err(teardown_err)) => {
                warn!(
                    error = %teardown_err,
                    "failed to tear down the shadow table after a run error"
                );

                return Err(err);
            }
        };
        closed?;

        let report = RefreshReport {
            source_row_count: progress.source_row_count,
            total_inserted: progress.total_inserted,
            pages,
            elapsed: started.elapsed(),
        };

        info!(
            rows = report.total_inserted,
            pages = report.pages,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "completed full refresh"
        );

        Ok(report)
    }

    /// Creates the shadow table and drives the copy loop.
    async fn refresh_table(&mut self) -> RefreshResult<(CopyProgress, u64)> {
        // A killed run leaves its shadow table behind; dropping it up front is
        // what lets the plain CREATE TABLE below succeed on restart.
        lifecycle::teardown(&mut self.gate, &self.shadow_table).await?;
        lifecycle::create(&mut self.gate, &self.config.table_name).await?;

        self.copy_rows().await
    }

    /// Counts the source once, then copies page by page until the count is
    /// reached or a page comes back empty.
    async fn copy_rows(&mut self) -> RefreshResult<(CopyProgress, u64)> {
        self.transition(CopyPhase::Counting);

        let source_row_count = self
            .gate
            .fetch_count(&statements::count_rows(&self.config.table_name))
            .await?;

        info!(rows = source_row_count, "counted source table rows");

        let mut progress = CopyProgress {
            offset: 0,
            total_inserted: 0,
            source_row_count,
        };
        let mut pages: u64 = 0;

        self.transition(CopyPhase::Copying);

        while progress.total_inserted < progress.source_row_count {
            let page_started = Instant::now();

            let page_select = statements::page_select(
                &self.config.table_name,
                self.config.where_clause.as_deref(),
                &self.config.primary_key,
                progress.offset,
                self.config.batch_size,
            );
            let insert = statements::insert_page(&self.shadow_table, &page_select);

            let inserted = self.gate.execute(&insert, Route::Write).await?;
            progress.total_inserted += inserted;
            // The offset advances by the full batch size even for a short
            // page, keeping the windows non-overlapping.
            progress.offset += self.config.batch_size;
            pages += 1;

            self.gate.complete_page().await?;

            debug!(
                offset = progress.offset,
                inserted,
                total_inserted = progress.total_inserted,
                "copied page"
            );

            if let Some(cap) = self.config.avg_rows_per_second_cap {
                let delay = throttle_delay(cap, inserted, page_started.elapsed());
                if !delay.is_zero() {
                    debug!(
                        delay_ms = delay.as_millis() as u64,
                        "throttling to the rows-per-second cap"
                    );
                    tokio::time::sleep(delay).await;
                }
            }

            if inserted == 0 {
                // The unfiltered count can overshoot what the filtered page
                // queries will ever return; an empty page is the only safe
                // stop signal in that case.
                info!(offset = progress.offset, "page inserted no rows, stopping copy");
                break;
            }
        }

        self.transition(CopyPhase::Done);

        Ok((progress, pages))
    }

    fn transition(&mut self, phase: CopyPhase) {
        debug!(from = ?self.phase, to = ?phase, "advancing copy phase");
        self.phase = phase;
    }
}

/// Returns how long a page must pause so the average throughput stays at or
/// below `cap` rows per second.
fn throttle_delay(cap: u64, rows: u64, elapsed: Duration) -> Duration {
    if cap == 0 {
        return Duration::ZERO;
    }

    let expected = Duration::from_secs_f64(rows as f64 / cap as f64);
    expected.saturating_sub(elapsed)
}
