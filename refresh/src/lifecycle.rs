//! Shadow table lifecycle: creation at run start, teardown at run end.

use tracing::info;

use crate::error::RefreshResult;
use crate::gate::{ExecutionGate, Route};
use crate::schema;
use crate::session::RefreshSession;
use crate::statements;

/// Creates the shadow table from the source table's captured definition.
///
/// Fetches the definition over the read path, rewrites it, and issues the
/// resulting CREATE TABLE over the write path. Not idempotent on its own; it
/// expects teardown to have removed any earlier shadow table.
pub async fn create<R, W>(gate: &mut ExecutionGate<R, W>, table: &str) -> RefreshResult<()>
where
    R: RefreshSession,
    W: RefreshSession,
{
    let definition = gate
        .fetch_table_definition(&statements::show_create_table(table))
        .await?;
    let shadow_ddl = schema::transform_to_shadow(&definition)?;

    info!(table, shadow_ddl = %shadow_ddl, "creating shadow table");

    gate.execute(&shadow_ddl, Route::Write).await?;

    Ok(())
}

/// Drops the shadow table if it exists.
///
/// Idempotent, and always attempted at run end: a leftover shadow table
/// would double-count rows or waste table-count quota on the next run even
/// though the discard engine stores no row data.
pub async fn teardown<R, W>(gate: &mut ExecutionGate<R, W>, shadow_table: &str) -> RefreshResult<()>
where
    R: RefreshSession,
    W: RefreshSession,
{
    gate.execute(&statements::drop_shadow_table(shadow_table), Route::Write)
        .await?;

    info!(shadow_table, "dropped shadow table");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TableDefinition;
    use crate::test_utils::ScriptedSession;

    fn orders_definition() -> TableDefinition {
        TableDefinition {
            name: "orders".to_string(),
            ddl: "CREATE TABLE orders (id int) ENGINE=InnoDB".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_fetches_the_definition_and_issues_the_shadow_ddl() {
        let read = ScriptedSession::new().with_table_definition(orders_definition());
        let read_log = read.log();
        let write = ScriptedSession::new();
        let write_log = write.log();

        let mut gate = ExecutionGate::new(read, write, false);
        create(&mut gate, "orders").await.unwrap();

        assert_eq!(read_log.queried(), vec!["SHOW CREATE TABLE orders"]);
        assert_eq!(
            write_log.executed(),
            vec!["CREATE TABLE orders_data_pipeline_refresh (id int) ENGINE=BLACKHOLE"]
        );
    }

    #[tokio::test]
    async fn test_create_under_dry_run_builds_the_ddl_but_sends_nothing() {
        let read = ScriptedSession::new().with_table_definition(orders_definition());
        let read_log = read.log();
        let write = ScriptedSession::new();
        let write_log = write.log();

        let mut gate = ExecutionGate::new(read, write, true);
        create(&mut gate, "orders").await.unwrap();

        // The schema fetch is a read and must still run.
        assert_eq!(read_log.queried(), vec!["SHOW CREATE TABLE orders"]);
        assert!(write_log.executed().is_empty());
    }

    #[tokio::test]
    async fn test_teardown_twice_never_fails() {
        let read = ScriptedSession::new();
        let write = ScriptedSession::new();
        let write_log = write.log();

        let mut gate = ExecutionGate::new(read, write, false);
        teardown(&mut gate, "orders_data_pipeline_refresh")
            .await
            .unwrap();
        teardown(&mut gate, "orders_data_pipeline_refresh")
            .await
            .unwrap();

        assert_eq!(
            write_log.executed(),
            vec![
                "DROP TABLE IF EXISTS orders_data_pipeline_refresh",
                "DROP TABLE IF EXISTS orders_data_pipeline_refresh",
            ]
        );
    }
}
