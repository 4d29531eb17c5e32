use clap::Parser;
use config::SerializableSecretString;
use config::shared::{IntoConnectOptions, MySqlConnectionConfig, RefreshConfig, TlsConfig};
use refresh::engine::RefreshRun;
use refresh::session::{MySqlSession, SessionAccess};
use sqlx::mysql::MySqlConnectOptions;
use tracing::info;

/// Copies every row of a table into a schema-identical BLACKHOLE shadow table
/// so the rows replay on the replication stream as refresh events.
#[derive(Debug, Parser)]
#[command(name = "refresher")]
pub struct RefresherArgs {
    /// Name of the table to be refreshed.
    #[arg(long)]
    table_name: String,

    /// Primary key column used for deterministic page ordering.
    #[arg(long)]
    primary_key: String,

    /// Optional boolean SQL expression restricting which rows are copied.
    #[arg(long = "where")]
    where_clause: Option<String>,

    /// Number of rows to process between commits.
    #[arg(long, default_value_t = RefreshConfig::DEFAULT_BATCH_SIZE)]
    batch_size: u64,

    /// Build and log every statement without sending writes to the database.
    #[arg(long)]
    dry_run: bool,

    /// Optional cap on the average number of copied rows per second.
    #[arg(long)]
    avg_rows_per_second_cap: Option<u64>,

    /// Hostname of the MySQL server.
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Port of the MySQL server.
    #[arg(long, default_value_t = 3306)]
    port: u16,

    /// Database holding the table.
    #[arg(long)]
    database: String,

    /// Username for the MySQL server.
    #[arg(long, default_value = "root")]
    username: String,

    /// Password for the MySQL server.
    #[arg(long, env = "MYSQL_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Require a TLS connection with certificate verification.
    #[arg(long)]
    tls: bool,
}

/// Builds the session pair and runs the refresh to completion.
pub async fn start_refresher(args: RefresherArgs) -> anyhow::Result<()> {
    let connection_config = MySqlConnectionConfig {
        host: args.host,
        port: args.port,
        name: args.database,
        username: args.username,
        password: args.password.map(SerializableSecretString::from),
        tls: TlsConfig { enabled: args.tls },
    };

    let refresh_config = RefreshConfig {
        table_name: args.table_name,
        primary_key: args.primary_key,
        where_clause: args.where_clause,
        batch_size: args.batch_size,
        dry_run: args.dry_run,
        avg_rows_per_second_cap: args.avg_rows_per_second_cap,
    };

    let options: MySqlConnectOptions = connection_config.with_db();
    let read = MySqlSession::connect(options.clone(), SessionAccess::ReadOnly).await?;
    let write = MySqlSession::connect(options, SessionAccess::ReadWrite).await?;

    let report = RefreshRun::new(refresh_config, read, write)?.run().await?;

    info!(
        rows = report.total_inserted,
        pages = report.pages,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "refresh finished"
    );

    Ok(())
}
