use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::core::{RefresherArgs, start_refresher};

mod core;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = RefresherArgs::parse();

    start_refresher(args).await
}
