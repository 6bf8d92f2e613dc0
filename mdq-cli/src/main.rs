mod cli;
mod commands;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use mdq_rag::{QdrantVectorStore, VectorStore};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, RunArgs};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.settings.verbose);

    let command = cli.command.unwrap_or_else(|| Command::Run(RunArgs::default()));
    let default_run = RunArgs::default();
    let run_args = match &command {
        Command::Run(args) => args,
        _ => &default_run,
    };
    let config = cli.settings.to_config(run_args)?;

    let store: Arc<dyn VectorStore> = Arc::new(
        QdrantVectorStore::new(&config.qdrant_url, config.api_key.as_deref())
            .with_context(|| format!("failed to connect to qdrant at {}", config.qdrant_url))?,
    );

    match command {
        Command::Run(args) => commands::run(&config, store, !args.skip_verify).await,
        Command::Query { text, limit } => commands::query(&config, store, &text, limit).await,
        Command::Drop => commands::drop_collection(&config, store).await,
    }
}
