use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use mdq_rag::config::{
    DEFAULT_COLLECTION, DEFAULT_MODEL, DEFAULT_QDRANT_URL, DEFAULT_VECTOR_SIZE,
    DEFAULT_VERIFY_QUERY,
};
use mdq_rag::{Device, IngestConfig};

#[derive(Parser, Debug)]
#[command(name = "mdq", version, about = "Embed Markdown files into a Qdrant collection")]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Connection, model and corpus settings shared by every command.
#[derive(Args, Debug)]
pub struct Settings {
    /// Qdrant gRPC endpoint
    #[arg(long, env = "MDQ_QDRANT_URL", default_value = DEFAULT_QDRANT_URL, global = true)]
    pub qdrant_url: String,

    /// Qdrant API key
    #[arg(long, env = "MDQ_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Collection to write to and query
    #[arg(long, env = "MDQ_COLLECTION", default_value = DEFAULT_COLLECTION, global = true)]
    pub collection: String,

    /// Hugging Face model id or local model directory
    #[arg(long, env = "MDQ_MODEL", default_value = DEFAULT_MODEL, global = true)]
    pub model: String,

    /// Embedding dimensionality the collection is created with
    #[arg(long, env = "MDQ_VECTOR_SIZE", default_value_t = DEFAULT_VECTOR_SIZE, global = true)]
    pub vector_size: usize,

    /// Directory scanned recursively for .md files
    #[arg(long, env = "MDQ_ROOT", default_value = ".", global = true)]
    pub root: PathBuf,

    /// Keep vectors on disk instead of in RAM
    #[arg(
        long,
        env = "MDQ_ON_DISK",
        default_value_t = true,
        action = ArgAction::Set,
        global = true
    )]
    pub on_disk: bool,

    /// Encoder device: cpu, cuda, cuda:N or metal
    #[arg(long, env = "MDQ_DEVICE", default_value = "cpu", global = true)]
    pub device: Device,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Recreate the collection, ingest every Markdown file, then run a sample query (default)
    Run(RunArgs),
    /// Embed a query and print the nearest files in the collection
    Query {
        /// Text to search for
        text: String,
        /// Number of results
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Delete the collection
    Drop,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Skip the verification query after ingestion
    #[arg(long)]
    pub skip_verify: bool,

    /// Query issued after ingestion
    #[arg(long, env = "MDQ_VERIFY_QUERY", default_value = DEFAULT_VERIFY_QUERY)]
    pub verify_query: String,

    /// Number of verification hits
    #[arg(long, default_value_t = 5)]
    pub top_k: usize,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self { skip_verify: false, verify_query: DEFAULT_VERIFY_QUERY.to_string(), top_k: 5 }
    }
}

impl Settings {
    pub fn to_config(&self, run: &RunArgs) -> mdq_rag::Result<IngestConfig> {
        IngestConfig::builder()
            .qdrant_url(&self.qdrant_url)
            .api_key(self.api_key.clone())
            .collection(&self.collection)
            .model(&self.model)
            .vector_size(self.vector_size)
            .root_dir(&self.root)
            .on_disk(self.on_disk)
            .device(self.device)
            .verify_query(&run.verify_query)
            .top_k(run.top_k)
            .build()
    }
}
