use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use productsearch::connector::api::controller::IngestController;
use productsearch::connector::api::{http, Container, ContainerConfig, Router};
use productsearch::{
    Commands, DEFAULT_CHAT_MODEL, DEFAULT_COLLECTION, DEFAULT_EMBEDDING_MODEL,
    DEFAULT_OPENAI_BASE_URL, DEFAULT_QDRANT_URL,
};

#[derive(Parser)]
#[command(name = "productsearch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(long, global = true, env = "QDRANT_HOST", default_value = DEFAULT_QDRANT_URL)]
    qdrant_url: String,

    #[arg(long, global = true, env = "QDRANT_API_KEY", hide_env_values = true)]
    qdrant_api_key: Option<String>,

    #[arg(long, global = true, env = "PRODUCTSEARCH_COLLECTION", default_value = DEFAULT_COLLECTION)]
    collection: String,

    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    #[arg(long, global = true, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL)]
    openai_base_url: String,

    #[arg(long, global = true, env = "PRODUCTSEARCH_EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
    embedding_model: String,

    #[arg(long, global = true, env = "PRODUCTSEARCH_EMBEDDING_DIMENSIONS", default_value_t = 1536)]
    embedding_dimensions: usize,

    #[arg(long, global = true, env = "PRODUCTSEARCH_CHAT_MODEL", default_value = DEFAULT_CHAT_MODEL)]
    chat_model: String,

    /// Seconds before any remote call times out
    #[arg(long, global = true, env = "PRODUCTSEARCH_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    /// Attempts per remote call (1 disables retries)
    #[arg(long, global = true, env = "PRODUCTSEARCH_MAX_RETRIES", default_value_t = 1)]
    max_retries: usize,

    /// Ingestion workers (default: twice the CPU count)
    #[arg(long, global = true, env = "PRODUCTSEARCH_WORKERS")]
    workers: Option<usize>,

    #[arg(long, global = true)]
    mock_embeddings: bool,

    #[arg(long, global = true)]
    memory_storage: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ContainerConfig {
        qdrant_url: cli.qdrant_url,
        qdrant_api_key: cli.qdrant_api_key,
        collection: cli.collection,
        openai_api_key: cli.openai_api_key,
        openai_base_url: cli.openai_base_url,
        embedding_model: cli.embedding_model,
        embedding_dimensions: cli.embedding_dimensions,
        chat_model: cli.chat_model,
        timeout_secs: cli.timeout_secs,
        max_retries: cli.max_retries,
        workers: cli.workers,
        mock_embeddings: cli.mock_embeddings,
        memory_storage: cli.memory_storage,
    };
    let container = Container::new(config)?;

    match cli.command {
        Commands::Serve { catalog, bind } => {
            if let Some(catalog) = catalog {
                let report = IngestController::new(&container).ingest(&catalog).await?;
                info!("{}", report.summary());
            }
            http::serve(Arc::new(container), &bind).await
        }
        command => {
            let router = Router::new(&container);
            let output = router.route(command).await?;
            println!("{}", output);
            Ok(())
        }
    }
}
