use std::path::PathBuf;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Embed a pipe-delimited catalog and upsert it into the vector store
    Ingest { catalog: PathBuf },

    /// Serve the HTTP retrieval API (`/search`, `/rag`, `/healthz`)
    Serve {
        /// Ingest this catalog before accepting requests
        #[arg(long)]
        catalog: Option<PathBuf>,

        #[arg(long, env = "PRODUCTSEARCH_BIND", default_value = "0.0.0.0:8080")]
        bind: String,
    },

    /// Nearest-neighbour search, printed as JSON
    Search {
        query: String,

        #[arg(short = 'k', long, default_value = "5")]
        top: usize,

        /// Only products strictly cheaper than this
        #[arg(long)]
        max_price: Option<f64>,
    },

    /// Grounded answer built from the search results, printed as JSON
    Ask {
        query: String,

        #[arg(short = 'k', long, default_value = "5")]
        top: usize,

        #[arg(long)]
        max_price: Option<f64>,
    },
}
