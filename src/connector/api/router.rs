use anyhow::{bail, Result};

use crate::Commands;

use super::container::Container;
use super::controller::{AskController, IngestController, SearchController};

/// Dispatches one-shot CLI commands to their controllers.
pub struct Router<'a> {
    ingest_controller: IngestController<'a>,
    search_controller: SearchController<'a>,
    ask_controller: AskController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            ingest_controller: IngestController::new(container),
            search_controller: SearchController::new(container),
            ask_controller: AskController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Ingest { catalog } => self.ingest_controller.ingest_and_format(&catalog).await,
            Commands::Search {
                query,
                top,
                max_price,
            } => self.search_controller.search(query, top, max_price).await,
            Commands::Ask {
                query,
                top,
                max_price,
            } => self.ask_controller.ask(query, top, max_price).await,
            Commands::Serve { .. } => bail!("the serve command is handled by the server entry point"),
        }
    }
}
