pub mod ask_controller;
pub mod ingest_controller;
pub mod search_controller;

pub use ask_controller::AskController;
pub use ingest_controller::IngestController;
pub use search_controller::SearchController;
