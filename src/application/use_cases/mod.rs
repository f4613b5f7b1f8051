mod answer_question;
pub mod grounding;
mod ingest_catalog;
mod search_products;

pub use answer_question::*;
pub use ingest_catalog::*;
pub use search_products::*;
