mod answer;
mod embedding;
mod ingest_report;
mod point;
mod product;
mod search_result;

pub use answer::*;
pub use embedding::*;
pub use ingest_report::*;
pub use point::*;
pub use product::*;
pub use search_result::*;
