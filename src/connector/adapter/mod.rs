mod in_memory_vector_repository;
mod mock_embedding;
mod openai_chat_client;
mod openai_embedding;
mod pipe_catalog_loader;
mod qdrant_vector_repository;
mod retry;

pub use in_memory_vector_repository::*;
pub use mock_embedding::*;
pub use openai_chat_client::*;
pub use openai_embedding::*;
pub use pipe_catalog_loader::*;
pub use qdrant_vector_repository::*;
pub use retry::*;
