//! Embedding index store
//!
//! One embedding vector and one metadata record per ingested fragment, with
//! the two sequences kept aligned by position. Nearest-neighbor search over
//! the vectors answers the semantic half of retrieval.

pub mod models;
pub mod store;

pub use models::{FragmentRecord, SearchHit, VectorStoreInfo};
pub use store::VectorStore;
