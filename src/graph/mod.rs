//! Fact graph store
//!
//! A directed graph of entities connected by labeled relations, answering
//! bounded-hop neighborhood queries with fuzzy entity resolution. The graph
//! half of retrieval.

pub mod models;
pub mod store;

pub use models::{Fact, GraphInfo};
pub use store::GraphStore;
