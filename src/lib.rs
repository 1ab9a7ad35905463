//! Hybrid retrieval service for question answering
//!
//! Two persistent stores feed a fusion step: the [`vector`] module keeps an
//! embedding index over ingested text fragments, the [`graph`] module keeps a
//! directed labeled fact graph, and [`retrieval`] merges their outputs into a
//! single context for answer generation. The [`llm`] module holds the
//! extraction and generation collaborators; [`api`] exposes the whole thing
//! over HTTP.

pub mod api;
pub mod chunk;
pub mod config;
pub mod embedding;
pub mod error;
pub mod graph;
pub mod llm;
pub mod metrics;
pub mod persist;
pub mod retrieval;
pub mod vector;

pub use config::Config;
pub use error::{Error, Result};
