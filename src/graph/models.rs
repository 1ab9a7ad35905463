//! Data models for the fact graph store

use serde::{Deserialize, Serialize};

/// A directed `(subject, relation, object)` assertion
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fact {
    pub sub: String,
    pub rel: String,
    pub obj: String,
}

impl Fact {
    pub fn new(sub: impl Into<String>, rel: impl Into<String>, obj: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            rel: rel.into(),
            obj: obj.into(),
        }
    }

    /// Render as `subject -relation-> object`, the form used in the fused
    /// context.
    pub fn render(&self) -> String {
        format!("{} -{}-> {}", self.sub, self.rel, self.obj)
    }
}

/// Graph counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphInfo {
    pub nodes: usize,
    pub edges: usize,
}
