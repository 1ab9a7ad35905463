//! Data models for the embedding index store

use serde::{Deserialize, Serialize};

/// One ingested text fragment
///
/// `chunk_id` is the stable identifier used for dedup; the record's position
/// in the metadata sequence is the join key with the embedding matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentRecord {
    pub doc_id: String,
    pub chunk_id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A search result: distance score plus the matched fragment
///
/// Lower score means a closer match, regardless of the underlying metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub score: f32,
    #[serde(flatten)]
    pub fragment: FragmentRecord,
}

/// Store counts; the two are equal under the alignment invariant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorStoreInfo {
    pub vectors: usize,
    pub fragments: usize,
}
