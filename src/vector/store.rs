//! Embedding index store implementation
//!
//! In-memory flat index (one f32 row per fragment) plus an aligned metadata
//! sequence, both persisted to disk after every mutation: `meta.json` holds
//! the ordered fragment records, `embeddings.bin` the MessagePack-encoded
//! matrix. The row at position `i` always corresponds to the record at
//! position `i`; every code path that appends to one appends to the other in
//! lock-step.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::embedding::Embedder;
use crate::error::Result;
use crate::persist::{ensure_parent_dir, write_atomic};

use super::models::{FragmentRecord, SearchHit, VectorStoreInfo};

const META_FILE: &str = "meta.json";
const EMBEDDINGS_FILE: &str = "embeddings.bin";

/// Fragment embedding store
///
/// Single-writer component: mutating calls block until both the in-memory
/// state and the persisted files are updated. Callers serialize concurrent
/// writers externally.
pub struct VectorStore {
    meta_path: PathBuf,
    emb_path: PathBuf,
    embedder: Arc<dyn Embedder>,
    embeddings: Vec<Vec<f32>>,
    meta: Vec<FragmentRecord>,
}

impl VectorStore {
    /// Open (or create) a store under `data_dir`.
    ///
    /// A corrupted or unreadable file on either side degrades to an empty
    /// store rather than failing; if the two files disagree on length the
    /// store also resets to empty, protecting the alignment invariant.
    pub fn open(data_dir: impl AsRef<Path>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)?;
        let meta_path = data_dir.join(META_FILE);
        let emb_path = data_dir.join(EMBEDDINGS_FILE);

        let meta = load_meta(&meta_path);
        let embeddings = load_embeddings(&emb_path);

        let mut store = Self {
            meta_path,
            emb_path,
            embedder,
            embeddings,
            meta,
        };

        if store.embeddings.len() != store.meta.len() {
            warn!(
                vectors = store.embeddings.len(),
                fragments = store.meta.len(),
                "vector/metadata length mismatch on load, resetting store"
            );
            store.embeddings.clear();
            store.meta.clear();
        }

        // First open writes the (possibly empty) files so a fresh data dir is
        // immediately readable.
        if !store.meta_path.exists() || !store.emb_path.exists() {
            store.save()?;
        }

        info!(fragments = store.meta.len(), "vector store opened");
        Ok(store)
    }

    /// Append new fragments.
    ///
    /// Records whose `chunk_id` already exists in the store are skipped
    /// (dedup is a full scan of the existing metadata). Surviving records are
    /// embedded in one batch, appended to both sequences in the same order,
    /// and persisted before this call returns. Returns the number of records
    /// actually appended.
    pub async fn add(&mut self, records: Vec<FragmentRecord>) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let new_records: Vec<FragmentRecord> = records
            .into_iter()
            .filter(|r| !self.has_chunk(&r.chunk_id))
            .collect();
        if new_records.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = new_records.iter().map(|r| r.text.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        debug_assert_eq!(vectors.len(), new_records.len());

        let added = new_records.len();
        self.embeddings.extend(vectors);
        self.meta.extend(new_records);
        self.save()?;

        debug!(added, total = self.meta.len(), "fragments appended");
        Ok(added)
    }

    /// Nearest-neighbor search.
    ///
    /// Returns up to `top_k` hits ordered by ascending score, where score is
    /// one minus cosine similarity (lower = closer). An empty store returns
    /// an empty list.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        if self.embeddings.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let query_batch = [query.to_string()];
        let query_vec = self.embedder.embed(&query_batch).await?;
        let query_vec = &query_vec[0];

        let mut scored: Vec<(f32, usize)> = self
            .embeddings
            .iter()
            .enumerate()
            .map(|(i, row)| (1.0 - cosine_similarity(query_vec, row), i))
            .collect();
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        // Bound-check against the metadata sequence in case the two ever
        // drift; a row without a record is silently skipped.
        let hits = scored
            .into_iter()
            .filter_map(|(score, i)| {
                self.meta.get(i).map(|fragment| SearchHit {
                    score,
                    fragment: fragment.clone(),
                })
            })
            .collect();
        Ok(hits)
    }

    /// Current vector and fragment counts.
    pub fn info(&self) -> VectorStoreInfo {
        VectorStoreInfo {
            vectors: self.embeddings.len(),
            fragments: self.meta.len(),
        }
    }

    fn has_chunk(&self, chunk_id: &str) -> bool {
        self.meta.iter().any(|m| m.chunk_id == chunk_id)
    }

    fn save(&self) -> Result<()> {
        ensure_parent_dir(&self.meta_path)?;
        let meta_bytes = serde_json::to_vec_pretty(&self.meta)?;
        write_atomic(&self.meta_path, &meta_bytes)?;
        let emb_bytes = rmp_serde::to_vec(&self.embeddings)
            .map_err(|e| crate::error::Error::Persistence(e.to_string()))?;
        write_atomic(&self.emb_path, &emb_bytes)?;
        Ok(())
    }
}

fn load_meta(path: &Path) -> Vec<FragmentRecord> {
    match fs::read(path) {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(meta) => meta,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable metadata file, starting empty");
                Vec::new()
            }
        },
        Err(_) => Vec::new(),
    }
}

fn load_embeddings(path: &Path) -> Vec<Vec<f32>> {
    match fs::read(path) {
        Ok(bytes) => match rmp_serde::from_slice(&bytes) {
            Ok(embeddings) => embeddings,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable embeddings file, starting empty");
                Vec::new()
            }
        },
        Err(_) => Vec::new(),
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
