//! Fact graph store implementation
//!
//! Nodes are bare entity names created implicitly by edge insertion; edges
//! are keyed by the ordered `(subject, object)` pair, so inserting a second
//! fact between the same pair overwrites the first's relation and provenance
//! instead of adding a parallel edge. Insertion order is preserved
//! (`indexmap`), which keeps entity resolution and traversal output
//! deterministic across runs.
//!
//! The whole graph is rewritten to `graph.json` atomically after every
//! mutation. That is O(graph size) per triple, acceptable at this scale.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::persist::{ensure_parent_dir, write_atomic};

use super::models::{Fact, GraphInfo};

/// Relation label and provenance carried by an edge
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EdgeData {
    rel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

/// On-disk node-link representation
#[derive(Debug, Serialize, Deserialize)]
struct GraphFile {
    nodes: Vec<String>,
    edges: Vec<EdgeRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EdgeRecord {
    sub: String,
    obj: String,
    rel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

/// Directed labeled fact graph
///
/// Single-writer component, like the vector store: `add_triple` blocks until
/// the graph file is rewritten.
pub struct GraphStore {
    path: PathBuf,
    nodes: IndexSet<String>,
    edges: IndexMap<(String, String), EdgeData>,
}

impl GraphStore {
    /// Open (or create) the graph persisted at `path`.
    ///
    /// A missing file starts an empty graph and writes it; a corrupted file
    /// degrades to an empty graph with a warning.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        ensure_parent_dir(&path)?;

        let mut store = Self {
            path,
            nodes: IndexSet::new(),
            edges: IndexMap::new(),
        };

        match fs::read(&store.path) {
            Ok(bytes) => match serde_json::from_slice::<GraphFile>(&bytes) {
                Ok(file) => {
                    for node in file.nodes {
                        store.nodes.insert(node);
                    }
                    for edge in file.edges {
                        store.nodes.insert(edge.sub.clone());
                        store.nodes.insert(edge.obj.clone());
                        store.edges.insert(
                            (edge.sub, edge.obj),
                            EdgeData {
                                rel: edge.rel,
                                source: edge.source,
                            },
                        );
                    }
                }
                Err(e) => {
                    warn!(path = %store.path.display(), error = %e, "unreadable graph file, starting empty");
                }
            },
            Err(_) => {
                store.save()?;
            }
        }

        info!(nodes = store.nodes.len(), edges = store.edges.len(), "graph store opened");
        Ok(store)
    }

    /// Insert (or overwrite) a directed fact.
    ///
    /// All three fields are trimmed; both entity nodes are created if absent.
    /// The full graph is persisted before this call returns.
    pub fn add_triple(
        &mut self,
        sub: &str,
        rel: &str,
        obj: &str,
        source: Option<&str>,
    ) -> Result<()> {
        let sub = sub.trim().to_string();
        let rel = rel.trim().to_string();
        let obj = obj.trim().to_string();

        self.nodes.insert(sub.clone());
        self.nodes.insert(obj.clone());
        self.edges.insert(
            (sub, obj),
            EdgeData {
                rel,
                source: source.map(str::to_string),
            },
        );
        self.save()
    }

    /// Collect all facts within `hops` rounds of breadth-first expansion
    /// around the resolved entity, following edges in both directions.
    ///
    /// Returns an empty list when no node resolves. Facts are deduplicated
    /// and returned in first-seen order.
    pub fn neighbors(&self, entity: &str, hops: usize) -> Vec<Fact> {
        let Some(start) = self.resolve(entity) else {
            return Vec::new();
        };
        debug!(entity, resolved = %start, hops, "graph traversal");

        let mut results: IndexSet<Fact> = IndexSet::new();
        let mut frontier: IndexSet<String> = IndexSet::new();
        frontier.insert(start);

        for _ in 0..hops {
            let mut next: IndexSet<String> = IndexSet::new();
            for node in &frontier {
                for ((sub, obj), edge) in &self.edges {
                    if sub == node {
                        results.insert(Fact::new(sub.clone(), edge.rel.clone(), obj.clone()));
                        next.insert(obj.clone());
                    }
                    if obj == node {
                        results.insert(Fact::new(sub.clone(), edge.rel.clone(), obj.clone()));
                        next.insert(sub.clone());
                    }
                }
            }
            frontier = next;
        }

        results.into_iter().collect()
    }

    /// Current node and edge counts.
    pub fn info(&self) -> GraphInfo {
        GraphInfo {
            nodes: self.nodes.len(),
            edges: self.edges.len(),
        }
    }

    /// Resolve a query string to a canonical node name.
    ///
    /// Exact case-insensitive match wins. Failing that, substring candidates
    /// (in either direction) are ranked by smallest length difference, then
    /// lexicographically, so resolution is deterministic.
    fn resolve(&self, entity: &str) -> Option<String> {
        let query = entity.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        for node in &self.nodes {
            if node.to_lowercase() == query {
                return Some(node.clone());
            }
        }

        self.nodes
            .iter()
            .filter(|node| {
                let lower = node.to_lowercase();
                lower.contains(&query) || query.contains(&lower)
            })
            .min_by(|a, b| {
                let da = a.len().abs_diff(query.len());
                let db = b.len().abs_diff(query.len());
                da.cmp(&db).then_with(|| a.cmp(b))
            })
            .cloned()
    }

    fn save(&self) -> Result<()> {
        let file = GraphFile {
            nodes: self.nodes.iter().cloned().collect(),
            edges: self
                .edges
                .iter()
                .map(|((sub, obj), edge)| EdgeRecord {
                    sub: sub.clone(),
                    obj: obj.clone(),
                    rel: edge.rel.clone(),
                    source: edge.source.clone(),
                })
                .collect(),
        };
        let bytes = serde_json::to_vec_pretty(&file)?;
        write_atomic(&self.path, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_store(dir: &tempfile::TempDir) -> GraphStore {
        GraphStore::open(dir.path().join("graph.json")).unwrap()
    }

    #[test]
    fn test_nodes_created_implicitly() {
        let dir = tempfile::tempdir().unwrap();
        let mut graph = open_store(&dir);
        graph.add_triple("Alice", "works_at", "Microsoft", None).unwrap();
        let info = graph.info();
        assert_eq!(info.nodes, 2);
        assert_eq!(info.edges, 1);
    }

    #[test]
    fn test_single_edge_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let mut graph = open_store(&dir);
        graph.add_triple("A", "rel1", "B", None).unwrap();
        graph.add_triple("A", "rel2", "B", Some("doc2")).unwrap();

        assert_eq!(graph.info().edges, 1);
        let facts = graph.neighbors("A", 1);
        assert_eq!(facts, vec![Fact::new("A", "rel2", "B")]);
    }

    #[test]
    fn test_opposite_direction_is_a_separate_edge() {
        let dir = tempfile::tempdir().unwrap();
        let mut graph = open_store(&dir);
        graph.add_triple("A", "knows", "B", None).unwrap();
        graph.add_triple("B", "knows", "A", None).unwrap();
        assert_eq!(graph.info().edges, 2);
    }

    #[test]
    fn test_fields_are_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let mut graph = open_store(&dir);
        graph.add_triple("  Alice ", " works_at ", " Microsoft  ", None).unwrap();
        let facts = graph.neighbors("Alice", 1);
        assert_eq!(facts, vec![Fact::new("Alice", "works_at", "Microsoft")]);
    }

    #[test]
    fn test_case_insensitive_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let mut graph = open_store(&dir);
        graph.add_triple("Microsoft", "headquartered_in", "Redmond", None).unwrap();

        let upper = graph.neighbors("Microsoft", 1);
        let lower = graph.neighbors("microsoft", 1);
        assert_eq!(upper, lower);
        assert_eq!(upper.len(), 1);
    }

    #[test]
    fn test_substring_resolution_prefers_closest_length() {
        let dir = tempfile::tempdir().unwrap();
        let mut graph = open_store(&dir);
        graph.add_triple("Microsoft Corporation", "located_in", "Redmond", None).unwrap();
        graph.add_triple("Microsoft", "founded_by", "Bill Gates", None).unwrap();

        // "microsof" is a substring of both nodes; the shorter node is closer
        let facts = graph.neighbors("microsof", 1);
        assert_eq!(facts, vec![Fact::new("Microsoft", "founded_by", "Bill Gates")]);
    }

    #[test]
    fn test_unresolved_entity_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut graph = open_store(&dir);
        graph.add_triple("A", "r", "B", None).unwrap();
        assert!(graph.neighbors("zzz", 2).is_empty());
    }

    #[test]
    fn test_multi_hop_growth() {
        let dir = tempfile::tempdir().unwrap();
        let mut graph = open_store(&dir);
        graph.add_triple("A", "r1", "B", None).unwrap();
        graph.add_triple("B", "r2", "C", None).unwrap();

        let one_hop = graph.neighbors("A", 1);
        assert_eq!(one_hop, vec![Fact::new("A", "r1", "B")]);

        let two_hops = graph.neighbors("A", 2);
        assert!(two_hops.contains(&Fact::new("A", "r1", "B")));
        assert!(two_hops.contains(&Fact::new("B", "r2", "C")));
        assert_eq!(two_hops.len(), 2);
    }

    #[test]
    fn test_traversal_follows_incoming_edges() {
        let dir = tempfile::tempdir().unwrap();
        let mut graph = open_store(&dir);
        graph.add_triple("Alice", "works_at", "Microsoft", None).unwrap();

        let facts = graph.neighbors("Microsoft", 1);
        assert_eq!(facts, vec![Fact::new("Alice", "works_at", "Microsoft")]);
    }

    #[test]
    fn test_cycle_terminates_and_dedupes() {
        let dir = tempfile::tempdir().unwrap();
        let mut graph = open_store(&dir);
        graph.add_triple("A", "r", "B", None).unwrap();
        graph.add_triple("B", "r", "A", None).unwrap();

        let facts = graph.neighbors("A", 5);
        assert_eq!(facts.len(), 2);
    }

    #[test]
    fn test_zero_hops_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut graph = open_store(&dir);
        graph.add_triple("A", "r", "B", None).unwrap();
        assert!(graph.neighbors("A", 0).is_empty());
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        {
            let mut graph = GraphStore::open(&path).unwrap();
            graph.add_triple("A", "r1", "B", Some("doc1")).unwrap();
            graph.add_triple("B", "r2", "C", None).unwrap();
        }
        let reopened = GraphStore::open(&path).unwrap();
        assert_eq!(reopened.info(), GraphInfo { nodes: 3, edges: 2 });
        assert_eq!(reopened.neighbors("A", 1), vec![Fact::new("A", "r1", "B")]);
    }

    #[test]
    fn test_corrupted_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        std::fs::write(&path, b"{broken").unwrap();

        let graph = GraphStore::open(&path).unwrap();
        assert_eq!(graph.info(), GraphInfo { nodes: 0, edges: 0 });
    }
}
