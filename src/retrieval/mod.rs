//! Retrieval fusion
//!
//! Merges the two retrieval signals into one context payload: graph facts
//! gathered per extracted entity, then fragment matches from the embedding
//! index. No ranking across the two signals beyond concatenation; the raw
//! parts are returned alongside the rendered context so each can be surfaced
//! independently.

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::graph::{Fact, GraphStore};
use crate::vector::{SearchHit, VectorStore};

/// The merged context payload
#[derive(Debug, Clone, Serialize)]
pub struct FusedContext {
    /// Rendered context text: graph facts block first, fragment block second
    pub context: String,
    /// Entities as extracted, in extraction order
    pub entities: Vec<String>,
    /// Graph facts, concatenated per entity in extraction order
    pub facts: Vec<Fact>,
    /// Fragment matches, best first
    pub fragments: Vec<SearchHit>,
}

/// Query both stores and assemble the fused context.
///
/// Each entity is traversed with the given hop count; search runs over the
/// raw question text and is skipped entirely when `top_k` is zero or
/// negative.
pub async fn fuse(
    graph: &GraphStore,
    vectors: &VectorStore,
    entities: Vec<String>,
    question: &str,
    hops: usize,
    top_k: i64,
) -> Result<FusedContext> {
    let mut facts = Vec::new();
    for entity in &entities {
        facts.extend(graph.neighbors(entity, hops));
    }

    let fragments = if top_k > 0 {
        vectors.search(question, top_k as usize).await?
    } else {
        Vec::new()
    };

    debug!(
        entities = entities.len(),
        facts = facts.len(),
        fragments = fragments.len(),
        "fused retrieval"
    );

    let context = render_context(&facts, &fragments);
    Ok(FusedContext {
        context,
        entities,
        facts,
        fragments,
    })
}

/// Render the context string. Empty blocks contribute nothing.
fn render_context(facts: &[Fact], fragments: &[SearchHit]) -> String {
    let mut context = String::new();
    if !facts.is_empty() {
        context.push_str("GRAPH FACTS:\n");
        let lines: Vec<String> = facts.iter().map(Fact::render).collect();
        context.push_str(&lines.join("\n"));
        context.push_str("\n\n");
    }
    if !fragments.is_empty() {
        context.push_str("RETRIEVED CHUNKS:\n");
        let texts: Vec<&str> = fragments.iter().map(|h| h.fragment.text.as_str()).collect();
        context.push_str(&texts.join("\n\n"));
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::FragmentRecord;

    fn hit(text: &str) -> SearchHit {
        SearchHit {
            score: 0.1,
            fragment: FragmentRecord {
                doc_id: "d".to_string(),
                chunk_id: "c".to_string(),
                text: text.to_string(),
                source: None,
            },
        }
    }

    #[test]
    fn test_render_both_blocks() {
        let facts = vec![Fact::new("Alice", "works_at", "Microsoft")];
        let fragments = vec![hit("Alice works at Microsoft.")];
        let context = render_context(&facts, &fragments);
        assert_eq!(
            context,
            "GRAPH FACTS:\nAlice -works_at-> Microsoft\n\n\
             RETRIEVED CHUNKS:\nAlice works at Microsoft."
        );
    }

    #[test]
    fn test_render_empty_blocks_contribute_nothing() {
        assert_eq!(render_context(&[], &[]), "");

        let facts = vec![Fact::new("A", "r", "B")];
        let context = render_context(&facts, &[]);
        assert!(!context.contains("RETRIEVED CHUNKS"));

        let fragments = vec![hit("text")];
        let context = render_context(&[], &fragments);
        assert!(!context.contains("GRAPH FACTS"));
        assert!(context.starts_with("RETRIEVED CHUNKS:\n"));
    }
}
