//! Extraction and generation prompts
//!
//! The model is asked for a bare JSON array which is sliced out of the
//! completion text between the first `[` and the last `]`. Anything that
//! fails along the way (transport, missing key, malformed JSON) turns into an
//! empty extraction result with a warning.

use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::graph::Fact;

use super::client::LlmClient;

/// Extract candidate `(sub, rel, obj)` facts from a text fragment.
///
/// Never fails: any error degrades to an empty list.
pub async fn extract_triples(client: &LlmClient, text: &str) -> Vec<Fact> {
    let prompt = format!(
        "Extract triples from the text. Return ONLY a JSON array like:\n\
         [{{\"sub\":\"A\",\"rel\":\"works_at\",\"obj\":\"B\"}}]\n\n\
         Text:\n{text}\n\nJSON:"
    );

    let raw = match client.chat(&prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "triple extraction failed");
            return Vec::new();
        }
    };
    parse_triples(&raw)
}

/// Extract entity strings from a question.
///
/// Never fails: any error degrades to an empty list.
pub async fn extract_entities(client: &LlmClient, question: &str) -> Vec<String> {
    let prompt = format!(
        "Extract all entities (names, places, companies, dates) from the \
         question below.\nReturn ONLY a JSON array of strings.\n\n\
         Question: \"{question}\"\n\nJSON:"
    );

    let raw = match client.chat(&prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "entity extraction failed");
            return Vec::new();
        }
    };
    parse_entities(&raw)
}

/// Generate an answer from the fused context.
///
/// Unlike extraction this propagates errors; the caller renders them into a
/// descriptive answer string.
pub async fn generate_answer(client: &LlmClient, context: &str, question: &str) -> Result<String> {
    let prompt = format!(
        "Use only the knowledge below to answer the question. Cite sources \
         where possible.\n\n{context}\nQuestion: {question}\nAnswer concisely:"
    );
    client.chat(&prompt).await
}

fn parse_triples(raw: &str) -> Vec<Fact> {
    let Some(values) = slice_json_array(raw) else {
        warn!("no JSON array in triple extraction output");
        return Vec::new();
    };
    values
        .into_iter()
        .filter_map(|v| {
            let sub = coerce_string(v.get("sub")?)?;
            let rel = coerce_string(v.get("rel")?)?;
            let obj = coerce_string(v.get("obj")?)?;
            Some(Fact::new(sub, rel, obj))
        })
        .collect()
}

fn parse_entities(raw: &str) -> Vec<String> {
    let Some(values) = slice_json_array(raw) else {
        warn!("no JSON array in entity extraction output");
        return Vec::new();
    };
    values
        .iter()
        .filter_map(coerce_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse the substring between the first `[` and the last `]` as JSON.
fn slice_json_array(raw: &str) -> Option<Vec<Value>> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_triples_from_noisy_output() {
        let raw = "Sure! Here are the triples:\n\
                   [{\"sub\":\"Alice\",\"rel\":\"works_at\",\"obj\":\"Microsoft\"}]\n\
                   Let me know if you need more.";
        let facts = parse_triples(raw);
        assert_eq!(facts, vec![Fact::new("Alice", "works_at", "Microsoft")]);
    }

    #[test]
    fn test_parse_triples_skips_incomplete_objects() {
        let raw = r#"[{"sub":"A","rel":"r","obj":"B"},{"sub":"C","rel":"r"}]"#;
        let facts = parse_triples(raw);
        assert_eq!(facts, vec![Fact::new("A", "r", "B")]);
    }

    #[test]
    fn test_parse_triples_malformed_json_is_empty() {
        assert!(parse_triples("no array here").is_empty());
        assert!(parse_triples("[{broken").is_empty());
    }

    #[test]
    fn test_parse_entities() {
        let raw = r#"["Alice", "Microsoft", "  Redmond  "]"#;
        let entities = parse_entities(raw);
        assert_eq!(entities, vec!["Alice", "Microsoft", "Redmond"]);
    }

    #[test]
    fn test_parse_entities_coerces_non_strings() {
        let raw = r#"["Alice", 2024]"#;
        let entities = parse_entities(raw);
        assert_eq!(entities, vec!["Alice", "2024"]);
    }

    #[test]
    fn test_parse_entities_empty_on_garbage() {
        assert!(parse_entities("the model rambled with no array").is_empty());
    }
}
