//! Text chunking
//!
//! Splits raw document text into fragments of roughly `TARGET_CHUNK_CHARS`
//! characters, extending each cut to the next sentence boundary when one lies
//! close enough to the chunk start.

/// Target fragment size in bytes
pub const TARGET_CHUNK_CHARS: usize = 700;

/// A cut may be pushed out to a sentence boundary as long as the resulting
/// fragment stays under this size.
const BOUNDARY_WINDOW: usize = 1200;

/// Split `text` into fragments.
///
/// Short inputs come back as a single fragment. Each fragment is trimmed;
/// whitespace-only fragments are dropped.
pub fn chunk_text(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.len() <= TARGET_CHUNK_CHARS {
        if text.is_empty() {
            return Vec::new();
        }
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let mut end = snap_to_char_boundary(text, (start + TARGET_CHUNK_CHARS).min(text.len()));
        if let Some(pos) = text[end..].find(". ") {
            let dot = end + pos;
            if dot - start < BOUNDARY_WINDOW {
                end = dot + 1;
            }
        }
        let chunk = text[start..end].trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        start = end;
    }
    chunks
}

/// Move `idx` forward to the nearest char boundary.
fn snap_to_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}
