use indexmap::IndexMap;
use serde_json::Value;

/// Shared key/value document of a session
pub type Document = IndexMap<String, Value>;

/// Shallow merge: every key of `update` overwrites the same key in `target`
pub fn merge_document(target: &mut Document, update: Document) {
    for (key, value) in update {
        target.insert(key, value);
    }
}

/// Decode a stage result into a document; an empty body is an empty document
pub fn parse_document(bytes: &[u8]) -> crate::error::Result<Document> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Document::new());
    }
    Ok(serde_json::from_slice(bytes)?)
}

pub mod core;
pub mod kind;

pub use self::core::{Pipe, Strategy, StrategyExt, chain, compose};
pub use kind::StrategyKind;
