//! Retrieval: pluggable source of reference products for prompt enrichment.
//!
//! Default: `StubRetriever` (fixed examples, no I/O after construction).
//! `KnowledgeBaseRetriever` serves products from a JSON knowledge base file.
//! Neither ranks by similarity; results come back in source order.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::models::{Record, ReferenceProduct};

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_KNOWLEDGE_BASE: &str = "data/product_knowledge_base.json";

/// Implement this to swap retrieval backends without touching the
/// processor. Implementations must return at most `top_k` products.
pub trait Retriever: Send + Sync {
    fn retrieve(&self, record: &Record, top_k: usize) -> Vec<ReferenceProduct>;
}

// ────────────────────────────────────────────────────────────────────────────
// StubRetriever
// ────────────────────────────────────────────────────────────────────────────

pub struct StubRetriever {
    products: Vec<ReferenceProduct>,
}

impl Default for StubRetriever {
    fn default() -> Self {
        Self {
            products: vec![
                ReferenceProduct::new(
                    "Wireless Headphones",
                    "Over-ear Bluetooth headphones with noise cancellation",
                    "Electronics",
                    (19.0, 15.0, 8.0),
                    0.28,
                ),
                ReferenceProduct::new(
                    "Wired Earbuds",
                    "3.5mm jack earbuds with inline microphone",
                    "Electronics",
                    (5.0, 3.0, 2.0),
                    0.02,
                ),
            ],
        }
    }
}

impl Retriever for StubRetriever {
    fn retrieve(&self, _record: &Record, top_k: usize) -> Vec<ReferenceProduct> {
        self.products.iter().take(top_k).cloned().collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// KnowledgeBaseRetriever
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct KnowledgeBase {
    #[serde(default)]
    products: Vec<Value>,
}

pub struct KnowledgeBaseRetriever {
    products: Vec<ReferenceProduct>,
}

impl KnowledgeBaseRetriever {
    /// Loads the knowledge base. A missing or unreadable file is not fatal:
    /// it is logged and the retriever starts empty. An entry that does not
    /// parse is skipped on its own.
    pub fn load(path: &Path) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str::<KnowledgeBase>(&text) {
                Ok(kb) => kb.products,
                Err(e) => {
                    warn!("Error loading knowledge base {}: {e}", path.display());
                    Vec::new()
                }
            },
            Err(_) => {
                warn!(
                    "Knowledge base file not found at {}. Using empty knowledge base.",
                    path.display()
                );
                Vec::new()
            }
        };

        let products: Vec<ReferenceProduct> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(i, entry)| match serde_json::from_value(entry) {
                Ok(product) => Some(product),
                Err(e) => {
                    warn!("Skipping knowledge base entry {i}: {e}");
                    None
                }
            })
            .collect();

        info!(
            "Knowledge base {} loaded with {} products",
            path.display(),
            products.len()
        );
        Self { products }
    }
}

impl Retriever for KnowledgeBaseRetriever {
    fn retrieve(&self, _record: &Record, top_k: usize) -> Vec<ReferenceProduct> {
        self.products.iter().take(top_k).cloned().collect()
    }
}
