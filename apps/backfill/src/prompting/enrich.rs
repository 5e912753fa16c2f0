//! Enrichment (RAG) mode: appends retrieved reference products to a prompt.

use crate::models::{Record, ReferenceProduct};
use crate::prompting::prompts::{
    DEFAULT_CATEGORY, DEFAULT_DESCRIPTION, DEFAULT_NAME, REFERENCE_CLOSING, REFERENCE_HEADING,
};
use crate::retrieval::Retriever;

/// Fetches up to `top_k` references for `record` and appends them, in the
/// order returned, after `base`. With no references the base is returned
/// unchanged.
pub fn enrich_prompt(
    base: &str,
    record: &Record,
    retriever: &dyn Retriever,
    top_k: usize,
) -> String {
    let references = retriever.retrieve(record, top_k);
    let references = &references[..references.len().min(top_k)];
    if references.is_empty() {
        return base.to_string();
    }

    let blocks = references
        .iter()
        .enumerate()
        .map(|(i, p)| render_reference(i + 1, p))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{base}\n\n{REFERENCE_HEADING}\n\n{blocks}\n{REFERENCE_CLOSING}")
}

/// One reference as a fixed-format block ending in a newline.
pub fn render_reference(position: usize, product: &ReferenceProduct) -> String {
    format!(
        "Similar Product {position}:\n\
         Name: {}\n\
         Description: {}\n\
         Category: {}\n\
         Dimensions: {}cm x {}cm x {}cm\n\
         Weight: {}kg\n",
        text_or(&product.name, DEFAULT_NAME),
        text_or(&product.description, DEFAULT_DESCRIPTION),
        text_or(&product.category, DEFAULT_CATEGORY),
        number(product.length),
        number(product.width),
        number(product.height),
        number(product.weight),
    )
}

fn text_or<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value.as_deref().filter(|v| !v.trim().is_empty()).unwrap_or(default)
}

// Whole numbers keep one decimal place ("19.0"), others print as-is ("0.28").
fn number(value: f64) -> String {
    format!("{value:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::StubRetriever;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns more products than asked for and records the requested k.
    struct GreedyRetriever {
        requested: AtomicUsize,
    }

    impl Retriever for GreedyRetriever {
        fn retrieve(&self, _record: &Record, top_k: usize) -> Vec<ReferenceProduct> {
            self.requested.store(top_k, Ordering::SeqCst);
            ["Zed", "Alpha", "Mid", "Last"]
                .iter()
                .map(|n| ReferenceProduct::new(n, "d", "c", (1.0, 1.0, 1.0), 1.0))
                .collect()
        }
    }

    #[test]
    fn test_render_reference_block() {
        let product = ReferenceProduct::new(
            "Wired Earbuds",
            "3.5mm jack earbuds",
            "Electronics",
            (5.0, 3.0, 2.0),
            0.02,
        );
        assert_eq!(
            render_reference(2, &product),
            "Similar Product 2:\nName: Wired Earbuds\nDescription: 3.5mm jack earbuds\n\
             Category: Electronics\nDimensions: 5.0cm x 3.0cm x 2.0cm\nWeight: 0.02kg\n"
        );
    }

    #[test]
    fn test_render_reference_defaults() {
        let product: ReferenceProduct = serde_json::from_str("{}").unwrap();
        let block = render_reference(1, &product);
        assert!(block.contains("Name: Unknown"));
        assert!(block.contains("Description: No description"));
        assert!(block.contains("Category: Uncategorized"));
        assert!(block.contains("Dimensions: 0.0cm x 0.0cm x 0.0cm"));
    }

    #[test]
    fn test_enrich_appends_heading_blocks_and_closing() {
        let prompt = enrich_prompt("Predict this.", &Record::default(), &StubRetriever::default(), 5);
        assert!(prompt.starts_with("Predict this.\n\n"));
        let heading = prompt.find(REFERENCE_HEADING).unwrap();
        let first = prompt.find("Similar Product 1:").unwrap();
        let second = prompt.find("Similar Product 2:").unwrap();
        assert!(heading < first && first < second);
        assert!(prompt.ends_with(REFERENCE_CLOSING));
    }

    #[test]
    fn test_enrich_never_exceeds_top_k_and_keeps_order() {
        let retriever = GreedyRetriever {
            requested: AtomicUsize::new(0),
        };
        let prompt = enrich_prompt("base", &Record::default(), &retriever, 2);
        assert_eq!(retriever.requested.load(Ordering::SeqCst), 2);
        assert!(prompt.contains("Similar Product 2:"));
        assert!(!prompt.contains("Similar Product 3:"));
        assert!(prompt.find("Name: Zed").unwrap() < prompt.find("Name: Alpha").unwrap());
    }

    #[test]
    fn test_enrich_with_zero_top_k_returns_base() {
        let prompt = enrich_prompt("base", &Record::default(), &StubRetriever::default(), 0);
        assert_eq!(prompt, "base");
    }
}
