use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::index::{build_index, CatalogRules, ProductEntry};
use super::keywords::extract_search_terms;
use super::scoring::{score_product, ScoreWeights, ScoredProduct};
use super::vocabulary::Vocabulary;
use crate::clock::Clock;
use crate::config::CatalogConfig;

/// Returned by [`ProductMatcher::smart_product_context`] when nothing matched.
pub const NO_PRODUCTS_SENTINEL: &str =
    "No specific product recommendations needed for this query.";

/// Appended after the product list in the prompt block.
pub const PRODUCT_INSTRUCTION: &str =
    "Recommend at most 3 of these products and only recommend products from this list.";

#[derive(Debug)]
struct IndexSnapshot {
    entries: Vec<ProductEntry>,
    built_at: DateTime<Utc>,
}

/// Read-only view of the product index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub indexed: usize,
    pub last_updated: Option<DateTime<Utc>>,
    /// Zero when no index has been built.
    pub cache_age_ms: i64,
}

/// Ranks catalog products against free-text queries.
///
/// The parsed index is rebuilt lazily on the first lookup after `ttl` has
/// passed. Each rebuild swaps in a whole new snapshot, so readers never see a
/// partial index. Two requests racing on an expired index may both rebuild;
/// the results are identical and the last write wins.
pub struct ProductMatcher {
    rules: CatalogRules,
    vocab: Arc<Vocabulary>,
    weights: ScoreWeights,
    ttl: Duration,
    context_limit: usize,
    clock: Arc<dyn Clock>,
    index: RwLock<Option<Arc<IndexSnapshot>>>,
}

impl ProductMatcher {
    pub fn new(config: &CatalogConfig, vocab: Arc<Vocabulary>, clock: Arc<dyn Clock>) -> Self {
        Self {
            rules: CatalogRules::from(config),
            vocab,
            weights: ScoreWeights::default(),
            ttl: Duration::seconds(i64::try_from(config.index_ttl_secs).unwrap_or(i64::MAX)),
            context_limit: config.context_limit,
            clock,
            index: RwLock::new(None),
        }
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Number of products [`Self::smart_product_context`] lists.
    pub fn context_limit(&self) -> usize {
        self.context_limit
    }

    /// Top `limit` products for `query`, best first.
    ///
    /// Only entries with a positive score are returned. Equal scores keep
    /// catalog order.
    pub fn find_relevant_products(
        &self,
        query: &str,
        catalog_text: &str,
        limit: usize,
    ) -> Vec<ScoredProduct> {
        let snapshot = self.current_index(catalog_text);

        let terms = extract_search_terms(query, &self.vocab);
        if terms.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut scored: Vec<ScoredProduct> = snapshot
            .entries
            .iter()
            .filter_map(|entry| {
                let score = score_product(&terms, entry, &self.vocab, &self.weights);
                (score > 0).then(|| ScoredProduct {
                    product: entry.clone(),
                    score,
                })
            })
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(limit);

        tracing::debug!(
            terms = ?terms,
            matches = scored.len(),
            "Matched products for query"
        );

        scored
    }

    /// Prompt-ready block listing the products relevant to `query`.
    pub fn smart_product_context(&self, query: &str, catalog_text: &str) -> String {
        let products = self.find_relevant_products(query, catalog_text, self.context_limit);
        render_product_block(&products)
    }

    pub fn index_stats(&self) -> IndexStats {
        let guard = self.index.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(snapshot) => IndexStats {
                indexed: snapshot.entries.len(),
                last_updated: Some(snapshot.built_at),
                cache_age_ms: (self.clock.now() - snapshot.built_at)
                    .num_milliseconds()
                    .max(0),
            },
            None => IndexStats {
                indexed: 0,
                last_updated: None,
                cache_age_ms: 0,
            },
        }
    }

    /// Parse `catalog_text` now regardless of the current index age.
    pub fn rebuild_index(&self, catalog_text: &str) -> IndexStats {
        self.rebuild(catalog_text);
        self.index_stats()
    }

    /// Drop the index; the next lookup rebuilds it.
    pub fn clear_index(&self) {
        let mut guard = self.index.write().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }

    fn current_index(&self, catalog_text: &str) -> Arc<IndexSnapshot> {
        {
            let guard = self.index.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(snapshot) = guard.as_ref() {
                if self.clock.now() - snapshot.built_at <= self.ttl {
                    return Arc::clone(snapshot);
                }
            }
        }
        self.rebuild(catalog_text)
    }

    fn rebuild(&self, catalog_text: &str) -> Arc<IndexSnapshot> {
        let snapshot = Arc::new(IndexSnapshot {
            entries: build_index(catalog_text, &self.rules, &self.vocab),
            built_at: self.clock.now(),
        });

        tracing::info!(entries = snapshot.entries.len(), "Product index rebuilt");

        let mut guard = self.index.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(Arc::clone(&snapshot));
        snapshot
    }
}

/// Markdown link per product followed by [`PRODUCT_INSTRUCTION`], or the
/// sentinel when `products` is empty.
pub fn render_product_block(products: &[ScoredProduct]) -> String {
    if products.is_empty() {
        return NO_PRODUCTS_SENTINEL.to_string();
    }

    let lines: Vec<String> = products
        .iter()
        .map(|p| format!("- [{}]({})", p.product.display_name(), p.product.url))
        .collect();

    format!("{}\n\n{}", lines.join("\n"), PRODUCT_INSTRUCTION)
}
