//! Keyword-based product matching over a newline-delimited catalog of
//! product URLs.

pub mod index;
pub mod keywords;
pub mod matcher;
pub mod scoring;
pub mod vocabulary;

pub use index::{build_index, CatalogRules, ProductEntry};
pub use keywords::extract_search_terms;
pub use matcher::{
    render_product_block, IndexStats, ProductMatcher, NO_PRODUCTS_SENTINEL, PRODUCT_INSTRUCTION,
};
pub use scoring::{score_product, ScoreWeights, ScoredProduct};
pub use vocabulary::{AgeMention, AgeUnit, CategoryRule, Vocabulary};
