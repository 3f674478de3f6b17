mod common;

use std::sync::Arc;

use chrono::Duration;
use pretty_assertions::assert_eq;

use common::{init_test_logger, CATALOG};
use toydesk::catalog::{
    build_index, extract_search_terms, CatalogRules, ProductMatcher, Vocabulary,
    NO_PRODUCTS_SENTINEL, PRODUCT_INSTRUCTION,
};
use toydesk::clock::ManualClock;
use toydesk::config::CatalogConfig;

fn matcher(clock: &ManualClock) -> ProductMatcher {
    ProductMatcher::new(
        &CatalogConfig::default(),
        Arc::new(Vocabulary::toy_store()),
        Arc::new(clock.clone()),
    )
}

#[test]
fn test_index_covers_every_catalog_line() {
    let vocab = Vocabulary::toy_store();
    let index = build_index(CATALOG, &CatalogRules::default(), &vocab);

    assert_eq!(index.len(), 6);
    assert_eq!(index[0].name, "push car rabbit car for kids");
    assert_eq!(index[5].slug, "gurtoy-pink-princess-kitchen-set-for-girls");
    assert!(index.iter().all(|entry| !entry.keywords.is_empty()));
}

#[test]
fn test_remote_control_query_ranks_exact_product_first() {
    init_test_logger();
    let clock = ManualClock::default();
    let m = matcher(&clock);

    let results = m.find_relevant_products("remote control car", CATALOG, 8);

    assert!(results.len() >= 2);
    assert_eq!(results[0].product.name, "red remote control car");
    assert!(results[0].score > results[1].score);
}

#[test]
fn test_hindi_query_finds_dolls_for_girls() {
    let clock = ManualClock::default();
    let m = matcher(&clock);

    let results = m.find_relevant_products("beti ke liye gudiya", CATALOG, 8);
    let names: Vec<&str> = results.iter().map(|r| r.product.name.as_str()).collect();

    assert_eq!(
        &names[..2],
        &["baby doll house", "pink princess kitchen set for girls"]
    );

    // The scooter matched no term and only carries the popularity bonus.
    let scooter = results
        .iter()
        .find(|r| r.product.name == "kids scooter")
        .expect("popular product is still listed");
    assert_eq!(scooter.score, 2);
    assert!(!names.contains(&"musical learning piano for toddlers"));
}

#[test]
fn test_limit_is_respected_and_order_is_descending() {
    let clock = ManualClock::default();
    let m = matcher(&clock);

    let results = m.find_relevant_products("car toy for my 2 year old son", CATALOG, 1);
    assert_eq!(results.len(), 1);

    let all = m.find_relevant_products("car toy for my 2 year old son", CATALOG, 10);
    assert!(all.windows(2).all(|w| w[0].score >= w[1].score));
    assert_eq!(all[0].product.url, results[0].product.url);
}

#[test]
fn test_product_block_lists_links_then_instruction() {
    let clock = ManualClock::default();
    let m = matcher(&clock);

    let block = m.smart_product_context("piano", CATALOG);

    // The piano matches; the popular categories follow on their bonus alone,
    // in catalog order. The kitchen set has neither.
    assert_eq!(
        block,
        format!(
            "- [Musical Learning Piano For Toddlers](https://thegurtoys.com/products/gurtoy-musical-learning-piano-for-toddlers)\n\
             - [Push Car Rabbit Car For Kids](https://thegurtoys.com/products/gurtoy-push-car-rabbit-car-for-kids)\n\
             - [Baby Doll House](https://thegurtoys.com/products/gurtoy-baby-doll-house)\n\
             - [Kids Scooter](https://thegurtoys.com/products/gurtoy-kids-scooter)\n\
             - [Red Remote Control Car](https://thegurtoys.com/products/gurtoy-red-remote-control-car)\n\n\
             {PRODUCT_INSTRUCTION}"
        )
    );
}

#[test]
fn test_vague_query_still_surfaces_popular_products() {
    let clock = ManualClock::default();
    let m = matcher(&clock);
    let catalog = "https://thegurtoys.com/products/gurtoy-red-remote-control-car";

    assert_eq!(
        m.smart_product_context("birthday gift ideas", catalog),
        format!(
            "- [Red Remote Control Car](https://thegurtoys.com/products/gurtoy-red-remote-control-car)\n\n{PRODUCT_INSTRUCTION}"
        )
    );
}

#[test]
fn test_queries_without_terms_get_sentinel() {
    let clock = ManualClock::default();
    let m = matcher(&clock);

    assert!(extract_search_terms("please show me something", m.vocabulary()).is_empty());
    assert_eq!(
        m.smart_product_context("please show me something", CATALOG),
        NO_PRODUCTS_SENTINEL
    );
}

#[test]
fn test_index_refreshes_after_ttl() {
    let clock = ManualClock::default();
    let m = matcher(&clock);

    m.find_relevant_products("scooter", CATALOG, 8);
    assert_eq!(m.index_stats().indexed, 6);

    let smaller = "https://thegurtoys.com/products/gurtoy-kids-scooter";
    clock.advance(Duration::seconds(600));
    m.find_relevant_products("scooter", smaller, 8);
    assert_eq!(m.index_stats().indexed, 6);

    clock.advance(Duration::seconds(1));
    m.find_relevant_products("scooter", smaller, 8);
    assert_eq!(m.index_stats().indexed, 1);
    assert_eq!(m.index_stats().cache_age_ms, 0);
}
