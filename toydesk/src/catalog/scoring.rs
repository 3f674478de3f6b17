use serde::Serialize;

use super::index::ProductEntry;
use super::vocabulary::Vocabulary;

/// Characters of a term used for the partial-prefix check.
const PARTIAL_PREFIX_CHARS: usize = 4;

/// Per-signal weights. The tiers stack: a term that is a keyword also hits
/// the substring and prefix checks, so keyword matches always outrank plain
/// substring hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreWeights {
    pub substring: u32,
    pub partial_prefix: u32,
    pub keyword: u32,
    pub popularity: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            substring: 10,
            partial_prefix: 3,
            keyword: 15,
            popularity: 2,
        }
    }
}

/// A product with its score for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredProduct {
    #[serde(flatten)]
    pub product: ProductEntry,
    pub score: u32,
}

/// Score `entry` against `terms`. Zero means no match.
///
/// The popularity bonus does not depend on which terms matched: any
/// non-empty term set adds it to entries naming a popular category. An empty
/// term set always scores zero.
pub fn score_product(
    terms: &[String],
    entry: &ProductEntry,
    vocab: &Vocabulary,
    weights: &ScoreWeights,
) -> u32 {
    if terms.iter().all(|t| t.is_empty()) {
        return 0;
    }

    let text = entry.search_text();
    let mut score = 0u32;

    for term in terms.iter().filter(|t| !t.is_empty()) {
        if text.contains(term.as_str()) {
            score += weights.substring;
        }

        let prefix: String = term.chars().take(PARTIAL_PREFIX_CHARS).collect();
        if text.contains(prefix.as_str()) {
            score += weights.partial_prefix;
        }

        if entry.has_keyword(term) {
            score += weights.keyword;
        }
    }

    let popular_hits = vocab
        .popular
        .iter()
        .filter(|word| text.contains(word.as_str()))
        .count() as u32;

    score + popular_hits * weights.popularity
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_car() -> ProductEntry {
        ProductEntry::new(
            "https://thegurtoys.com/products/gurtoy-push-car-rabbit-car-for-kids",
            "gurtoy-push-car-rabbit-car-for-kids",
            "push car rabbit car for kids",
            vec!["car".to_string(), "kids".to_string()],
        )
    }

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn score(words: &[&str], entry: &ProductEntry) -> u32 {
        score_product(
            &terms(words),
            entry,
            &Vocabulary::toy_store(),
            &ScoreWeights::default(),
        )
    }

    #[test]
    fn keyword_terms_stack_all_three_tiers() {
        // car: 10 + 3 + 15, kids: 10 + 3 + 15, popular "car": 2
        assert_eq!(score(&["car", "kids"], &push_car()), 58);
        assert!(score(&["car", "kids"], &push_car()) >= 47);
    }

    #[test]
    fn substring_without_keyword_scores_lower() {
        let entry = push_car();
        let rabbit = score(&["rabbit"], &entry);
        let car = score(&["car"], &entry);
        assert_eq!(rabbit, 10 + 3 + 2);
        assert!(car > rabbit);
    }

    #[test]
    fn partial_prefix_matches_alone() {
        // "pushing" is not a substring but "push" is.
        assert_eq!(score(&["pushing"], &push_car()), 3 + 2);
    }

    #[test]
    fn short_terms_use_whole_term_as_prefix() {
        let entry = ProductEntry::new("u", "s", "red ball", vec!["red".to_string()]);
        assert_eq!(score(&["red"], &entry), 10 + 3 + 15);
    }

    #[test]
    fn popular_entry_earns_bonus_without_term_match() {
        assert_eq!(score(&["gift"], &push_car()), 2);
        assert_eq!(score(&["doll"], &push_car()), 2);
    }

    #[test]
    fn empty_terms_score_zero_even_if_popular() {
        assert_eq!(score(&[], &push_car()), 0);
        assert_eq!(score(&[""], &push_car()), 0);
    }

    #[test]
    fn unpopular_unmatched_entry_scores_zero() {
        let entry = ProductEntry::new("u", "s", "wooden puzzle", vec!["puzzle".to_string()]);
        assert_eq!(score(&["gift"], &entry), 0);
    }

    #[test]
    fn popularity_bonus_counts_each_popular_word_once() {
        let entry = ProductEntry::new(
            "u",
            "s",
            "car bike doll combo",
            vec!["car".to_string(), "bike".to_string(), "doll".to_string()],
        );
        // combo: 10 + 3; three popular words: 3 * 2
        assert_eq!(score(&["combo"], &entry), 13 + 6);
    }

    #[test]
    fn custom_weights_are_respected() {
        let weights = ScoreWeights {
            substring: 1,
            partial_prefix: 0,
            keyword: 100,
            popularity: 0,
        };
        let got = score_product(&terms(&["kids"]), &push_car(), &Vocabulary::toy_store(), &weights);
        assert_eq!(got, 101);
    }
}
