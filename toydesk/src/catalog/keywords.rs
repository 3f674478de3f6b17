use std::collections::HashSet;

use super::vocabulary::Vocabulary;

/// Shortest free-text token kept as a search term.
const MIN_TOKEN_CHARS: usize = 3;

/// Ordered, de-duplicated search terms built while scanning a query.
#[derive(Debug, Default)]
struct TermSet {
    seen: HashSet<String>,
    terms: Vec<String>,
}

impl TermSet {
    fn push(&mut self, term: &str) {
        if self.seen.insert(term.to_string()) {
            self.terms.push(term.to_string());
        }
    }

    fn into_terms(self) -> Vec<String> {
        self.terms
    }
}

/// Coarse age-group keywords for an age expressed in months.
pub fn age_bucket(months: u32) -> &'static [&'static str] {
    match months {
        0..=24 => &["baby", "toddler"],
        25..=60 => &["kids", "child"],
        _ => &["kids"],
    }
}

/// Turn a free-text query into lowercase search terms.
///
/// Terms come from four passes in order: age bucket, gender, category
/// synonyms, then the remaining plain words. Order of first appearance is
/// kept and duplicates are dropped. Any input is accepted; a query with
/// nothing recognisable yields an empty list.
pub fn extract_search_terms(query: &str, vocab: &Vocabulary) -> Vec<String> {
    let text = query.to_lowercase();
    let mut terms = TermSet::default();

    if let Some(age) = vocab.find_age(&text) {
        for keyword in age_bucket(age.in_months()) {
            terms.push(keyword);
        }
    }

    if vocab.mentions_boy(&text) {
        terms.push("boys");
    }
    if vocab.mentions_girl(&text) {
        terms.push("girls");
    }

    for rule in vocab.category_rules.iter().filter(|rule| rule.matches(&text)) {
        for keyword in rule.keywords() {
            terms.push(keyword);
        }
    }

    let cleaned: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    for token in cleaned.split_whitespace() {
        if token.chars().count() >= MIN_TOKEN_CHARS && !vocab.is_stop_word(token) {
            terms.push(token);
        }
    }

    terms.into_terms()
}
