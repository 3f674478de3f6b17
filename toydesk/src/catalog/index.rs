use std::collections::HashSet;

use serde::Serialize;
use url::Url;

use super::vocabulary::Vocabulary;
use crate::config::CatalogConfig;

/// Names with at most this many words keep every word as a keyword.
const SHORT_NAME_WORDS: usize = 5;

/// How catalog lines are recognised and product names derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRules {
    pub url_prefix: String,
    pub brand_prefix: String,
}

impl From<&CatalogConfig> for CatalogRules {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            url_prefix: config.url_prefix.clone(),
            brand_prefix: config.brand_prefix.clone(),
        }
    }
}

impl Default for CatalogRules {
    fn default() -> Self {
        Self::from(&CatalogConfig::default())
    }
}

/// One sellable item parsed from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductEntry {
    pub url: String,
    pub slug: String,
    pub name: String,
    /// Lowercase matching tokens, unique, in name order.
    pub keywords: Vec<String>,
    /// `name` followed by the space-joined keywords.
    #[serde(skip)]
    search_text: String,
}

impl ProductEntry {
    pub fn new(
        url: impl Into<String>,
        slug: impl Into<String>,
        name: impl Into<String>,
        keywords: Vec<String>,
    ) -> Self {
        let name = name.into();
        let search_text = format!("{} {}", name, keywords.join(" "));
        Self {
            url: url.into(),
            slug: slug.into(),
            name,
            keywords,
            search_text,
        }
    }

    /// Text the scorer matches against.
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn has_keyword(&self, term: &str) -> bool {
        self.keywords.iter().any(|k| k == term)
    }

    /// Name with the first letter of every word upper-cased.
    pub fn display_name(&self) -> String {
        self.name
            .split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Parse newline-delimited product URLs into index entries.
///
/// Blank lines and lines outside `rules.url_prefix` are skipped. Entries keep
/// catalog order and duplicate slugs are kept as they appear.
pub fn build_index(
    catalog_text: &str,
    rules: &CatalogRules,
    vocab: &Vocabulary,
) -> Vec<ProductEntry> {
    catalog_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.starts_with(&rules.url_prefix))
        .filter_map(|line| parse_product_line(line, rules, vocab))
        .collect()
}

fn parse_product_line(
    line: &str,
    rules: &CatalogRules,
    vocab: &Vocabulary,
) -> Option<ProductEntry> {
    let slug = slug_from_url(line)?;
    let name = name_from_slug(&slug, &rules.brand_prefix);
    if name.is_empty() {
        return None;
    }
    let keywords = derive_keywords(&name, vocab);

    Some(ProductEntry::new(line, slug, name, keywords))
}

/// Final non-empty path segment of the URL.
fn slug_from_url(line: &str) -> Option<String> {
    let url = Url::parse(line).ok()?;
    let slug = url
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()?
        .to_string();
    Some(slug)
}

/// Drop a leading brand token, turn hyphens into spaces, lowercase.
pub fn name_from_slug(slug: &str, brand_prefix: &str) -> String {
    let lowered = slug.to_lowercase();
    let brand = brand_prefix.trim_end_matches('-').to_lowercase();

    let mut words: Vec<&str> = lowered.split('-').filter(|w| !w.is_empty()).collect();
    if !brand.is_empty() && words.first() == Some(&brand.as_str()) {
        words.remove(0);
    }

    words.join(" ")
}

fn derive_keywords(name: &str, vocab: &Vocabulary) -> Vec<String> {
    let words: Vec<&str> = name.split_whitespace().collect();
    let keep_all = words.len() <= SHORT_NAME_WORDS;

    let mut seen = HashSet::new();
    words
        .into_iter()
        .filter(|word| keep_all || vocab.is_index_keyword(word))
        .filter(|word| seen.insert(*word))
        .map(str::to_string)
        .collect()
}
