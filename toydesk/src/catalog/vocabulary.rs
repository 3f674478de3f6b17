//! Word lists and patterns shared by the keyword extractor, the index
//! builder, the scorer and the conversation memory formatter.
//!
//! Everything here is plain data so the tables can be tested and extended
//! without touching the matching code. [`Vocabulary::toy_store`] is the
//! catalog the service ships with.

use std::collections::HashSet;

use regex::Regex;

/// One synonym pattern and the canonical keywords it contributes.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pattern: Regex,
    keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(pattern: &str, keywords: &[&str]) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// Unit of a detected age mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeUnit {
    Years,
    Months,
}

/// An age mention found in free text, e.g. `"3 year"` or `"18 months"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgeMention {
    pub value: u32,
    pub unit: AgeUnit,
    /// The matched text as written, trimmed.
    pub text: String,
}

impl AgeMention {
    pub fn in_months(&self) -> u32 {
        match self.unit {
            AgeUnit::Years => self.value.saturating_mul(12),
            AgeUnit::Months => self.value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Product-type words kept as index keywords.
    pub categories: HashSet<String>,
    /// Feature words kept as index keywords.
    pub attributes: HashSet<String>,
    pub age_groups: HashSet<String>,
    pub colors: HashSet<String>,
    /// Words that earn the flat popularity bonus.
    pub popular: Vec<String>,
    pub stop_words: HashSet<String>,
    /// Toy categories the memory formatter reports as user interests.
    pub interests: Vec<String>,
    pub category_rules: Vec<CategoryRule>,
    age_pattern: Regex,
    boy_pattern: Regex,
    girl_pattern: Regex,
}

fn word_set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn word_list(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in vocabulary pattern must compile")
}

fn rule(pattern: &str, keywords: &[&str]) -> CategoryRule {
    CategoryRule::new(pattern, keywords).expect("built-in category pattern must compile")
}

impl Vocabulary {
    /// English plus transliterated Hindi vocabulary for the toy catalog.
    pub fn toy_store() -> Self {
        Self {
            categories: word_set(&[
                "car", "cars", "jeep", "truck", "bus", "train", "bike", "bikes", "motorbike",
                "cycle", "bicycle", "tricycle", "scooter", "doll", "dolls", "stroller", "pram",
                "walker", "rocker", "swing", "slide", "horse", "kitchen", "house", "blocks",
                "puzzle", "ride", "tractor", "helicopter", "gun", "ball", "piano", "drum",
            ]),
            attributes: word_set(&[
                "push", "electric", "battery", "operated", "remote", "control", "rechargeable",
                "manual", "pedal", "musical", "educational", "learning", "foldable", "outdoor",
                "indoor", "creative", "art", "light", "lights", "sound", "magnetic", "wooden",
                "plastic", "soft", "mini", "big", "baby",
            ]),
            age_groups: word_set(&[
                "baby", "babies", "infant", "toddler", "toddlers", "kid", "kids", "child",
                "children", "boys", "girls", "junior", "teen",
            ]),
            colors: word_set(&[
                "red", "blue", "green", "yellow", "pink", "black", "white", "orange", "purple",
                "grey", "gray", "brown", "multicolor",
            ]),
            popular: word_list(&["car", "bike", "doll", "educational", "stroller", "scooter"]),
            stop_words: word_set(&[
                "the", "and", "for", "with", "from", "into", "onto", "about", "this", "that",
                "these", "those", "are", "was", "were", "has", "have", "had", "can", "could",
                "would", "should", "will", "you", "your", "our", "his", "her", "its", "their",
                "any", "some", "want", "wants", "need", "needs", "looking", "look", "show",
                "find", "get", "buy", "give", "please", "like", "what", "which", "who", "there",
                "here", "also", "just", "one", "ones", "something", "anything", "thing",
                "things", "good", "best", "nice", "year", "years", "old", "month", "months",
                "mujhe", "chahiye", "liye", "wala", "wali", "hai", "kya", "koi",
            ]),
            interests: word_list(&[
                "car", "bike", "cycle", "doll", "scooter", "stroller", "educational", "musical",
                "puzzle", "blocks", "outdoor", "ride", "swing", "kitchen",
            ]),
            category_rules: vec![
                rule(r"\b(cars?|vehicles?|gaadi|gadi|jeep|truck)\b", &["car", "vehicle"]),
                rule(r"\b(bikes?|cycles?|bicycles?|tricycles?|saikil)\b", &["bike", "cycle"]),
                rule(r"\b(dolls?|gudiya|gudiyaa)\b", &["doll"]),
                rule(
                    r"\b(educational|education|learning|learn|padhai|shiksha)\b",
                    &["educational", "learning"],
                ),
                rule(r"\b(musical|music|songs?|sangeet|gaana|gana)\b", &["musical"]),
                rule(r"\b(outdoor|outside|rides?|ride-on|bahar)\b", &["outdoor", "ride"]),
                rule(r"\b(indoor|inside|andar|ghar)\b", &["indoor"]),
                rule(
                    r"\b(creative|creativity|art|arts|craft|drawing|kala)\b",
                    &["creative", "art"],
                ),
                rule(r"\b(strollers?|prams?|buggy|buggies)\b", &["stroller"]),
                rule(r"\b(scooters?|scooty)\b", &["scooter"]),
            ],
            age_pattern: compile(
                r"(?i)\b([0-9]{1,3})\s*-?\s*(years?|yrs?|months?|mos?|saal|sal|mahine|mahina)\b",
            ),
            boy_pattern: compile(
                r"(?i)\b(boys?|sons?|nephews?|grandsons?|beta|bete|ladka|ladke)\b",
            ),
            girl_pattern: compile(
                r"(?i)\b(girls?|daughters?|nieces?|granddaughters?|beti|ladki|ladkiyan)\b",
            ),
        }
    }

    /// First age mention in `text`, if any.
    pub fn find_age(&self, text: &str) -> Option<AgeMention> {
        let caps = self.age_pattern.captures(text)?;
        let value = caps.get(1)?.as_str().parse::<u32>().ok()?;
        let unit_text = caps.get(2)?.as_str().to_lowercase();
        let unit = if unit_text.starts_with('m') {
            AgeUnit::Months
        } else {
            AgeUnit::Years
        };

        Some(AgeMention {
            value,
            unit,
            text: caps.get(0)?.as_str().trim().to_string(),
        })
    }

    pub fn mentions_boy(&self, text: &str) -> bool {
        self.boy_pattern.is_match(text)
    }

    pub fn mentions_girl(&self, text: &str) -> bool {
        self.girl_pattern.is_match(text)
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Whether a product-name token is descriptive enough to become an index keyword.
    pub fn is_index_keyword(&self, word: &str) -> bool {
        self.categories.contains(word)
            || self.attributes.contains(word)
            || self.age_groups.contains(word)
            || self.colors.contains(word)
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::toy_store()
    }
}
