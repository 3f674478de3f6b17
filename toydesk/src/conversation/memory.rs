use crate::catalog::Vocabulary;
use crate::config::ChatConfig;
use crate::models::ChatTurn;

/// Returned for a user with no prior turns.
pub const MEMORY_SENTINEL: &str = "New conversation - no previous context.";

/// How much of the conversation ends up in the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryWindow {
    /// Trailing turns rendered verbatim.
    pub recent_turns: usize,
    /// Characters kept per rendered turn before an ellipsis.
    pub preview_chars: usize,
    pub max_interests: usize,
}

impl Default for MemoryWindow {
    fn default() -> Self {
        Self {
            recent_turns: 10,
            preview_chars: 100,
            max_interests: 3,
        }
    }
}

impl From<&ChatConfig> for MemoryWindow {
    fn from(config: &ChatConfig) -> Self {
        Self {
            recent_turns: config.recent_turns,
            preview_chars: config.preview_chars,
            ..Self::default()
        }
    }
}

/// Summarise prior turns (oldest first) into a prompt block.
///
/// The summary line draws on every user turn, not only the rendered window:
/// the first age mention found and up to `max_interests` interest words in
/// first-seen order. Never fails; an empty history yields [`MEMORY_SENTINEL`].
pub fn format_conversation_memory(
    turns: &[ChatTurn],
    window: &MemoryWindow,
    vocab: &Vocabulary,
) -> String {
    if turns.is_empty() {
        return MEMORY_SENTINEL.to_string();
    }

    let mut lines = Vec::with_capacity(window.recent_turns + 1);
    if let Some(summary) = summary_line(turns, window, vocab) {
        lines.push(summary);
    }

    let start = turns.len().saturating_sub(window.recent_turns);
    lines.extend(
        turns[start..]
            .iter()
            .map(|turn| format!("{}: {}", turn.role, preview(&turn.message, window.preview_chars))),
    );

    lines.join("\n")
}

fn summary_line(turns: &[ChatTurn], window: &MemoryWindow, vocab: &Vocabulary) -> Option<String> {
    let user_turns = || turns.iter().filter(|turn| turn.is_user());

    let age = user_turns().find_map(|turn| vocab.find_age(&turn.message));

    let mut interests: Vec<&str> = Vec::new();
    for turn in user_turns() {
        let text = turn.message.to_lowercase();
        let mut found: Vec<(usize, &str)> = vocab
            .interests
            .iter()
            .filter_map(|interest| text.find(interest.as_str()).map(|at| (at, interest.as_str())))
            .collect();
        found.sort_by_key(|&(at, _)| at);

        for (_, interest) in found {
            if !interests.contains(&interest) {
                interests.push(interest);
            }
        }
    }
    interests.truncate(window.max_interests);

    let mut clauses = Vec::new();
    if let Some(age) = age {
        clauses.push(format!("Child age: {}.", age.text));
    }
    if !interests.is_empty() {
        clauses.push(format!("Interests: {}.", interests.join(", ")));
    }

    (!clauses.is_empty()).then(|| format!("Context: {}", clauses.join(" ")))
}

fn preview(message: &str, max_chars: usize) -> String {
    match message.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &message[..cut]),
        None => message.to_string(),
    }
}
