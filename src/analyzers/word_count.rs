use std::collections::HashMap;

use crate::types::{Commit, WordFrequency};

/// Case-insensitive word frequencies: lowercase the text, split on
/// every non-alphabetic character, count what remains.
pub fn word_count(text: &str) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for word in text.to_lowercase().split(|c: char| !c.is_ascii_lowercase()) {
        if word.is_empty() {
            continue;
        }
        *counts.entry(word.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Word frequencies across every commit message in the history.
pub fn history_word_count(commits: &[Commit]) -> HashMap<String, usize> {
    let joined = commits
        .iter()
        .map(|c| c.message.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    word_count(&joined)
}

/// The `limit` most frequent words, count descending, word ascending on
/// ties so output is deterministic.
pub fn top_words(counts: &HashMap<String, usize>, limit: usize) -> Vec<WordFrequency> {
    let mut words: Vec<WordFrequency> = counts
        .iter()
        .map(|(word, &count)| WordFrequency {
            word: word.clone(),
            count,
        })
        .collect();
    words.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    words.truncate(limit);
    words
}
