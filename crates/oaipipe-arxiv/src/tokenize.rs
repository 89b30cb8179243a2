//! Sentence and word tokenization for shard output.
//!
//! Splits text into sentences, then into word and punctuation tokens.
//! Case is preserved; joining tokens back together is the writer's job.

use std::sync::LazyLock;

use regex::Regex;

/// A sentence: a run of text up to (and including) terminal punctuation.
static SENTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^.!?]+(?:[.!?]+|$)").expect("valid sentence regex"));

/// A word (internal hyphens/apostrophes kept) or a single punctuation mark.
static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+(?:[-']\w+)*|[^\w\s]").expect("valid word regex"));

/// Split into sentences, each a sequence of tokens.
pub fn tokenize(text: &str) -> Vec<Vec<String>> {
    let mut sentences: Vec<Vec<String>> = SENTENCE
        .find_iter(text)
        .filter_map(|m| words_of(m.as_str()))
        .collect();
    // Text made only of punctuation never matches the sentence pattern;
    // treat it as a single sentence so no input maps to silence.
    if sentences.is_empty() {
        if let Some(words) = words_of(text) {
            sentences.push(words);
        }
    }
    sentences
}

/// Tokenize and re-join with single spaces, flattening sentence boundaries.
pub fn normalize(text: &str) -> String {
    tokenize(text)
        .iter()
        .map(|sentence| sentence.join(" "))
        .collect::<Vec<_>>()
        .join(" ")
}

fn words_of(sentence: &str) -> Option<Vec<String>> {
    let words: Vec<String> = WORD
        .find_iter(sentence)
        .map(|m| m.as_str().to_string())
        .collect();
    if words.is_empty() { None } else { Some(words) }
}
