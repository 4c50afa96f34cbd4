//! Text normalization and tokenization helpers shared by collectors.

use crate::constants::collectors::NGRAM_GLUE;
use crate::types::Term;

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_inline_whitespace<T: AsRef<str>>(text: T) -> String {
    let mut normalized = String::new();
    let mut seen_space = false;
    for ch in text.as_ref().chars() {
        if ch.is_whitespace() {
            if !seen_space {
                normalized.push(' ');
                seen_space = true;
            }
        } else {
            normalized.push(ch);
            seen_space = false;
        }
    }
    normalized.trim().to_string()
}

/// Split a block of text into sentences, falling back to the whole string when needed.
/// Heuristic sentence splitter with tokenizer-friendly rules.
pub fn sentences(text: &str) -> Vec<String> {
    let mut results = Vec::new();

    for block in text.split("\n\n") {
        if block.trim().is_empty() {
            continue;
        }
        let normalized = normalize_inline_whitespace(block);
        if normalized.is_empty() {
            continue;
        }
        push_block_sentences(&normalized, &mut results);
    }

    results
}

/// Split text into word tokens; commas are kept as their own `","` token.
///
/// Other punctuation separates tokens and is dropped.
pub fn tokenize(text: &str, lowercase: bool) -> Vec<Term> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ch.is_alphanumeric() || ch == '\'' {
            current.push(ch);
            continue;
        }
        flush_token(&mut current, &mut tokens, lowercase);
        if ch == ',' {
            tokens.push(",".to_string());
        }
    }
    flush_token(&mut current, &mut tokens, lowercase);
    tokens
}

/// All n-grams of `tokens` with `min_n <= n <= max_n`, joined by the n-gram glue.
pub fn ngrams(tokens: &[Term], min_n: usize, max_n: usize) -> Vec<Term> {
    let mut grams = Vec::new();
    for n in min_n.max(1)..=max_n {
        if n > tokens.len() {
            break;
        }
        for window in tokens.windows(n) {
            grams.push(window.join(NGRAM_GLUE));
        }
    }
    grams
}

fn flush_token(current: &mut String, tokens: &mut Vec<Term>, lowercase: bool) {
    if current.is_empty() {
        return;
    }
    let token = std::mem::take(current);
    tokens.push(if lowercase { token.to_lowercase() } else { token });
}

fn push_block_sentences(block: &str, results: &mut Vec<String>) {
    let chars: Vec<char> = block.chars().collect();
    let mut buffer = String::new();

    for (idx, ch) in chars.iter().enumerate() {
        buffer.push(*ch);
        if is_sentence_boundary(&chars, idx) {
            let trimmed = buffer.trim();
            if !trimmed.is_empty() {
                results.push(trimmed.to_string());
            }
            buffer.clear();
        }
    }

    let trailing = buffer.trim();
    if !trailing.is_empty() {
        results.push(trailing.to_string());
    }
}

fn is_sentence_boundary(chars: &[char], idx: usize) -> bool {
    match chars[idx] {
        '.' => is_dot_boundary(chars, idx),
        '!' | '?' => true,
        _ => false,
    }
}

/// A dot ends a sentence only when followed by whitespace or the end of text,
/// so decimals, file names, and inline abbreviations stay in one sentence.
fn is_dot_boundary(chars: &[char], idx: usize) -> bool {
    match chars.get(idx + 1) {
        None => true,
        Some(next) => next.is_whitespace(),
    }
}
