//! Two-document TF-IDF similarity.
//!
//! Mirrors the common `TfidfVectorizer` defaults: lowercase, tokens are runs of
//! two or more word characters, smoothed IDF, L2-normalized rows. With only two
//! documents a term gets IDF `ln(3/3) + 1 = 1` if both contain it and
//! `ln(3/2) + 1` otherwise.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("valid token pattern"));

/// Splits `text` into lowercase terms.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn term_counts(tokens: &[String]) -> HashMap<&str, f64> {
    let mut counts = HashMap::new();
    for token in tokens {
        *counts.entry(token.as_str()).or_insert(0.0) += 1.0;
    }
    counts
}

/// TF-IDF cosine similarity between `a` and `b`, fitted on just these two texts.
///
/// Returns 0 when either text has no terms. The result is in `[0, 1]` and is
/// positive exactly when the texts share a term.
pub fn tfidf_similarity(a: &str, b: &str) -> f64 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let tf_a = term_counts(&tokens_a);
    let tf_b = term_counts(&tokens_b);

    const N_DOCS: f64 = 2.0;
    let idf = |term: &str| {
        let df = tf_a.contains_key(term) as u8 + tf_b.contains_key(term) as u8;
        ((1.0 + N_DOCS) / (1.0 + df as f64)).ln() + 1.0
    };

    let weights = |tf: &HashMap<&str, f64>| -> HashMap<String, f64> {
        let raw: Vec<(String, f64)> = tf
            .iter()
            .map(|(term, count)| (term.to_string(), count * idf(*term)))
            .collect();
        let norm = raw.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        raw.into_iter().map(|(t, w)| (t, w / norm)).collect()
    };

    let wa = weights(&tf_a);
    let wb = weights(&tf_b);

    let dot: f64 = wa
        .iter()
        .filter_map(|(term, w)| wb.get(term).map(|v| w * v))
        .sum();

    dot.clamp(0.0, 1.0)
}
