//! Text normalization and fuzzy name scoring.

/// Canonicalize free text for comparison.
///
/// Folds case, removes commas, and collapses surrounding/internal whitespace,
/// so `"Twain, Mark"` and `"twain mark"` compare equal. Pure and idempotent;
/// used both to shape the outbound SRU query and for exact-match detection.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .replace(',', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Token-order-insensitive similarity ratio between two strings, 0–100.
///
/// Both sides are normalized, tokenized, and sorted before a Levenshtein
/// ratio is taken, so `"Mark Twain"` vs `"Twain Mark"` scores 100.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    let a = sorted_tokens(&normalize(a));
    let b = sorted_tokens(&normalize(b));
    (strsim::normalized_levenshtein(&a, &b) * 100.0).round() as u8
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
