//! Whitespace canonicalization.

/// Collapses every whitespace run to a single space and trims both ends.
/// Empty input stays empty. Tokenization and case folding belong to the
/// scorers, not here.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
