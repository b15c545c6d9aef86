//! TF-IDF lexical similarity.
//!
//! The vocabulary is fitted jointly over the corpus plus the query (the
//! query counts as one more document), then each corpus document is scored
//! against the query by cosine over L2-normalized tf-idf vectors.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

use tracing::warn;

use super::DegradationReason;

/// Vocabulary cap: only the highest-frequency terms participate.
pub const MAX_VOCABULARY: usize = 20_000;

/// English stop words excluded from the vocabulary.
const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "am", "an", "and",
    "any", "are", "aren", "as", "at", "be", "because", "been", "before",
    "being", "below", "between", "both", "but", "by", "can", "cannot",
    "could", "couldn", "did", "didn", "do", "does", "doesn", "doing", "don",
    "down", "during", "each", "few", "for", "from", "further", "had",
    "hadn", "has", "hasn", "have", "haven", "having", "he", "her", "here",
    "hers", "herself", "him", "himself", "his", "how", "if", "in", "into",
    "is", "isn", "it", "its", "itself", "just", "ll", "me", "mightn",
    "more", "most", "mustn", "my", "myself", "needn", "no", "nor", "not",
    "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours",
    "ourselves", "out", "over", "own", "re", "same", "shan", "she",
    "should", "shouldn", "so", "some", "such", "than", "that", "the",
    "their", "theirs", "them", "themselves", "then", "there", "these",
    "they", "this", "those", "through", "to", "too", "under", "until",
    "up", "ve", "very", "was", "wasn", "we", "were", "weren", "what",
    "when", "where", "which", "while", "who", "whom", "why", "will",
    "with", "won", "would", "wouldn", "you", "your", "yours", "yourself",
    "yourselves",
];

fn stop_words() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

/// Scores every corpus document against the query. Each value is a cosine
/// similarity in [0, 1]. Any internal failure degrades to an all-zero
/// vector of corpus length rather than an error.
pub fn score(corpus: &[String], query: &str) -> Vec<f32> {
    match similarities(corpus, query) {
        Ok(scores) => scores,
        Err(reason) => {
            warn!("lexical scorer degraded: {reason}");
            vec![0.0; corpus.len()]
        }
    }
}

fn similarities(corpus: &[String], query: &str) -> Result<Vec<f32>, DegradationReason> {
    let query_tokens = tokenize(query);
    let corpus_tokens: Vec<Vec<String>> = corpus.iter().map(|text| tokenize(text)).collect();

    // Fit over the corpus plus the query; the query is excluded from the
    // scored vectors afterwards.
    let mut fitted: Vec<&[String]> = corpus_tokens.iter().map(Vec::as_slice).collect();
    fitted.push(&query_tokens);

    let vocabulary = build_vocabulary(&fitted, MAX_VOCABULARY);
    if vocabulary.is_empty() {
        return Err(DegradationReason::EmptyVocabulary);
    }
    let idf = inverse_document_frequencies(&fitted, &vocabulary);

    let query_vector = weighted_vector(&query_tokens, &vocabulary, &idf);
    Ok(corpus_tokens
        .iter()
        .map(|tokens| sparse_dot(&query_vector, &weighted_vector(tokens, &vocabulary, &idf)))
        .collect())
}

/// Lowercased alphanumeric runs of at least two characters, stop words
/// removed.
fn tokenize(text: &str) -> Vec<String> {
    let stop = stop_words();
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= 2 && !stop.contains(*token))
        .map(str::to_string)
        .collect()
}

/// Assigns indices to the highest-total-count terms, capped at `cap`.
/// Ties break alphabetically so fitting is deterministic.
fn build_vocabulary(documents: &[&[String]], cap: usize) -> HashMap<String, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for tokens in documents {
        for token in *tokens {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }
    }

    let mut terms: Vec<(&str, usize)> = counts.into_iter().collect();
    terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    terms.truncate(cap);

    terms
        .into_iter()
        .enumerate()
        .map(|(index, (term, _))| (term.to_string(), index))
        .collect()
}

/// Smoothed inverse document frequency: ln((1 + n) / (1 + df)) + 1.
fn inverse_document_frequencies(
    documents: &[&[String]],
    vocabulary: &HashMap<String, usize>,
) -> Vec<f32> {
    let mut document_frequency = vec![0usize; vocabulary.len()];
    for tokens in documents {
        let mut seen: HashSet<usize> = HashSet::new();
        for token in *tokens {
            if let Some(&index) = vocabulary.get(token.as_str()) {
                if seen.insert(index) {
                    document_frequency[index] += 1;
                }
            }
        }
    }

    let total = documents.len() as f32;
    document_frequency
        .iter()
        .map(|&df| ((1.0 + total) / (1.0 + df as f32)).ln() + 1.0)
        .collect()
}

/// L2-normalized tf-idf vector for one document, sparse over vocabulary
/// indices. BTreeMap keeps accumulation order deterministic.
fn weighted_vector(
    tokens: &[String],
    vocabulary: &HashMap<String, usize>,
    idf: &[f32],
) -> BTreeMap<usize, f32> {
    let mut weights: BTreeMap<usize, f32> = BTreeMap::new();
    for token in tokens {
        if let Some(&index) = vocabulary.get(token.as_str()) {
            *weights.entry(index).or_insert(0.0) += idf[index];
        }
    }

    let norm = weights.values().map(|w| w * w).sum::<f32>().sqrt();
    if norm > 0.0 {
        for weight in weights.values_mut() {
            *weight /= norm;
        }
    }
    weights
}

/// Dot product of two L2-normalized sparse vectors, i.e. their cosine.
fn sparse_dot(a: &BTreeMap<usize, f32>, b: &BTreeMap<usize, f32>) -> f32 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .map(|(index, weight)| weight * large.get(index).copied().unwrap_or(0.0))
        .sum()
}
