//! Embedding-based semantic similarity.

use tracing::warn;

use super::DegradationReason;
use crate::embedding::SemanticModel;

/// Scores every corpus document against the query through the semantic
/// capability. Unavailability and encoding failures degrade to an
/// all-zero vector of corpus length; this scorer never errors toward its
/// caller.
pub async fn score(model: &SemanticModel, corpus: &[String], query: &str) -> Vec<f32> {
    match similarities(model, corpus, query).await {
        Ok(scores) => scores,
        Err(reason) => {
            warn!("semantic scorer degraded: {reason}");
            vec![0.0; corpus.len()]
        }
    }
}

async fn similarities(
    model: &SemanticModel,
    corpus: &[String],
    query: &str,
) -> Result<Vec<f32>, DegradationReason> {
    let encoder = model.encoder().ok_or(DegradationReason::ModelUnavailable)?;

    // One batch for the corpus plus the query, query last.
    let mut texts: Vec<String> = corpus.to_vec();
    texts.push(query.to_string());

    let mut embeddings = encoder
        .encode(&texts)
        .await
        .map_err(|e| DegradationReason::Encoding(e.to_string()))?;
    if embeddings.len() != texts.len() {
        return Err(DegradationReason::VectorCountMismatch {
            expected: texts.len(),
            got: embeddings.len(),
        });
    }

    let query_embedding = embeddings
        .pop()
        .ok_or(DegradationReason::VectorCountMismatch {
            expected: texts.len(),
            got: 0,
        })?;

    Ok(embeddings
        .iter()
        .map(|embedding| cosine_similarity(&query_embedding, embedding))
        .collect())
}

/// Cosine similarity with a zero-norm guard: any zero-magnitude vector
/// contributes 0.0 rather than a division by zero.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::embedding::{EmbedError, TextEncoder};

    /// Maps known texts to fixed vectors; unknown texts get a zero vector.
    struct TableEncoder {
        table: HashMap<String, Vec<f32>>,
    }

    impl TableEncoder {
        fn new(entries: &[(&str, Vec<f32>)]) -> Arc<Self> {
            Arc::new(Self {
                table: entries
                    .iter()
                    .map(|(text, vector)| (text.to_string(), vector.clone()))
                    .collect(),
            })
        }
    }

    #[async_trait]
    impl TextEncoder for TableEncoder {
        async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Ok(texts
                .iter()
                .map(|text| self.table.get(text).cloned().unwrap_or_else(|| vec![0.0; 3]))
                .collect())
        }
    }

    struct FailingEncoder;

    #[async_trait]
    impl TextEncoder for FailingEncoder {
        async fn encode(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Err(EmbedError::Api {
                status: 500,
                message: "boom".to_string(),
            })
        }
    }

    struct MiscountingEncoder;

    #[async_trait]
    impl TextEncoder for MiscountingEncoder {
        async fn encode(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Ok(vec![vec![1.0, 0.0]])
        }
    }

    fn corpus(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn test_unavailable_model_yields_zeros() {
        let scores = score(&SemanticModel::Unavailable, &corpus(&["a", "b"]), "q").await;
        assert_eq!(scores, vec![0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_similarities_order_corpus_by_query_affinity() {
        let encoder = TableEncoder::new(&[
            ("close", vec![1.0, 0.0, 0.0]),
            ("far", vec![0.0, 1.0, 0.0]),
            ("query", vec![1.0, 0.1, 0.0]),
        ]);
        let model = SemanticModel::from_encoder(encoder);
        let scores = score(&model, &corpus(&["close", "far"]), "query").await;
        assert!(scores[0] > scores[1]);
        assert!(scores[0] > 0.9);
    }

    #[tokio::test]
    async fn test_zero_norm_embedding_contributes_zero() {
        let encoder = TableEncoder::new(&[("query", vec![1.0, 1.0, 0.0])]);
        let model = SemanticModel::from_encoder(encoder);
        // "silent" is unknown to the table, so its embedding is all zeros.
        let scores = score(&model, &corpus(&["silent"]), "query").await;
        assert_eq!(scores, vec![0.0]);
    }

    #[tokio::test]
    async fn test_encoding_failure_yields_zeros() {
        let model = SemanticModel::from_encoder(Arc::new(FailingEncoder));
        let scores = score(&model, &corpus(&["a", "b", "c"]), "q").await;
        assert_eq!(scores, vec![0.0, 0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_vector_count_mismatch_yields_zeros() {
        let model = SemanticModel::from_encoder(Arc::new(MiscountingEncoder));
        let scores = score(&model, &corpus(&["a", "b"]), "q").await;
        assert_eq!(scores, vec![0.0, 0.0]);
    }

    #[test]
    fn test_cosine_identical_vectors() {
        assert!((cosine_similarity(&[1.0, 2.0], &[1.0, 2.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal_vectors() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_opposite_vectors() {
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_norm_guard() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_length_mismatch_is_zero() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }
}
