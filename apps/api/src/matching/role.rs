//! Best-fit role suggestion.
//!
//! Runs independently of score fusion, off the raw corpus titles. The two
//! code paths produce confidence values on different scales, so the scale
//! travels with the number.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::semantic::cosine_similarity;
use crate::embedding::SemanticModel;

/// Which scale a confidence value is expressed on. Cosine lives in
/// [-1, 1]; the fused fallback in [0, 1]. The two are not comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceScale {
    Cosine,
    FusedFraction,
}

/// Tagged confidence value; the tag travels with the number so callers
/// cannot conflate the two scales.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Confidence {
    /// Raw cosine similarity between the query and the winning title.
    Cosine(f32),
    /// Winning normalized fused score divided by 100.
    FusedFraction(f32),
}

impl Confidence {
    pub fn value(self) -> f32 {
        match self {
            Self::Cosine(value) | Self::FusedFraction(value) => value,
        }
    }

    pub fn scale(self) -> ConfidenceScale {
        match self {
            Self::Cosine(_) => ConfidenceScale::Cosine,
            Self::FusedFraction(_) => ConfidenceScale::FusedFraction,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleSuggestion {
    pub role: String,
    pub confidence: Confidence,
}

impl RoleSuggestion {
    /// The empty suggestion returned whenever suggestion fails. The rest
    /// of the match response is unaffected.
    pub fn none() -> Self {
        Self {
            role: String::new(),
            confidence: Confidence::FusedFraction(0.0),
        }
    }
}

/// Picks the best-fit role label for the query.
///
/// With the semantic capability, every corpus title is embedded and
/// compared against the query; without it, the fallback argmaxes the
/// already-normalized fused scores. Failures collapse to
/// `RoleSuggestion::none()`, never an error.
pub async fn suggest(
    model: &SemanticModel,
    titles: &[String],
    query: &str,
    normalized_scores: &[f32],
) -> RoleSuggestion {
    match model.encoder() {
        Some(encoder) => {
            let mut texts: Vec<String> = titles.to_vec();
            texts.push(query.to_string());

            let mut embeddings = match encoder.encode(&texts).await {
                Ok(vectors) if vectors.len() == texts.len() => vectors,
                Ok(vectors) => {
                    warn!(
                        "role suggestion degraded: encoder returned {} vectors for {} texts",
                        vectors.len(),
                        texts.len()
                    );
                    return RoleSuggestion::none();
                }
                Err(e) => {
                    warn!("role suggestion degraded: {e}");
                    return RoleSuggestion::none();
                }
            };

            let query_embedding = match embeddings.pop() {
                Some(vector) => vector,
                None => return RoleSuggestion::none(),
            };
            let similarities: Vec<f32> = embeddings
                .iter()
                .map(|title_embedding| cosine_similarity(&query_embedding, title_embedding))
                .collect();

            match stable_argmax(&similarities) {
                Some(best) => RoleSuggestion {
                    role: titles[best].clone(),
                    confidence: Confidence::Cosine(similarities[best]),
                },
                None => RoleSuggestion::none(),
            }
        }
        None => match stable_argmax(normalized_scores) {
            Some(best) if best < titles.len() => RoleSuggestion {
                role: titles[best].clone(),
                confidence: Confidence::FusedFraction(normalized_scores[best] / 100.0),
            },
            _ => RoleSuggestion::none(),
        },
    }
}

/// Index of the maximum value; the earliest index wins ties.
fn stable_argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some(current) if values[current] >= value => {}
            _ => best = Some(index),
        }
    }
    best
}
