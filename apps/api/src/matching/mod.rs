// Hybrid matching engine.
// Implements: whitespace normalization, TF-IDF and embedding scorers,
// weighted score fusion, role suggestion, and top-K ranking.
// All encoder calls go through the embedding client; no direct HTTP here.

pub mod engine;
pub mod fusion;
pub mod handlers;
pub mod lexical;
pub mod normalize;
pub mod rank;
pub mod role;
pub mod semantic;

use thiserror::Error;

/// Why a scorer fell back to a zero signal. Collapsed to an all-zero
/// vector at the scorer's public boundary and logged; never surfaced to
/// callers. Partial signal loss must not abort a request.
#[derive(Debug, Error)]
pub(crate) enum DegradationReason {
    #[error("no usable terms in any document")]
    EmptyVocabulary,

    #[error("semantic model not configured")]
    ModelUnavailable,

    #[error("embedding request failed: {0}")]
    Encoding(String),

    #[error("encoder returned {got} vectors for {expected} texts")]
    VectorCountMismatch { expected: usize, got: usize },
}
