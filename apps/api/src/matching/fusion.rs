//! Weighted fusion of the lexical and semantic signals.

/// Weight of the semantic channel; it carries more signal when available.
pub const SEMANTIC_WEIGHT: f32 = 0.6;
/// Weight of the lexical channel.
pub const LEXICAL_WEIGHT: f32 = 0.4;
/// Keeps the min-max rescale finite when every score is identical.
const NORMALIZE_EPSILON: f32 = 1e-8;

/// Elementwise weighted combination. Both inputs align by index to the
/// same corpus snapshot. When the semantic signal is all-zero the result
/// is a 0.4-scaled lexical ranking, which the subsequent normalization
/// rescales relative to its own min and max.
pub fn fuse(lexical: &[f32], semantic: &[f32]) -> Vec<f32> {
    debug_assert_eq!(lexical.len(), semantic.len());
    lexical
        .iter()
        .zip(semantic.iter())
        .map(|(l, s)| SEMANTIC_WEIGHT * s + LEXICAL_WEIGHT * l)
        .collect()
}

/// Min-max rescale onto [0, 100]. When every score is identical the
/// epsilon keeps the division finite and everything maps to 0. An empty
/// input stays empty; the empty-corpus failure is detected upstream.
pub fn min_max_normalize(scores: &[f32]) -> Vec<f32> {
    if scores.is_empty() {
        return Vec::new();
    }

    let min = scores.iter().copied().fold(f32::INFINITY, f32::min);
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    scores
        .iter()
        .map(|score| 100.0 * (score - min) / (max - min + NORMALIZE_EPSILON))
        .collect()
}

pub fn fuse_and_normalize(lexical: &[f32], semantic: &[f32]) -> Vec<f32> {
    min_max_normalize(&fuse(lexical, semantic))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuse_weights_semantic_higher() {
        let fused = fuse(&[1.0], &[1.0]);
        assert!((fused[0] - 1.0).abs() < 1e-6);
        let lexical_only = fuse(&[1.0], &[0.0]);
        assert!((lexical_only[0] - LEXICAL_WEIGHT).abs() < 1e-6);
        let semantic_only = fuse(&[0.0], &[1.0]);
        assert!((semantic_only[0] - SEMANTIC_WEIGHT).abs() < 1e-6);
    }

    #[test]
    fn test_lexical_only_two_point_range_normalizes_to_full_scale() {
        // Semantic unavailable: [0.2, 0.8] fuses to [0.08, 0.32].
        let fused = fuse(&[0.2, 0.8], &[0.0, 0.0]);
        assert!((fused[0] - 0.08).abs() < 1e-6);
        assert!((fused[1] - 0.32).abs() < 1e-6);

        let normalized = min_max_normalize(&fused);
        assert_eq!(normalized[0], 0.0);
        assert!((normalized[1] - 100.0).abs() < 1e-3, "got {}", normalized[1]);
    }

    #[test]
    fn test_identical_scores_normalize_to_zero() {
        let normalized = min_max_normalize(&[0.5, 0.5, 0.5]);
        assert_eq!(normalized, vec![0.0, 0.0, 0.0]);
        for value in &normalized {
            assert!(value.is_finite());
        }
    }

    #[test]
    fn test_all_zero_scores_stay_finite() {
        let normalized = min_max_normalize(&[0.0, 0.0]);
        assert_eq!(normalized, vec![0.0, 0.0]);
    }

    #[test]
    fn test_empty_input_stays_empty() {
        assert!(min_max_normalize(&[]).is_empty());
        assert!(fuse_and_normalize(&[], &[]).is_empty());
    }

    #[test]
    fn test_normalized_values_bounded() {
        let normalized = min_max_normalize(&[0.1, 0.4, 0.2, 0.9, 0.9]);
        for value in &normalized {
            assert!((0.0..=100.0).contains(value), "out of range: {value}");
        }
        assert_eq!(normalized[0], 0.0);
    }

    #[test]
    fn test_fusion_preserves_lexical_order_when_semantic_absent() {
        let normalized = fuse_and_normalize(&[0.3, 0.1, 0.7], &[0.0, 0.0, 0.0]);
        assert!(normalized[2] > normalized[0]);
        assert!(normalized[0] > normalized[1]);
    }
}
