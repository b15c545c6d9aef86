//! The match pipeline: normalize, score, fuse, rank, suggest.

use serde::Serialize;
use tracing::warn;

use crate::embedding::SemanticModel;
use crate::errors::AppError;
use crate::matching::normalize::normalize;
use crate::matching::rank::RankedResult;
use crate::matching::role::ConfidenceScale;
use crate::matching::{fusion, lexical, rank, role, semantic};
use crate::models::job::JobRow;

/// Cap on the extracted-text preview echoed back to the caller.
const EXTRACTED_PREVIEW_CHARS: usize = 5000;

/// Everything a match request produces.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub suggested_role: String,
    pub suggested_confidence: f32,
    pub suggested_confidence_scale: ConfidenceScale,
    pub extracted_text: String,
    pub results: Vec<RankedResult>,
}

/// Runs the full pipeline for one request. The corpus snapshot ordering
/// is fixed for the duration; every similarity vector indexes against it.
///
/// An empty query and an empty corpus are the only hard failures.
/// Scorer-level problems degrade to zero signals inside their own branch
/// and the request still completes.
pub async fn match_resume(
    jobs: Vec<JobRow>,
    resume_text: &str,
    model: &SemanticModel,
) -> Result<MatchReport, AppError> {
    let resume = normalize(resume_text);
    if resume.is_empty() {
        return Err(AppError::EmptyResume);
    }
    if jobs.is_empty() {
        return Err(AppError::NoJobs);
    }

    let documents: Vec<String> = jobs.iter().map(combined_text).collect();
    let titles: Vec<String> = jobs.iter().map(|job| job.title.clone()).collect();

    // The scorers are independent pure computations over shared immutable
    // input: fan out, join before fusion. A failed branch is replaced by a
    // zero signal at the join, never propagated.
    let lexical_documents = documents.clone();
    let lexical_query = resume.clone();
    let lexical_task =
        tokio::task::spawn_blocking(move || lexical::score(&lexical_documents, &lexical_query));
    let (lexical_scores, semantic_scores) =
        tokio::join!(lexical_task, semantic::score(model, &documents, &resume));
    let lexical_scores = lexical_scores.unwrap_or_else(|e| {
        warn!("lexical scorer task failed: {e}");
        vec![0.0; documents.len()]
    });

    let normalized = fusion::fuse_and_normalize(&lexical_scores, &semantic_scores);

    let suggestion = role::suggest(model, &titles, &resume, &normalized).await;
    let results = rank::rank(&jobs, &normalized);

    Ok(MatchReport {
        suggested_role: suggestion.role,
        suggested_confidence: round3(suggestion.confidence.value()),
        suggested_confidence_scale: suggestion.confidence.scale(),
        extracted_text: resume.chars().take(EXTRACTED_PREVIEW_CHARS).collect(),
        results,
    })
}

/// Title, company, and description joined and normalized; the text each
/// posting is scored on.
fn combined_text(job: &JobRow) -> String {
    normalize(&format!(
        "{} {} {}",
        job.title,
        job.company.as_deref().unwrap_or_default(),
        job.description.as_deref().unwrap_or_default()
    ))
}

fn round3(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}
