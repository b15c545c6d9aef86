//! Final ranking and result assembly.

use serde::Serialize;

use crate::models::job::JobRow;

/// Largest number of results returned to the caller.
pub const MAX_RESULTS: usize = 10;
/// Description excerpt cap, in characters.
pub const SNIPPET_CHARS: usize = 400;

/// Ready-made search links for the posting title on the major boards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchUrls {
    pub linkedin: String,
    pub indeed: String,
    pub naukri: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedResult {
    pub job_id: i64,
    pub title: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub snippet: String,
    pub url: Option<String>,
    pub score: f32,
    pub search_urls: SearchUrls,
}

/// Orders the corpus by fused score, descending, and assembles the top
/// results. The sort is stable: equal scores keep their corpus order.
pub fn rank(jobs: &[JobRow], scores: &[f32]) -> Vec<RankedResult> {
    debug_assert_eq!(jobs.len(), scores.len());

    let mut order: Vec<usize> = (0..jobs.len().min(scores.len())).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order.truncate(MAX_RESULTS);

    order
        .into_iter()
        .map(|index| {
            let job = &jobs[index];
            RankedResult {
                job_id: job.id,
                title: job.title.clone(),
                company: job.company.clone(),
                location: job.location.clone(),
                snippet: excerpt(job.description.as_deref().unwrap_or_default()),
                url: job.url.clone(),
                score: round2(scores[index]),
                search_urls: search_urls(&job.title),
            }
        })
        .collect()
}

fn search_urls(title: &str) -> SearchUrls {
    let keyword = search_keyword(title);
    SearchUrls {
        linkedin: format!("https://www.linkedin.com/jobs/search/?keywords={keyword}"),
        indeed: format!("https://in.indeed.com/jobs?q={keyword}"),
        naukri: format!("https://www.naukri.com/{keyword}-jobs"),
    }
}

/// Form-style keyword: percent-encoded title with spaces as `+`.
fn search_keyword(title: &str) -> String {
    urlencoding::encode(title).replace("%20", "+")
}

/// Bounded-length prefix of the description, cut on a character boundary.
fn excerpt(description: &str) -> String {
    description.chars().take(SNIPPET_CHARS).collect()
}

fn round2(score: f32) -> f32 {
    (score * 100.0).round() / 100.0
}
