use std::str::FromStr;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::models::job::{JobRow, JobSource};

/// Creates and returns a SQLite connection pool, creating the database
/// file when it does not exist yet.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    info!("Opening SQLite database...");

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    info!("SQLite connection pool established");
    Ok(pool)
}

/// Creates the jobs table when missing. Same layout the seeding and
/// scraping tools that feed this corpus produce.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source TEXT NOT NULL,
            title TEXT NOT NULL,
            company TEXT,
            location TEXT,
            description TEXT,
            url TEXT,
            scraped_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Fetches the full corpus snapshot in stable id order. Matching aligns
/// every similarity vector to this ordering.
pub async fn fetch_jobs(pool: &SqlitePool) -> Result<Vec<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(
        "SELECT id, source, title, company, location, description, url, scraped_at
         FROM jobs ORDER BY id",
    )
    .fetch_all(pool)
    .await
}

pub async fn count_jobs(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
        .fetch_one(pool)
        .await
}

/// Demo corpus inserted on startup when the table is empty.
const SAMPLE_JOBS: &[(JobSource, &str, &str, &str, &str, &str)] = &[
    (
        JobSource::Indeed,
        "Machine Learning Engineer",
        "ABC Corp",
        "Bengaluru",
        "Develop machine learning models, Python, scikit-learn, PyTorch, model deployment",
        "https://in.indeed.com/viewjob?jk=abc1",
    ),
    (
        JobSource::Naukri,
        "Data Scientist",
        "XYZ Analytics",
        "Hyderabad",
        "Data analysis, statistics, Python, SQL, ML pipelines and dashboards",
        "https://www.naukri.com/example1",
    ),
    (
        JobSource::Linkedin,
        "Software Engineer - ML",
        "InnovateAI",
        "Remote",
        "Build ML infrastructure, model deployment, Docker, AWS, TensorFlow",
        "https://www.linkedin.com/jobs/view/example1",
    ),
    (
        JobSource::Indeed,
        "NLP Engineer",
        "LangTech",
        "Bengaluru",
        "NLP, transformers, huggingface, Python, tokenization",
        "https://in.indeed.com/viewjob?jk=abc2",
    ),
    (
        JobSource::Naukri,
        "Business Analyst",
        "MarketPulse",
        "Chennai",
        "Business analysis, SQL, Excel, data visualization, stakeholder communication",
        "https://www.naukri.com/example2",
    ),
    (
        JobSource::Linkedin,
        "DevOps Engineer",
        "CloudWorks",
        "Pune",
        "CI/CD, Docker, Kubernetes, monitoring, AWS",
        "https://www.linkedin.com/jobs/view/example2",
    ),
    (
        JobSource::Indeed,
        "AI Researcher",
        "DeepThink",
        "Remote",
        "Research on ML algorithms, Python, PyTorch, publications",
        "https://in.indeed.com/viewjob?jk=abc3",
    ),
    (
        JobSource::Naukri,
        "Software Developer",
        "NextGen Software",
        "Bengaluru",
        "Backend development, Java, Spring, REST APIs",
        "https://www.naukri.com/example3",
    ),
];

/// Inserts the sample postings. Returns the number of rows inserted.
pub async fn seed_sample_jobs(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
    let mut inserted = 0;
    for (source, title, company, location, description, url) in SAMPLE_JOBS {
        let result = sqlx::query(
            "INSERT INTO jobs (source, title, company, location, description, url)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(*source)
        .bind(*title)
        .bind(*company)
        .bind(*location)
        .bind(*description)
        .bind(*url)
        .execute(pool)
        .await?;
        inserted += result.rows_affected();
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    // A pooled in-memory database needs a single connection: every new
    // connection would otherwise see its own empty database.
    async fn test_pool() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        ensure_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_schema_starts_empty() {
        let pool = test_pool().await;
        assert_eq!(count_jobs(&pool).await.unwrap(), 0);
        assert!(fetch_jobs(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_seed_inserts_sample_corpus() {
        let pool = test_pool().await;
        let inserted = seed_sample_jobs(&pool).await.unwrap();
        assert_eq!(inserted, 8);
        assert_eq!(count_jobs(&pool).await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_fetch_jobs_preserves_insertion_order() {
        let pool = test_pool().await;
        seed_sample_jobs(&pool).await.unwrap();

        let jobs = fetch_jobs(&pool).await.unwrap();
        assert_eq!(jobs.len(), 8);
        assert_eq!(jobs[0].title, "Machine Learning Engineer");
        assert_eq!(jobs[0].source, JobSource::Indeed);
        assert_eq!(jobs[1].title, "Data Scientist");
        for pair in jobs.windows(2) {
            assert!(pair[0].id < pair[1].id);
        }
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let pool = test_pool().await;
        ensure_schema(&pool).await.unwrap();
        seed_sample_jobs(&pool).await.unwrap();
        ensure_schema(&pool).await.unwrap();
        assert_eq!(count_jobs(&pool).await.unwrap(), 8);
    }
}
