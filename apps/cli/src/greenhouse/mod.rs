//! Greenhouse Harvest API client.
//!
//! Authenticated, paginated read access to jobs, applications, candidates
//! and attachment bytes. Rate limiting (429) is absorbed here with a fixed
//! 60-second backoff; permission failures surface immediately with the
//! endpoint that was denied.

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod models;

pub use models::{Answer, Application, Attachment, Candidate, Job, JobSummary};

const BASE_URL: &str = "https://harvest.greenhouse.io/v1";
const PAGE_SIZE: u32 = 100;
const RATE_LIMIT_WAIT_SECS: u64 = 60;
/// Bounded replacement for retrying forever under sustained rate limiting.
const RATE_LIMIT_MAX_RETRIES: u32 = 5;

#[derive(Debug, Error)]
pub enum GreenhouseError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("permission denied; check API key permissions for: {endpoint}")]
    Permission { endpoint: String },

    #[error("API error {status}: {reason}")]
    Api { status: u16, reason: String },

    #[error("still rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}

/// Read-side contract the analysis pipeline needs from the tracking system.
/// Implemented by `GreenhouseClient` and by in-test stubs.
#[async_trait]
pub trait TalentSource: Send + Sync {
    async fn job(&self, job_id: i64) -> Result<Job, GreenhouseError>;

    async fn applications(
        &self,
        job_id: i64,
        limit: Option<usize>,
    ) -> Result<Vec<Application>, GreenhouseError>;

    async fn candidate(&self, candidate_id: i64) -> Result<Candidate, GreenhouseError>;

    async fn download_attachment(&self, url: &str) -> Result<Bytes, GreenhouseError>;
}

pub struct GreenhouseClient {
    http: reqwest::Client,
    api_key: String,
}

impl GreenhouseClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Authenticated GET returning deserialized JSON. Sleeps 60 s and
    /// retries on 429, up to `RATE_LIMIT_MAX_RETRIES` attempts.
    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, GreenhouseError> {
        let url = format!("{BASE_URL}/{endpoint}");

        for _ in 0..=RATE_LIMIT_MAX_RETRIES {
            let response = self
                .http
                .get(&url)
                .basic_auth(&self.api_key, Some(""))
                .send()
                .await?;

            let status = response.status();

            if status.as_u16() == 429 {
                warn!("Rate limited, waiting {RATE_LIMIT_WAIT_SECS} seconds...");
                tokio::time::sleep(std::time::Duration::from_secs(RATE_LIMIT_WAIT_SECS)).await;
                continue;
            }

            if status.as_u16() == 403 {
                return Err(GreenhouseError::Permission {
                    endpoint: endpoint.to_string(),
                });
            }

            if !status.is_success() {
                return Err(GreenhouseError::Api {
                    status: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or("unknown").to_string(),
                });
            }

            return Ok(response.json::<T>().await?);
        }

        Err(GreenhouseError::RateLimited {
            retries: RATE_LIMIT_MAX_RETRIES,
        })
    }

    /// Every job that has at least one application, newest first.
    ///
    /// Each job is probed with a 1-item applications request; jobs whose
    /// probe fails or returns nothing are skipped silently. A failing jobs
    /// page ends the scan with whatever was gathered so far.
    pub async fn jobs_with_applications(&self) -> Result<Vec<JobSummary>, GreenhouseError> {
        let mut summaries = Vec::new();
        let mut page = 1u32;

        info!("Fetching available jobs...");

        loop {
            let endpoint = format!("jobs?per_page={PAGE_SIZE}&page={page}");
            let jobs: Vec<Job> = match self.get_json(&endpoint).await {
                Ok(jobs) => jobs,
                Err(e) => {
                    warn!("Stopping job scan at page {page}: {e}");
                    break;
                }
            };
            if jobs.is_empty() {
                break;
            }

            for job in &jobs {
                let probe_endpoint = format!("applications?job_id={}&per_page=1", job.id);
                let probe: Vec<Application> = match self.get_json(&probe_endpoint).await {
                    Ok(applications) => applications,
                    Err(e) => {
                        debug!("Skipping job {}: application probe failed: {e}", job.id);
                        continue;
                    }
                };
                if probe.is_empty() {
                    continue;
                }
                if let Some(summary) = summarize_job(job, probe.len()) {
                    summaries.push(summary);
                }
            }

            page += 1;
        }

        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }
}

/// Builds a listing row for a job known to have applications.
///
/// Department policy: an absent `departments` key defaults to "N/A"; a
/// present-but-empty list excludes the job from the listing entirely.
fn summarize_job(job: &Job, application_count: usize) -> Option<JobSummary> {
    let department = match &job.departments {
        None => "N/A".to_string(),
        Some(departments) if departments.is_empty() => return None,
        Some(departments) => departments[0]
            .name
            .clone()
            .unwrap_or_else(|| "N/A".to_string()),
    };

    Some(JobSummary {
        id: job.id,
        name: job.name.clone(),
        status: job.status.clone(),
        department,
        created_at: date_part(job.created_at.as_deref().unwrap_or("")),
        application_count,
    })
}

/// First 10 characters: the YYYY-MM-DD prefix of an ISO timestamp.
pub fn date_part(timestamp: &str) -> String {
    timestamp.chars().take(10).collect()
}

#[async_trait]
impl TalentSource for GreenhouseClient {
    async fn job(&self, job_id: i64) -> Result<Job, GreenhouseError> {
        self.get_json(&format!("jobs/{job_id}")).await
    }

    /// All applications for a job. A failing page logs a warning and returns
    /// the partial list, except permission failures, which surface so the
    /// caller learns which credential scope is missing. Stops early at
    /// `limit`, returning exactly the capped prefix.
    async fn applications(
        &self,
        job_id: i64,
        limit: Option<usize>,
    ) -> Result<Vec<Application>, GreenhouseError> {
        let mut applications = Vec::new();
        let mut page = 1u32;

        loop {
            let endpoint = format!("applications?job_id={job_id}&per_page={PAGE_SIZE}&page={page}");
            let batch: Vec<Application> = match self.get_json(&endpoint).await {
                Ok(batch) => batch,
                Err(e @ GreenhouseError::Permission { .. }) => return Err(e),
                Err(e) => {
                    warn!("Error fetching applications page {page}: {e}");
                    break;
                }
            };
            if batch.is_empty() {
                break;
            }

            applications.extend(batch);

            if let Some(cap) = limit {
                if applications.len() >= cap {
                    applications.truncate(cap);
                    return Ok(applications);
                }
            }

            page += 1;
        }

        Ok(applications)
    }

    async fn candidate(&self, candidate_id: i64) -> Result<Candidate, GreenhouseError> {
        self.get_json(&format!("candidates/{candidate_id}")).await
    }

    /// Attachment URLs are pre-signed, so no Authorization header here.
    async fn download_attachment(&self, url: &str) -> Result<Bytes, GreenhouseError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GreenhouseError::Api {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }
        Ok(response.bytes().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_json(departments: &str) -> Job {
        let json = format!(
            r#"{{"id": 42, "name": "Platform Engineer", "status": "open",
                "created_at": "2025-03-01T12:30:00.000Z"{departments}}}"#
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_summarize_job_defaults_missing_departments_to_na() {
        let job = job_json("");
        let summary = summarize_job(&job, 1).unwrap();
        assert_eq!(summary.department, "N/A");
        assert_eq!(summary.created_at, "2025-03-01");
        assert_eq!(summary.application_count, 1);
    }

    #[test]
    fn test_summarize_job_skips_empty_department_list() {
        let job = job_json(r#", "departments": []"#);
        assert!(summarize_job(&job, 1).is_none());
    }

    #[test]
    fn test_summarize_job_uses_first_department_name() {
        let job = job_json(r#", "departments": [{"name": "Infrastructure"}, {"name": "Other"}]"#);
        assert_eq!(summarize_job(&job, 1).unwrap().department, "Infrastructure");
    }

    #[test]
    fn test_summarize_job_unnamed_department_defaults_to_na() {
        let job = job_json(r#", "departments": [{"name": null}]"#);
        assert_eq!(summarize_job(&job, 1).unwrap().department, "N/A");
    }

    #[test]
    fn test_date_part_truncates_iso_timestamps() {
        assert_eq!(date_part("2025-03-01T12:30:00.000Z"), "2025-03-01");
        assert_eq!(date_part("N/A"), "N/A");
        assert_eq!(date_part(""), "");
    }
}
