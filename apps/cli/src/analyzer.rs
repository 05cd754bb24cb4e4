//! Candidate analysis pipeline.
//!
//! For one job: fetch applications, then per candidate fetch the person
//! record and attachments, extract text, assemble a profile, score it, and
//! accumulate the result. Candidates are processed strictly sequentially;
//! a failure in any one of them is logged and skipped so a single bad
//! record never aborts a multi-hundred-candidate batch.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::errors::AppError;
use crate::extract::{extract_text, text_preview, DEFAULT_PREVIEW_CHARS};
use crate::greenhouse::{date_part, Answer, Application, Candidate, Job, TalentSource};
use crate::report::{rank_by_score, safe_file_name, ReportGenerator, ReportPaths};
use crate::scorer::{CandidateScorer, Evaluation};

const CHECKPOINT_INTERVAL: usize = 10;
/// Notes shorter than this are treated as too thin to stand alone and a
/// description is synthesized from job metadata instead.
const MIN_NOTES_CHARS: usize = 100;
const OTHER_ATTACHMENT_EXCERPT_CHARS: usize = 1000;
const REQUIREMENT_TERMS: [&str; 4] = ["experience", "years", "certification", "skill"];

/// One evaluated candidate: application metadata merged with the scoring
/// output. The unit that is checkpointed, ranked and reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate_id: i64,
    pub application_id: i64,
    pub name: String,
    pub applied_at: String,
    pub status: String,
    pub current_stage: String,
    #[serde(flatten)]
    pub evaluation: Evaluation,
}

#[derive(Debug)]
pub struct AnalysisSummary {
    pub job_name: String,
    pub total_candidates: usize,
    pub analysis_time_minutes: f64,
    pub total_cost: f64,
    pub report_paths: ReportPaths,
    pub top_candidate: Option<ScoredCandidate>,
}

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub company_context: String,
    pub num_top_candidates: usize,
    pub save_progress: bool,
    pub limit: Option<usize>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            company_context: String::new(),
            num_top_candidates: 10,
            save_progress: true,
            limit: None,
        }
    }
}

#[derive(Debug, Default)]
struct AttachmentTexts {
    resume_text: String,
    cover_letter_text: String,
    other: Vec<OtherAttachment>,
}

#[derive(Debug)]
struct OtherAttachment {
    kind: String,
    filename: String,
    excerpt: String,
}

pub struct CandidateAnalyzer {
    source: Arc<dyn TalentSource>,
    scorer: Arc<dyn CandidateScorer>,
    reports: ReportGenerator,
    job_desc_cache: HashMap<i64, String>,
}

impl CandidateAnalyzer {
    pub fn new(
        source: Arc<dyn TalentSource>,
        scorer: Arc<dyn CandidateScorer>,
        reports: ReportGenerator,
    ) -> Self {
        Self {
            source,
            scorer,
            reports,
            job_desc_cache: HashMap::new(),
        }
    }

    /// Analyzes every candidate for a job and writes the ranked reports.
    pub async fn analyze_job(
        &mut self,
        job_id: i64,
        options: &AnalysisOptions,
    ) -> Result<AnalysisSummary, AppError> {
        let started = Instant::now();

        let job = self.source.job(job_id).await?;
        let job_name = job.name.clone();
        let job_description = self.job_description(&job).await;

        info!("Analyzing: {job_name}");
        info!("Job context: {} characters", job_description.len());

        let applications = self.source.applications(job_id, options.limit).await?;
        let total = applications.len();
        info!("Found {total} applications to analyze");

        let mut results: Vec<ScoredCandidate> = Vec::new();
        let mut total_cost = 0.0;

        for (index, application) in applications.iter().enumerate() {
            match self
                .process_application(application, &job_name, &job_description, &options.company_context)
                .await
            {
                Ok(scored) => {
                    total_cost += scored.evaluation.cost;
                    results.push(scored);
                    if options.save_progress && results.len() % CHECKPOINT_INTERVAL == 0 {
                        if let Err(e) = self.write_checkpoint(&job_name, &results) {
                            warn!("Checkpoint write failed: {e}");
                        }
                    }
                }
                Err(e) => {
                    error!(
                        "Error processing candidate {} (application {}): {e}",
                        application.candidate_id, application.id
                    );
                }
            }
            log_progress(index + 1, total, started.elapsed());
        }

        info!("Generating analysis report...");
        let analysis_time_minutes = started.elapsed().as_secs_f64() / 60.0;
        let report_paths = self.reports.generate(
            &results,
            &job_name,
            options.num_top_candidates,
            analysis_time_minutes,
            total_cost,
        )?;

        let top_candidate = rank_by_score(&results).into_iter().next();

        Ok(AnalysisSummary {
            job_name,
            total_candidates: results.len(),
            analysis_time_minutes,
            total_cost,
            report_paths,
            top_candidate,
        })
    }

    async fn process_application(
        &self,
        application: &Application,
        job_name: &str,
        job_description: &str,
        company_context: &str,
    ) -> Result<ScoredCandidate, AppError> {
        let candidate = self.source.candidate(application.candidate_id).await?;
        info!("  {}", candidate.full_name());

        info!("  Processing attachments...");
        let attachments = self.collect_attachments(application).await?;

        let profile = build_candidate_profile(application, &candidate, &attachments);
        debug!("Profile preview: {}", text_preview(&profile, DEFAULT_PREVIEW_CHARS));

        info!("  Scoring with AI...");
        let evaluation = self
            .scorer
            .score_candidate(job_name, job_description, &profile, company_context)
            .await;

        Ok(merge_result(application, &candidate, evaluation))
    }

    /// Downloads and extracts every attachment, classifying by declared
    /// type. First "resume" wins the resume slot, first "cover" the cover
    /// letter; the rest are kept as excerpts. A failed download fails the
    /// whole candidate (the caller skips and continues).
    async fn collect_attachments(
        &self,
        application: &Application,
    ) -> Result<AttachmentTexts, AppError> {
        let mut texts = AttachmentTexts::default();

        for attachment in &application.attachments {
            let content = self.source.download_attachment(&attachment.url).await?;
            let filename = attachment.filename.as_deref().unwrap_or("");
            let kind = attachment.kind.as_deref().unwrap_or("document");
            let text = extract_text(&content, filename);
            classify_attachment(&mut texts, kind, filename, text);
        }

        for other in &texts.other {
            debug!("Other attachment: {} ({})", other.filename, other.kind);
        }

        Ok(texts)
    }

    /// Resolves the job description: per-run cache, then a substantial
    /// `notes` field, then synthesis from metadata and a sampled
    /// application's requirement-like questions.
    async fn job_description(&mut self, job: &Job) -> String {
        if let Some(cached) = self.job_desc_cache.get(&job.id) {
            return cached.clone();
        }

        if let Some(notes) = notes_description(job) {
            return notes;
        }

        // Best effort; synthesis proceeds without the sample on any failure.
        let sample_answers = match self.source.applications(job.id, Some(1)).await {
            Ok(applications) => applications
                .into_iter()
                .next()
                .map(|application| application.answers)
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        };

        let description = synthesize_job_description(job, &sample_answers);
        self.job_desc_cache.insert(job.id, description.clone());
        description
    }

    fn write_checkpoint(
        &self,
        job_name: &str,
        results: &[ScoredCandidate],
    ) -> Result<PathBuf, AppError> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let filename = format!(
            "progress_{}_{}_{timestamp}.json",
            safe_file_name(job_name),
            results.len()
        );
        std::fs::create_dir_all(self.reports.output_dir())?;
        let path = self.reports.output_dir().join(filename);

        let snapshot = serde_json::json!({
            "job_name": job_name,
            "progress_count": results.len(),
            "timestamp": timestamp,
            "results": results,
        });
        std::fs::write(&path, serde_json::to_string_pretty(&snapshot)?)?;

        info!("Progress saved: {}", path.display());
        Ok(path)
    }
}

fn log_progress(processed: usize, total: usize, elapsed: Duration) {
    if total == 0 {
        return;
    }
    let percent = processed as f64 / total as f64 * 100.0;
    let rate = processed as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
    let eta_minutes = (total - processed) as f64 / rate / 60.0;
    info!("Candidate {processed}/{total} ({percent:.1}%), ETA {eta_minutes:.1} minutes");
}

fn classify_attachment(texts: &mut AttachmentTexts, kind: &str, filename: &str, text: String) {
    let kind_lower = kind.to_lowercase();
    if kind_lower.contains("resume") {
        if texts.resume_text.is_empty() {
            texts.resume_text = text;
        }
    } else if kind_lower.contains("cover") {
        if texts.cover_letter_text.is_empty() {
            texts.cover_letter_text = text;
        }
    } else {
        texts.other.push(OtherAttachment {
            kind: kind.to_string(),
            filename: filename.to_string(),
            excerpt: text.chars().take(OTHER_ATTACHMENT_EXCERPT_CHARS).collect(),
        });
    }
}

fn build_candidate_profile(
    application: &Application,
    candidate: &Candidate,
    attachments: &AttachmentTexts,
) -> String {
    let mut answers = Vec::new();
    for answer in &application.answers {
        if let Some(response) = answer.answer.as_deref().filter(|r| !r.is_empty()) {
            answers.push(format!(
                "{}: {response}",
                answer.question.as_deref().unwrap_or("")
            ));
        }
    }
    let responses = if answers.is_empty() {
        "No responses provided".to_string()
    } else {
        answers.join("\n")
    };

    let resume = if attachments.resume_text.is_empty() {
        "[No resume available]"
    } else {
        &attachments.resume_text
    };
    let cover_letter = if attachments.cover_letter_text.is_empty() {
        "[No cover letter]"
    } else {
        &attachments.cover_letter_text
    };

    format!(
        "\nCANDIDATE: {}\nEMAIL: {}\nAPPLIED: {}\n\n\
         APPLICATION RESPONSES:\n{responses}\n\n\
         RESUME:\n{resume}\n\n\
         COVER LETTER:\n{cover_letter}\n",
        candidate.full_name(),
        candidate.primary_email(),
        date_part(application.applied_at.as_deref().unwrap_or("N/A")),
    )
}

fn merge_result(
    application: &Application,
    candidate: &Candidate,
    evaluation: Evaluation,
) -> ScoredCandidate {
    ScoredCandidate {
        candidate_id: candidate.id,
        application_id: application.id,
        name: candidate.full_name(),
        applied_at: application.applied_at.clone().unwrap_or_default(),
        status: application
            .status
            .clone()
            .filter(|status| !status.is_empty())
            .unwrap_or_else(|| "active".to_string()),
        current_stage: application
            .current_stage
            .as_ref()
            .and_then(|stage| stage.name.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        evaluation,
    }
}

fn notes_description(job: &Job) -> Option<String> {
    job.notes
        .as_deref()
        .filter(|notes| notes.len() > MIN_NOTES_CHARS)
        .map(str::to_string)
}

/// Builds a description from job metadata when no usable notes exist:
/// name, department, location, custom fields, and any requirement-like
/// questions sampled from one application.
fn synthesize_job_description(job: &Job, sample_answers: &[Answer]) -> String {
    let mut parts = vec![format!("Position: {}\n", job.name)];

    if let Some(name) = job
        .departments
        .as_ref()
        .and_then(|departments| departments.first())
        .and_then(|department| department.name.as_deref())
    {
        parts.push(format!("Department: {name}"));
    }
    if let Some(name) = job
        .offices
        .as_ref()
        .and_then(|offices| offices.first())
        .and_then(|office| office.name.as_deref())
    {
        parts.push(format!("Location: {name}"));
    }

    if let Some(fields) = &job.keyed_custom_fields {
        if !fields.is_empty() {
            parts.push("\nJob Details:".to_string());
            for (field, value) in fields {
                if value.is_null() || value.as_str().is_some_and(str::is_empty) {
                    continue;
                }
                let field_name = title_case(field);
                match value {
                    Value::Object(map) if map.contains_key("value") => {
                        let amount = map.get("value").map(render_value).unwrap_or_default();
                        let unit = map.get("unit").map(render_value).unwrap_or_default();
                        parts.push(format!("- {field_name}: ${amount} {unit}"));
                    }
                    other => parts.push(format!("- {field_name}: {}", render_value(other))),
                }
            }
        }
    }

    let requirements: Vec<String> = sample_answers
        .iter()
        .filter_map(|answer| answer.question.as_deref())
        .filter(|question| {
            let question = question.to_lowercase();
            REQUIREMENT_TERMS.iter().any(|term| question.contains(term))
        })
        .map(|question| format!("- {question}"))
        .collect();
    if !requirements.is_empty() {
        parts.push("\nRequirements (from application):".to_string());
        parts.extend(requirements);
    }

    parts.join("\n")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// `annual_salary` -> `Annual Salary`.
fn title_case(field: &str) -> String {
    field
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::EMPTY_FILE_MARKER;
    use crate::greenhouse::GreenhouseError;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::collections::HashSet;

    fn application_json(id: i64, candidate_id: i64, attachments: &str) -> Application {
        serde_json::from_str(&format!(
            r#"{{"id": {id}, "candidate_id": {candidate_id},
                "applied_at": "2025-02-01T09:00:00.000Z", "status": "active",
                "current_stage": {{"name": "Screen"}}, "answers": [],
                "attachments": {attachments}}}"#
        ))
        .unwrap()
    }

    fn candidate_json(id: i64, first: &str) -> Candidate {
        serde_json::from_str(&format!(
            r#"{{"id": {id}, "first_name": "{first}", "last_name": "Doe",
                "email_addresses": [{{"value": "{first}@example.com"}}]}}"#
        ))
        .unwrap()
    }

    fn job_json(extra: &str) -> Job {
        serde_json::from_str(&format!(r#"{{"id": 1, "name": "Backend Engineer"{extra}}}"#))
            .unwrap()
    }

    struct StubSource {
        job: Job,
        applications: Vec<Application>,
        candidates: Vec<Candidate>,
        failing_urls: HashSet<String>,
    }

    #[async_trait]
    impl TalentSource for StubSource {
        async fn job(&self, _job_id: i64) -> Result<Job, GreenhouseError> {
            Ok(self.job.clone())
        }

        async fn applications(
            &self,
            _job_id: i64,
            limit: Option<usize>,
        ) -> Result<Vec<Application>, GreenhouseError> {
            let mut applications = self.applications.clone();
            if let Some(cap) = limit {
                applications.truncate(cap);
            }
            Ok(applications)
        }

        async fn candidate(&self, candidate_id: i64) -> Result<Candidate, GreenhouseError> {
            self.candidates
                .iter()
                .find(|candidate| candidate.id == candidate_id)
                .cloned()
                .ok_or(GreenhouseError::Api {
                    status: 404,
                    reason: "Not Found".to_string(),
                })
        }

        async fn download_attachment(&self, url: &str) -> Result<Bytes, GreenhouseError> {
            if self.failing_urls.contains(url) {
                return Err(GreenhouseError::Api {
                    status: 500,
                    reason: "Internal Server Error".to_string(),
                });
            }
            Ok(Bytes::from_static(b"plain resume text"))
        }
    }

    struct StubScorer;

    #[async_trait]
    impl CandidateScorer for StubScorer {
        async fn score_candidate(&self, _: &str, _: &str, _: &str, _: &str) -> Evaluation {
            Evaluation {
                score: 75,
                summary: "stub".to_string(),
                key_strengths: Vec::new(),
                concerns: Vec::new(),
                hire_recommendation: "Yes".to_string(),
                notable_achievements: Vec::new(),
                culture_fit: String::new(),
                data_quality: String::new(),
                error: false,
                cost: 0.01,
            }
        }
    }

    fn analyzer_with(source: StubSource, dir: &std::path::Path) -> CandidateAnalyzer {
        CandidateAnalyzer::new(
            Arc::new(source),
            Arc::new(StubScorer),
            ReportGenerator::new(dir.to_path_buf()),
        )
    }

    #[tokio::test]
    async fn test_failed_download_skips_only_that_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let attachments =
            r#"[{"url": "https://s3/resume", "filename": "cv.txt", "type": "resume"}]"#;
        let broken = r#"[{"url": "https://s3/broken", "filename": "cv.txt", "type": "resume"}]"#;
        let source = StubSource {
            job: job_json(""),
            applications: vec![
                application_json(11, 1, attachments),
                application_json(12, 2, broken),
                application_json(13, 3, attachments),
            ],
            candidates: vec![
                candidate_json(1, "Ada"),
                candidate_json(2, "Bob"),
                candidate_json(3, "Eve"),
            ],
            failing_urls: HashSet::from(["https://s3/broken".to_string()]),
        };

        let mut analyzer = analyzer_with(source, dir.path());
        let summary = analyzer
            .analyze_job(1, &AnalysisOptions { save_progress: false, ..Default::default() })
            .await
            .unwrap();

        assert_eq!(summary.total_candidates, 2);
        let top = summary.top_candidate.unwrap();
        assert!(["Ada Doe", "Eve Doe"].contains(&top.name.as_str()));
        assert!((summary.total_cost - 0.02).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_missing_candidate_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let source = StubSource {
            job: job_json(""),
            applications: vec![application_json(11, 1, "[]"), application_json(12, 99, "[]")],
            candidates: vec![candidate_json(1, "Ada")],
            failing_urls: HashSet::new(),
        };

        let mut analyzer = analyzer_with(source, dir.path());
        let summary = analyzer
            .analyze_job(1, &AnalysisOptions { save_progress: false, ..Default::default() })
            .await
            .unwrap();

        assert_eq!(summary.total_candidates, 1);
    }

    #[tokio::test]
    async fn test_checkpoint_written_every_tenth_result() {
        let dir = tempfile::tempdir().unwrap();
        let applications = (0..10)
            .map(|i| application_json(100 + i, i, "[]"))
            .collect::<Vec<_>>();
        let candidates = (0..10).map(|i| candidate_json(i, "Ada")).collect();
        let source = StubSource {
            job: job_json(""),
            applications,
            candidates,
            failing_urls: HashSet::new(),
        };

        let mut analyzer = analyzer_with(source, dir.path());
        analyzer
            .analyze_job(1, &AnalysisOptions::default())
            .await
            .unwrap();

        let checkpoints: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with("progress_Backend_Engineer_10_")
            })
            .collect();
        assert_eq!(checkpoints.len(), 1);

        let text = std::fs::read_to_string(checkpoints[0].path()).unwrap();
        let snapshot: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(snapshot["progress_count"], 10);
        assert_eq!(snapshot["results"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_long_notes_used_verbatim_as_description() {
        let notes = "n".repeat(150);
        let dir = tempfile::tempdir().unwrap();
        let source = StubSource {
            job: job_json(&format!(r#", "notes": "{notes}""#)),
            applications: Vec::new(),
            candidates: Vec::new(),
            failing_urls: HashSet::new(),
        };
        let job = source.job.clone();

        let mut analyzer = analyzer_with(source, dir.path());
        assert_eq!(analyzer.job_description(&job).await, notes);
    }

    #[tokio::test]
    async fn test_description_cache_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let source = StubSource {
            job: job_json(""),
            applications: Vec::new(),
            candidates: Vec::new(),
            failing_urls: HashSet::new(),
        };
        let job = source.job.clone();

        let mut analyzer = analyzer_with(source, dir.path());
        let first = analyzer.job_description(&job).await;
        analyzer.job_desc_cache.insert(job.id, "cached".to_string());
        assert_ne!(first, "cached");
        assert_eq!(analyzer.job_description(&job).await, "cached");
    }

    #[test]
    fn test_short_notes_are_rejected() {
        assert!(notes_description(&job_json(r#", "notes": "too short""#)).is_none());
        let long = "x".repeat(101);
        assert_eq!(
            notes_description(&job_json(&format!(r#", "notes": "{long}""#))).as_deref(),
            Some(long.as_str())
        );
    }

    #[test]
    fn test_synthesized_description_renders_money_fields() {
        let job = job_json(
            r#", "departments": [{"name": "Engineering"}],
                "offices": [{"name": "Berlin"}],
                "keyed_custom_fields": {
                    "annual_salary": {"value": 120000, "unit": "USD"},
                    "employment_type": "Full-time",
                    "ignored": null
                }"#,
        );
        let description = synthesize_job_description(&job, &[]);

        assert!(description.starts_with("Position: Backend Engineer\n"));
        assert!(description.contains("Department: Engineering"));
        assert!(description.contains("Location: Berlin"));
        assert!(description.contains("$120000 USD"), "got: {description}");
        assert!(description.contains("- Annual Salary:"));
        assert!(description.contains("- Employment Type: Full-time"));
        assert!(!description.contains("Ignored"));
    }

    #[test]
    fn test_synthesized_description_samples_requirement_questions() {
        let answers: Vec<Answer> = serde_json::from_str(
            r#"[{"question": "Years of Rust experience?", "answer": "5"},
                {"question": "Favorite color?", "answer": "blue"},
                {"question": "Do you hold a certification?", "answer": "yes"}]"#,
        )
        .unwrap();
        let description = synthesize_job_description(&job_json(""), &answers);

        assert!(description.contains("Requirements (from application):"));
        assert!(description.contains("- Years of Rust experience?"));
        assert!(description.contains("- Do you hold a certification?"));
        assert!(!description.contains("Favorite color?"));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("annual_salary"), "Annual Salary");
        assert_eq!(title_case("SALARY_range"), "Salary Range");
        assert_eq!(title_case("one"), "One");
    }

    #[test]
    fn test_classification_first_wins() {
        let mut texts = AttachmentTexts::default();
        classify_attachment(&mut texts, "resume", "a.txt", "first resume".to_string());
        classify_attachment(&mut texts, "Resume", "b.txt", "second resume".to_string());
        classify_attachment(&mut texts, "cover_letter", "c.txt", "cover".to_string());
        classify_attachment(&mut texts, "transcript", "d.txt", "x".repeat(1500));

        assert_eq!(texts.resume_text, "first resume");
        assert_eq!(texts.cover_letter_text, "cover");
        assert_eq!(texts.other.len(), 1);
        assert_eq!(texts.other[0].excerpt.chars().count(), 1000);
    }

    #[test]
    fn test_profile_contains_answers_and_attachment_blocks() {
        let application: Application = serde_json::from_str(
            r#"{"id": 11, "candidate_id": 1, "applied_at": "2025-02-01T09:00:00.000Z",
                "answers": [
                    {"question": "Why here?", "answer": "Because."},
                    {"question": "Skipped?", "answer": ""},
                    {"question": "Also skipped?", "answer": null}
                ]}"#,
        )
        .unwrap();
        let candidate = candidate_json(1, "Ada");
        let texts = AttachmentTexts {
            resume_text: "RESUME BODY".to_string(),
            cover_letter_text: String::new(),
            other: Vec::new(),
        };

        let profile = build_candidate_profile(&application, &candidate, &texts);

        assert!(profile.contains("CANDIDATE: Ada Doe"));
        assert!(profile.contains("EMAIL: Ada@example.com"));
        assert!(profile.contains("APPLIED: 2025-02-01"));
        assert!(profile.contains("Why here?: Because."));
        assert!(!profile.contains("Skipped?"));
        assert!(profile.contains("RESUME:\nRESUME BODY"));
        assert!(profile.contains("COVER LETTER:\n[No cover letter]"));
    }

    #[test]
    fn test_profile_without_answers_or_attachments_uses_placeholders() {
        let application = application_json(11, 1, "[]");
        let profile =
            build_candidate_profile(&application, &candidate_json(1, "Ada"), &AttachmentTexts::default());

        assert!(profile.contains("APPLICATION RESPONSES:\nNo responses provided"));
        assert!(profile.contains("RESUME:\n[No resume available]"));
    }

    #[test]
    fn test_empty_resume_attachment_surfaces_empty_file_marker() {
        let mut texts = AttachmentTexts::default();
        classify_attachment(&mut texts, "resume", "cv.pdf", extract_text(&[], "cv.pdf"));

        let profile = build_candidate_profile(
            &application_json(11, 1, "[]"),
            &candidate_json(1, "Ada"),
            &texts,
        );
        assert!(profile.contains(&format!("RESUME:\n{EMPTY_FILE_MARKER}")));
    }

    #[test]
    fn test_merge_result_defaults_status_and_stage() {
        let application: Application =
            serde_json::from_str(r#"{"id": 11, "candidate_id": 1, "status": ""}"#).unwrap();
        let merged = merge_result(&application, &candidate_json(1, "Ada"), Evaluation::failed());

        assert_eq!(merged.status, "active");
        assert_eq!(merged.current_stage, "Unknown");
        assert_eq!(merged.applied_at, "");
        assert_eq!(merged.candidate_id, 1);
        assert_eq!(merged.application_id, 11);
    }
}
