//! Report generation: ranked narrative markdown, top-N CSV, a full JSON
//! dump, and a short text summary, all written to a timestamped folder.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde_json::json;
use tracing::info;

use crate::analyzer::ScoredCandidate;
use crate::errors::AppError;

/// Rejected candidates scoring at or above this are "hidden gems".
pub const HIDDEN_GEM_MIN_SCORE: u32 = 70;
/// Narrative cap for the hidden-gems listing; the full count is always shown.
const HIDDEN_GEM_DISPLAY_CAP: usize = 10;
const QUICK_SUMMARY_TOP: usize = 5;

const SCORE_BANDS: [(&str, u32, u32); 6] = [
    ("90-100", 90, 100),
    ("80-89", 80, 89),
    ("70-79", 70, 79),
    ("60-69", 60, 69),
    ("50-59", 50, 59),
    ("Below 50", 0, 49),
];

#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub markdown: PathBuf,
    pub csv: PathBuf,
    pub json: PathBuf,
    pub summary: PathBuf,
    pub output_folder: PathBuf,
}

pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes all four artifacts for a finished run and logs a preview of
    /// the top candidates.
    pub fn generate(
        &self,
        results: &[ScoredCandidate],
        job_name: &str,
        num_top: usize,
        total_time_minutes: f64,
        total_cost: f64,
    ) -> Result<ReportPaths, AppError> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let job_folder = self
            .output_dir
            .join(format!("{}_{timestamp}", safe_file_name(job_name)));
        fs::create_dir_all(&job_folder)?;

        let ranked = rank_by_score(results);

        let markdown = job_folder.join("Full_Report.md");
        fs::write(
            &markdown,
            render_markdown(&ranked, job_name, num_top, total_time_minutes, total_cost),
        )?;

        let csv = job_folder.join("Top_Candidates.csv");
        write_csv(&csv, &ranked, num_top)?;

        let json_path = job_folder.join("full_results.json");
        let dump = json!({
            "job_name": job_name,
            "analysis_date": Local::now().to_rfc3339(),
            "total_candidates": results.len(),
            "total_time_minutes": total_time_minutes,
            "total_cost_usd": total_cost,
            "results": results,
        });
        fs::write(&json_path, serde_json::to_string_pretty(&dump)?)?;

        let summary = job_folder.join("QUICK_SUMMARY.txt");
        fs::write(
            &summary,
            render_quick_summary(&ranked, job_name, total_time_minutes, total_cost),
        )?;

        info!("Reports saved to: {}", job_folder.display());
        for (rank, candidate) in ranked.iter().take(QUICK_SUMMARY_TOP).enumerate() {
            info!(
                "{}. {} - Score: {}/100 - {}",
                rank + 1,
                candidate.name,
                candidate.evaluation.score,
                greenhouse_link(candidate.candidate_id, candidate.application_id)
            );
        }

        Ok(ReportPaths {
            markdown,
            csv,
            json: json_path,
            summary,
            output_folder: job_folder,
        })
    }
}

/// Stable descending sort by score; equal scores keep processing order.
pub fn rank_by_score(results: &[ScoredCandidate]) -> Vec<ScoredCandidate> {
    let mut ranked = results.to_vec();
    ranked.sort_by(|a, b| b.evaluation.score.cmp(&a.evaluation.score));
    ranked
}

/// Rejected candidates with a score of at least `HIDDEN_GEM_MIN_SCORE`.
pub fn hidden_gems(ranked: &[ScoredCandidate]) -> Vec<&ScoredCandidate> {
    ranked
        .iter()
        .filter(|c| c.status == "rejected" && c.evaluation.score >= HIDDEN_GEM_MIN_SCORE)
        .collect()
}

/// Deep link to the candidate profile, or a placeholder when either id is
/// missing.
pub fn greenhouse_link(candidate_id: i64, application_id: i64) -> String {
    if candidate_id > 0 && application_id > 0 {
        format!("https://app8.greenhouse.io/people/{candidate_id}/applications/{application_id}")
    } else {
        "No link available".to_string()
    }
}

pub fn safe_file_name(name: &str) -> String {
    name.replace([' ', '/'], "_")
}

fn score_distribution(results: &[ScoredCandidate]) -> Vec<(&'static str, usize)> {
    SCORE_BANDS
        .iter()
        .map(|(label, low, high)| {
            let count = results
                .iter()
                .filter(|c| c.evaluation.score >= *low && c.evaluation.score <= *high)
                .count();
            (*label, count)
        })
        .collect()
}

fn render_markdown(
    ranked: &[ScoredCandidate],
    job_name: &str,
    num_top: usize,
    total_time_minutes: f64,
    total_cost: f64,
) -> String {
    let mut report = format!(
        "# Candidate Analysis Report: {job_name}\n\n\
         **Generated**: {}  \n\
         **Total Candidates Analyzed**: {}  \n\
         **Analysis Time**: {total_time_minutes:.1} minutes  \n\
         **Total Cost**: ${total_cost:.2}\n\n\
         ---\n\n\
         ## Score Distribution\n\n",
        Local::now().format("%B %d, %Y at %I:%M %p"),
        ranked.len(),
    );

    for (label, count) in score_distribution(ranked) {
        if count > 0 {
            let _ = writeln!(report, "- **{label}**: {count} candidates");
        }
    }

    let _ = write!(report, "\n---\n\n## Top {num_top} Candidates\n\n");

    for (rank, candidate) in ranked.iter().take(num_top).enumerate() {
        let link = greenhouse_link(candidate.candidate_id, candidate.application_id);
        let _ = write!(
            report,
            "### {}. {} - Score: {}/100\n\n\
             **[View in Greenhouse]({link})**  \n\
             **Applied**: {} | **Status**: {} | **Stage**: {}\n\n\
             **Executive Summary**: {}\n\n\
             **Key Strengths**:\n",
            rank + 1,
            candidate.name,
            candidate.evaluation.score,
            crate::greenhouse::date_part(&candidate.applied_at),
            candidate.status,
            candidate.current_stage,
            candidate.evaluation.summary,
        );
        for strength in &candidate.evaluation.key_strengths {
            let _ = writeln!(report, "- {strength}");
        }

        if !candidate.evaluation.notable_achievements.is_empty() {
            report.push_str("\n**Notable Achievements**:\n");
            for achievement in &candidate.evaluation.notable_achievements {
                let _ = writeln!(report, "- {achievement}");
            }
        }

        let _ = writeln!(report, "\n**Culture Fit**: {}", candidate.evaluation.culture_fit);

        if !candidate.evaluation.concerns.is_empty() {
            report.push_str("\n**Potential Concerns**:\n");
            for concern in &candidate.evaluation.concerns {
                let _ = writeln!(report, "- {concern}");
            }
        }

        let _ = write!(
            report,
            "\n**Hiring Recommendation**: {}\n\n**Data Quality**: {}\n\n---\n\n",
            candidate.evaluation.hire_recommendation, candidate.evaluation.data_quality,
        );
    }

    let gems = hidden_gems(ranked);
    if !gems.is_empty() {
        let _ = write!(
            report,
            "## Hidden Gems (High-Scoring Rejected Candidates)\n\n\
             Found **{}** previously rejected candidates with scores >= {HIDDEN_GEM_MIN_SCORE}:\n\n",
            gems.len(),
        );
        for candidate in gems.iter().take(HIDDEN_GEM_DISPLAY_CAP) {
            let link = greenhouse_link(candidate.candidate_id, candidate.application_id);
            let summary: String = candidate.evaluation.summary.chars().take(100).collect();
            let _ = writeln!(
                report,
                "- **[{}]({link})** (Score: {}) - {summary}...",
                candidate.name, candidate.evaluation.score,
            );
        }
    }

    report.push_str(
        "\n---\n\n\
         ## Evaluation Methodology\n\n\
         Candidates were scored on a 0-100 scale based on:\n\n\
         1. **Skills & Experience Match** (40 points max)\n\
         2. **Achievements & Impact** (30 points max)\n\
         3. **Culture & Industry Fit** (20 points max)\n\
         4. **Growth Potential** (10 points max)\n",
    );

    report
}

fn write_csv(path: &Path, ranked: &[ScoredCandidate], num_top: usize) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "Rank",
        "Name",
        "Score",
        "Status",
        "Applied Date",
        "Greenhouse Link",
        "Summary",
        "Recommendation",
    ])?;

    for (rank, candidate) in ranked.iter().take(num_top).enumerate() {
        writer.write_record([
            (rank + 1).to_string(),
            candidate.name.clone(),
            candidate.evaluation.score.to_string(),
            candidate.status.clone(),
            crate::greenhouse::date_part(&candidate.applied_at),
            greenhouse_link(candidate.candidate_id, candidate.application_id),
            candidate.evaluation.summary.clone(),
            candidate.evaluation.hire_recommendation.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn render_quick_summary(
    ranked: &[ScoredCandidate],
    job_name: &str,
    total_time_minutes: f64,
    total_cost: f64,
) -> String {
    let mut summary = format!(
        "CANDIDATE ANALYSIS SUMMARY\n{job_name}\n\
         Generated: {}\n\
         Analysis Time: {total_time_minutes:.1} minutes | Cost: ${total_cost:.2}\n\n\
         TOP {QUICK_SUMMARY_TOP} CANDIDATES:\n\n",
        Local::now().format("%B %d, %Y at %I:%M %p"),
    );

    for (rank, candidate) in ranked.iter().take(QUICK_SUMMARY_TOP).enumerate() {
        let _ = write!(
            summary,
            "{}. {} - Score: {}/100\n   Status: {}\n   Summary: {}\n   Recommendation: {}\n   Greenhouse: {}\n\n",
            rank + 1,
            candidate.name,
            candidate.evaluation.score,
            candidate.status,
            candidate.evaluation.summary,
            candidate.evaluation.hire_recommendation,
            greenhouse_link(candidate.candidate_id, candidate.application_id),
        );
    }

    summary
}
