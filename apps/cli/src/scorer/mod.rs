//! AI candidate scoring via the OpenAI chat-completions API.
//!
//! `score_candidate` is infallible: once its retries are exhausted it
//! degrades to a sentinel evaluation (score 0, error flag set) so the
//! pipeline can always advance to the next candidate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

use prompts::{build_scoring_prompt, SCORING_SYSTEM};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const MODEL: &str = "o3";
const MAX_COMPLETION_TOKENS: u32 = 2000;
const MAX_RETRIES: u64 = 3;
const RATE_LIMIT_BACKOFF_SECS: u64 = 30;
const MAX_SCORE: u32 = 100;

#[derive(Debug, Error)]
enum ScoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited")]
    RateLimited,

    #[error("evaluation parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response contained no choices")]
    EmptyChoices,
}

/// Structured evaluation of one candidate against one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub score: u32,
    pub summary: String,
    #[serde(default)]
    pub key_strengths: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub hire_recommendation: String,
    #[serde(default)]
    pub notable_achievements: Vec<String>,
    #[serde(default)]
    pub culture_fit: String,
    #[serde(default)]
    pub data_quality: String,
    /// Set when scoring failed and this is the sentinel evaluation.
    #[serde(default)]
    pub error: bool,
    /// Dollar cost of the scoring call, filled in from token usage.
    #[serde(default)]
    pub cost: f64,
}

impl Evaluation {
    /// Sentinel returned when every scoring attempt failed.
    pub fn failed() -> Self {
        Self {
            score: 0,
            summary: "Scoring failed due to technical issues".to_string(),
            key_strengths: Vec::new(),
            concerns: vec!["Unable to complete AI evaluation".to_string()],
            hire_recommendation: "Unable to assess".to_string(),
            notable_achievements: Vec::new(),
            culture_fit: String::new(),
            data_quality: String::new(),
            error: true,
            cost: 0.0,
        }
    }
}

/// Per-1000-token dollar rates for the three usage counters.
#[derive(Debug, Clone)]
pub struct CostRates {
    pub input_per_1k: f64,
    pub output_per_1k: f64,
    pub reasoning_per_1k: f64,
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            input_per_1k: 0.015,
            output_per_1k: 0.060,
            reasoning_per_1k: 0.060,
        }
    }
}

impl CostRates {
    /// Linear cost of a call, rounded to 4 decimal places. Pure.
    pub fn cost(&self, usage: &Usage) -> f64 {
        let cost = (usage.prompt_tokens as f64 / 1000.0) * self.input_per_1k
            + (usage.completion_tokens as f64 / 1000.0) * self.output_per_1k
            + (usage.reasoning_tokens as f64 / 1000.0) * self.reasoning_per_1k;
        (cost * 10_000.0).round() / 10_000.0
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub reasoning_tokens: u64,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_completion_tokens: u32,
    reasoning_effort: &'a str,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    format_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Scoring contract the orchestrator depends on. Implemented by `AiScorer`
/// and by in-test stubs.
#[async_trait]
pub trait CandidateScorer: Send + Sync {
    async fn score_candidate(
        &self,
        job_title: &str,
        job_description: &str,
        candidate_profile: &str,
        company_context: &str,
    ) -> Evaluation;
}

pub struct AiScorer {
    client: reqwest::Client,
    api_key: String,
    rates: CostRates,
}

impl AiScorer {
    pub fn new(api_key: String, rates: CostRates) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            rates,
        }
    }

    async fn request_evaluation(&self, prompt: &str) -> Result<(Evaluation, Usage), ScoreError> {
        let body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "developer",
                    content: SCORING_SYSTEM,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_completion_tokens: MAX_COMPLETION_TOKENS,
            reasoning_effort: "medium",
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        if status.as_u16() == 429 {
            return Err(ScoreError::RateLimited);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ScoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatResponse = response.json().await?;
        parse_evaluation(completion)
    }
}

/// Pulls the evaluation JSON out of the first choice and caps the score at
/// 100. Usage counters default to zero when the service omits them.
fn parse_evaluation(completion: ChatResponse) -> Result<(Evaluation, Usage), ScoreError> {
    let content = completion
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_deref())
        .ok_or(ScoreError::EmptyChoices)?;

    let mut evaluation: Evaluation = serde_json::from_str(content)?;
    evaluation.score = evaluation.score.min(MAX_SCORE);

    Ok((evaluation, completion.usage.unwrap_or_default()))
}

#[async_trait]
impl CandidateScorer for AiScorer {
    async fn score_candidate(
        &self,
        job_title: &str,
        job_description: &str,
        candidate_profile: &str,
        company_context: &str,
    ) -> Evaluation {
        let prompt =
            build_scoring_prompt(job_title, job_description, candidate_profile, company_context);

        for attempt in 1..=MAX_RETRIES {
            match self.request_evaluation(&prompt).await {
                Ok((mut evaluation, usage)) => {
                    evaluation.cost = self.rates.cost(&usage);
                    debug!(
                        "Scoring succeeded: score={}, cost=${:.4}",
                        evaluation.score, evaluation.cost
                    );
                    return evaluation;
                }
                Err(ScoreError::RateLimited) => {
                    let wait = RATE_LIMIT_BACKOFF_SECS * attempt;
                    warn!("Rate limited, waiting {wait}s (attempt {attempt}/{MAX_RETRIES})...");
                    if attempt < MAX_RETRIES {
                        tokio::time::sleep(std::time::Duration::from_secs(wait)).await;
                    }
                }
                Err(e) => {
                    warn!("Scoring attempt {attempt}/{MAX_RETRIES} failed: {e}");
                }
            }
        }

        Evaluation::failed()
    }
}
