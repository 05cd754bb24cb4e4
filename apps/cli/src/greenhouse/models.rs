//! Wire models for the Greenhouse Harvest API v1.
//!
//! Optional remote fields stay `Option` or default so a sparse record never
//! fails deserialization; defaulting policy lives with the consumers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A job posting with the metadata needed to build a description.
#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub status: String,
    pub notes: Option<String>,
    pub created_at: Option<String>,
    /// `None` when the source omits the key entirely; `Some(vec![])` when it
    /// sends an empty list. Job discovery treats the two differently.
    pub departments: Option<Vec<Department>>,
    pub offices: Option<Vec<Office>>,
    pub keyed_custom_fields: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Department {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Office {
    pub name: Option<String>,
}

/// One row of the `jobs` listing: a job known to have applications.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub department: String,
    /// Date portion only (YYYY-MM-DD).
    pub created_at: String,
    pub application_count: usize,
}

/// One candidate's submission to one job.
#[derive(Debug, Clone, Deserialize)]
pub struct Application {
    pub id: i64,
    pub candidate_id: i64,
    pub applied_at: Option<String>,
    pub status: Option<String>,
    pub current_stage: Option<Stage>,
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Stage {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Answer {
    pub question: Option<String>,
    pub answer: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    pub url: String,
    pub filename: Option<String>,
    /// Declared attachment type, matched case-insensitively against
    /// "resume" and "cover" during classification.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailAddress {
    pub value: Option<String>,
}

impl Candidate {
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
    }

    /// First known contact value, `N/A` when none.
    pub fn primary_email(&self) -> String {
        self.email_addresses
            .first()
            .and_then(|address| address.value.clone())
            .unwrap_or_else(|| "N/A".to_string())
    }
}
