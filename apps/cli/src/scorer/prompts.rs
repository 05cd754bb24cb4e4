//! Prompt constants for candidate scoring.

/// Developer-role instruction framing the evaluation task.
pub const SCORING_SYSTEM: &str = "You are an expert recruiter and talent evaluator. \
    Provide objective, thorough assessments based on all available information. \
    Be constructive but honest about gaps or concerns.";

/// Scoring prompt template. Placeholders: `{job_title}`, `{job_description}`,
/// `{context_section}`, `{candidate_profile}`.
const SCORING_PROMPT_TEMPLATE: &str = r#"Evaluate this {job_title} candidate.

JOB REQUIREMENTS:
{job_description}
{context_section}
CANDIDATE PROFILE:
{candidate_profile}

Provide comprehensive evaluation based on:
- Skills and experience match (40 points max)
- Achievements and quantifiable impact (30 points max)
- Industry/culture fit (20 points max)
- Growth potential and soft skills (10 points max)

Return JSON with:
{
    "score": <0-100>,
    "summary": "2-3 sentence executive summary",
    "key_strengths": ["top 3 relevant qualifications"],
    "concerns": ["any gaps or concerns"],
    "hire_recommendation": "Strong Yes/Yes/Maybe/No with brief rationale",
    "notable_achievements": ["specific accomplishments if found"],
    "culture_fit": "assessment of fit with company culture",
    "data_quality": "completeness of candidate information"
}"#;

pub fn build_scoring_prompt(
    job_title: &str,
    job_description: &str,
    candidate_profile: &str,
    company_context: &str,
) -> String {
    let context_section = if company_context.is_empty() {
        String::new()
    } else {
        format!("\nCOMPANY CONTEXT:\n{company_context}\n")
    };

    SCORING_PROMPT_TEMPLATE
        .replace("{job_title}", job_title)
        .replace("{job_description}", job_description)
        .replace("{context_section}", &context_section)
        .replace("{candidate_profile}", candidate_profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_job_and_profile() {
        let prompt = build_scoring_prompt("Staff Engineer", "Build things", "PROFILE BODY", "");
        assert!(prompt.starts_with("Evaluate this Staff Engineer candidate."));
        assert!(prompt.contains("JOB REQUIREMENTS:\nBuild things"));
        assert!(prompt.contains("CANDIDATE PROFILE:\nPROFILE BODY"));
    }

    #[test]
    fn test_prompt_contains_rubric_and_schema() {
        let prompt = build_scoring_prompt("X", "Y", "Z", "");
        assert!(prompt.contains("Skills and experience match (40 points max)"));
        assert!(prompt.contains("Achievements and quantifiable impact (30 points max)"));
        assert!(prompt.contains("Industry/culture fit (20 points max)"));
        assert!(prompt.contains("Growth potential and soft skills (10 points max)"));
        for key in [
            "\"score\"",
            "\"summary\"",
            "\"key_strengths\"",
            "\"concerns\"",
            "\"hire_recommendation\"",
            "\"notable_achievements\"",
            "\"culture_fit\"",
            "\"data_quality\"",
        ] {
            assert!(prompt.contains(key), "missing {key}");
        }
    }

    #[test]
    fn test_company_context_block_only_when_provided() {
        let without = build_scoring_prompt("X", "Y", "Z", "");
        assert!(!without.contains("COMPANY CONTEXT:"));

        let with = build_scoring_prompt("X", "Y", "Z", "We value ownership.");
        assert!(with.contains("COMPANY CONTEXT:\nWe value ownership."));
    }
}
