use serde::{Deserialize, Serialize};

/// One verifiable factual statement extracted from ingested content.
/// Immutable once created; `id` is unique within a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub id: String,
    /// Canonical English rendering used for retrieval and judgment.
    pub canonical_text: String,
    /// Source-language text as ingested (bounded upstream).
    pub original_text: String,
    pub source_language: String,
    pub timestamp: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Govt,
    HealthAuthority,
    Factcheck,
    News,
    Reference,
    Other,
}

/// One retrieved document/snippet with its credibility annotation.
/// Never mutated after creation, only filtered and reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub domain: String,
    pub source_name: String,
    pub source_type: SourceType,
    pub credibility_score: u32,
    /// Textual rating, fact-check items only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    /// Fact-check publisher name, fact-check items only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
}

/// Four-way judgment classification before user-facing simplification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InternalLabel {
    Supported,
    Refuted,
    Misleading,
    Insufficient,
}

impl InternalLabel {
    /// Unrecognized labels collapse to `Insufficient`.
    pub fn parse(s: &str) -> Self {
        match s {
            "Supported" => Self::Supported,
            "Refuted" => Self::Refuted,
            "Misleading" => Self::Misleading,
            _ => Self::Insufficient,
        }
    }
}

/// Three-way public verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserLabel {
    True,
    False,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub internal_label: InternalLabel,
    pub user_label: UserLabel,
    pub confidence: u32,
    pub explanation: String,
    pub needs_human_review: bool,
}

/// Engagement telemetry attached to the ingested content. Field defaults are
/// deliberate stand-ins for missing telemetry, not a data error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementMetadata {
    #[serde(default = "default_views")]
    pub views: u64,
    #[serde(default = "default_likes")]
    pub likes: u64,
    #[serde(default = "default_shares")]
    pub shares: u64,
    #[serde(default = "default_comments")]
    pub comments: u64,
}

fn default_views() -> u64 {
    1000
}
fn default_likes() -> u64 {
    50
}
fn default_shares() -> u64 {
    10
}
fn default_comments() -> u64 {
    20
}

impl Default for EngagementMetadata {
    fn default() -> Self {
        Self { views: 1000, likes: 50, shares: 10, comments: 20 }
    }
}

/// Ordered low -> critical so the run summary can take a max.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViralityProfile {
    pub reach_score: u32,
    pub engagement_score: u32,
    pub content_boost_score: f64,
    pub virality_score: u32,
    pub risk_level: RiskLevel,
}

/// The unit handed to downstream synthesis: one claim plus everything the
/// engine derived for it. Built and owned by the pipeline for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimAssessment {
    pub claim: Claim,
    pub evidence: Vec<EvidenceItem>,
    pub verdict: Verdict,
    pub virality: ViralityProfile,
}

/// Run-scoped correlation context, threaded through every stage unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunContext {
    pub primary_language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forensics_tag: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_claims: usize,
    pub true_count: usize,
    pub false_count: usize,
    pub neutral_count: usize,
    pub needs_review_count: usize,
    pub highest_risk: RiskLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub primary_language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forensics_tag: Option<String>,
    pub results: Vec<ClaimAssessment>,
    pub summary: RunSummary,
}
