use crate::llm::{unfence_json, Llm};
use crate::types::{EvidenceItem, InternalLabel, SourceType, UserLabel, Verdict};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs,
};
use serde::Deserialize;
use std::time::Duration;

/// Retry budget for the judgment call; transient failures and unparseable
/// output both count against it.
pub const JUDGE_ATTEMPTS: u32 = 3;

const EVIDENCE_IN_PROMPT: usize = 5;
const SNIPPET_LIMIT: usize = 200;
const DEFAULT_REVIEW_THRESHOLD: u32 = 80;

const SENSITIVE_KEYWORDS: &[&str] = &[
    "covid", "vaccine", "vaccination", "corona",
    "election", "voting", "ballot", "vote",
    "riot", "violence", "attack", "terror",
    "disaster", "earthquake", "flood", "cyclone",
    "medicine", "drug", "treatment", "cure",
];

#[derive(Debug, Clone)]
pub struct VerdictPolicy {
    /// Confidence below which sensitive-topic claims are escalated.
    pub review_confidence_threshold: u32,
}

impl Default for VerdictPolicy {
    fn default() -> Self {
        Self { review_confidence_threshold: DEFAULT_REVIEW_THRESHOLD }
    }
}

/// Credibility-weighted support signal: average over the top 3 items
/// (integer division over however many exist; zero evidence scores 0).
pub fn support_score(evidence: &[EvidenceItem]) -> u32 {
    let top = &evidence[..evidence.len().min(3)];
    if top.is_empty() {
        return 0;
    }
    let total: u32 = top.iter().map(|e| e.credibility_score).sum();
    (total / top.len() as u32).min(100)
}

/// Refutation signal: 30 points per fact-check item among the top 5.
pub fn refute_score(evidence: &[EvidenceItem]) -> u32 {
    let count = evidence
        .iter()
        .take(5)
        .filter(|e| e.source_type == SourceType::Factcheck)
        .count() as u32;
    (count * 30).min(100)
}

/// Internal -> user-facing label, fixed threshold policy. Misleading never
/// maps to True.
pub fn map_label(internal: InternalLabel, confidence: u32) -> UserLabel {
    match internal {
        InternalLabel::Supported if confidence >= 60 => UserLabel::True,
        InternalLabel::Refuted if confidence >= 60 => UserLabel::False,
        InternalLabel::Misleading if confidence >= 75 => UserLabel::False,
        _ => UserLabel::Neutral,
    }
}

/// Human-review escalation. Two independent rules, both always evaluated:
/// sensitive topic below the policy threshold, and any refutation below 90.
pub fn needs_review(
    claim_text: &str,
    confidence: u32,
    internal: InternalLabel,
    policy: &VerdictPolicy,
) -> bool {
    let lower = claim_text.to_lowercase();
    let sensitive = SENSITIVE_KEYWORDS.iter().any(|k| lower.contains(k));
    if sensitive && confidence < policy.review_confidence_threshold {
        return true;
    }
    internal == InternalLabel::Refuted && confidence < 90
}

fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

fn format_evidence(evidence: &[EvidenceItem]) -> String {
    if evidence.is_empty() {
        return "No evidence found.".to_string();
    }
    evidence
        .iter()
        .take(EVIDENCE_IN_PROMPT)
        .enumerate()
        .map(|(idx, ev)| {
            let type_tag = serde_json::to_value(ev.source_type)
                .ok()
                .and_then(|v| v.as_str().map(|s| s.to_uppercase()))
                .unwrap_or_default();
            let name = if ev.source_name.is_empty() { &ev.domain } else { &ev.source_name };
            format!(
                "{}. [{}] {}\n   {}\n   Credibility: {}/100\n   Content: {}...",
                idx + 1,
                type_tag,
                name,
                ev.title,
                ev.credibility_score,
                truncate_chars(&ev.snippet, SNIPPET_LIMIT),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn build_judgment_prompt(
    claim_text: &str,
    evidence: &[EvidenceItem],
    support: u32,
    refute: u32,
) -> Vec<ChatCompletionRequestMessage> {
    let system = ChatCompletionRequestSystemMessageArgs::default()
        .content(
            "You are a fact-checking expert. Analyze the claim and evidence, then provide a \
             clear verdict in simple language. Be decisive; avoid \"Insufficient\" unless \
             there is truly no relevant evidence.",
        )
        .build()
        .unwrap()
        .into();
    let user = ChatCompletionRequestUserMessageArgs::default()
        .content(format!(
            "CLAIM: {claim_text}\n\n\
             EVIDENCE FROM CREDIBLE SOURCES:\n{evidence}\n\n\
             CREDIBILITY METRICS:\n\
             - Support score: {support}/100 (based on authoritative sources)\n\
             - Refutation score: {refute}/100\n\n\
             INSTRUCTIONS:\n\
             1. If evidence clearly supports the claim with high credibility sources -> \"Supported\" with 70-95 confidence\n\
             2. If evidence clearly contradicts or debunks the claim -> \"Refuted\" with 70-95 confidence\n\
             3. If the claim is partially true, exaggerated, or lacks context -> \"Misleading\" with 60-85 confidence\n\
             4. Only use \"Insufficient\" if there is truly no relevant evidence found\n\n\
             For the explanation: use simple language, keep it to 2-3 sentences, and if the \
             claim is false or misleading include what the true facts are.\n\n\
             Return ONLY this JSON (no markdown, no other text):\n\
             {{\"internal_label\": \"Supported\" or \"Refuted\" or \"Misleading\" or \"Insufficient\", \
             \"confidence\": <number 50-95>, \"explanation\": \"<2-3 sentence explanation>\"}}",
            evidence = format_evidence(evidence),
        ))
        .build()
        .unwrap()
        .into();
    vec![system, user]
}

#[derive(Deserialize)]
struct JudgmentPayload {
    #[serde(default)]
    internal_label: String,
    #[serde(default = "default_confidence")]
    confidence: f64,
    #[serde(default, alias = "rationale")]
    explanation: Option<String>,
}

fn default_confidence() -> f64 {
    50.0
}

/// Judge one claim against its ranked evidence. Always yields a complete
/// `Verdict`: after `JUDGE_ATTEMPTS` failed or unparseable calls the result
/// degrades to an Insufficient/Neutral verdict rather than an error.
pub async fn synthesize_verdict(
    client: &dyn Llm,
    claim_text: &str,
    evidence: &[EvidenceItem],
    policy: &VerdictPolicy,
) -> Verdict {
    let support = support_score(evidence);
    let refute = refute_score(evidence);
    let prompt = build_judgment_prompt(claim_text, evidence, support, refute);

    for attempt in 0..JUDGE_ATTEMPTS {
        let raw = match client.chat_many(vec![prompt.clone()]).await {
            Ok(mut outs) if !outs.is_empty() => outs.remove(0),
            Ok(_) => String::new(),
            Err(e) => {
                tracing::warn!(attempt, error = %e, "judgment call failed");
                backoff(attempt).await;
                continue;
            }
        };

        match serde_json::from_str::<JudgmentPayload>(unfence_json(&raw)) {
            Ok(payload) => {
                let internal = InternalLabel::parse(&payload.internal_label);
                let confidence = payload.confidence as u32;
                let user_label = map_label(internal, confidence);
                tracing::info!(
                    ?internal,
                    confidence,
                    ?user_label,
                    "judgment mapped to user label"
                );
                return Verdict {
                    internal_label: internal,
                    user_label,
                    confidence,
                    explanation: payload
                        .explanation
                        .unwrap_or_else(|| "Unable to verify".to_string()),
                    needs_human_review: needs_review(claim_text, confidence, internal, policy),
                };
            }
            Err(e) => {
                tracing::warn!(attempt, error = %e, "unparseable judgment output");
                backoff(attempt).await;
            }
        }
    }

    tracing::error!("judgment retries exhausted, returning degraded verdict");
    Verdict {
        internal_label: InternalLabel::Insufficient,
        user_label: UserLabel::Neutral,
        confidence: 0,
        explanation: "Verification system error".to_string(),
        needs_human_review: false,
    }
}

async fn backoff(attempt: u32) {
    if attempt + 1 < JUDGE_ATTEMPTS {
        tokio::time::sleep(Duration::from_secs(1 << attempt)).await;
    }
}
