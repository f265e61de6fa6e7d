use crate::llm::{unfence_json, Llm};
use crate::types::{Claim, RunContext};
use anyhow::Result;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs,
};
use serde::Deserialize;

const MAX_CLAIMS: usize = 3;
const ORIGINAL_TEXT_LIMIT: usize = 300;
const FALLBACK_CLAIM_LIMIT: usize = 200;

// Upstream extraction stages signal their own failures inline; such text
// carries no verifiable claims.
const ERROR_INDICATORS: &[&str] = &[
    "no readable text found",
    "unable to extract",
    "error processing",
    "failed to process",
    "no clear speech detected",
];

#[derive(Deserialize)]
struct ClaimsPayload {
    #[serde(default)]
    claims: Vec<ClaimEntry>,
}

#[derive(Deserialize)]
struct ClaimEntry {
    #[serde(default)]
    claim: String,
}

fn build_extraction_prompt(text: &str) -> Vec<ChatCompletionRequestMessage> {
    let system = ChatCompletionRequestSystemMessageArgs::default()
        .content(
            "You are an expert at extracting verifiable factual claims. A factual claim is a \
             statement that can be verified as true or false: events, statistics, statements \
             about people, places, or things, health or medical information, political or \
             scientific claims. Ignore opinions, questions, and non-verifiable statements.",
        )
        .build()
        .unwrap()
        .into();
    let user = ChatCompletionRequestUserMessageArgs::default()
        .content(format!(
            "Extract the TOP {MAX_CLAIMS} MOST IMPORTANT factual claims from the text below. \
             Each claim should be clear and checkable.\n\nText:\n{text}\n\nReturn ONLY valid \
             JSON in the form {{\"claims\": [{{\"claim\": \"...\"}}]}} with at most \
             {MAX_CLAIMS} claims."
        ))
        .build()
        .unwrap()
        .into();
    vec![system, user]
}

fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

fn make_claim(idx: usize, canonical: String, original: &str, ctx: &RunContext) -> Claim {
    Claim {
        id: format!("clm_{:03}", idx + 1),
        canonical_text: canonical,
        original_text: truncate_chars(original, ORIGINAL_TEXT_LIMIT),
        source_language: ctx.primary_language.clone(),
        timestamp: None,
    }
}

/// Extract up to `MAX_CLAIMS` verifiable claims from English text.
/// `original_text` is the untranslated source-language rendering carried on
/// each claim. Extraction failure degrades to a single claim built from the
/// text itself; it never surfaces as a pipeline error.
pub async fn extract_claims(
    client: &dyn Llm,
    english_text: &str,
    original_text: &str,
    ctx: &RunContext,
) -> Result<Vec<Claim>> {
    let text = english_text.trim();
    if text.chars().count() < 20 {
        tracing::warn!("text too short to extract meaningful claims");
        return Ok(Vec::new());
    }
    let lower = text.to_lowercase();
    if ERROR_INDICATORS.iter().any(|ind| lower.contains(ind)) {
        tracing::warn!("upstream error message detected in text, skipping extraction");
        return Ok(Vec::new());
    }

    let raw = match client.chat_many(vec![build_extraction_prompt(text)]).await {
        Ok(mut outs) if !outs.is_empty() => outs.remove(0),
        Ok(_) | Err(_) => {
            tracing::error!("claim extraction failed, falling back to whole-text claim");
            return Ok(vec![make_claim(
                0,
                truncate_chars(text, FALLBACK_CLAIM_LIMIT),
                &truncate_chars(original_text, FALLBACK_CLAIM_LIMIT),
                ctx,
            )]);
        }
    };

    let payload: ClaimsPayload = match serde_json::from_str(unfence_json(&raw)) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "unparseable extraction output, falling back");
            return Ok(vec![make_claim(
                0,
                truncate_chars(text, FALLBACK_CLAIM_LIMIT),
                &truncate_chars(original_text, FALLBACK_CLAIM_LIMIT),
                ctx,
            )]);
        }
    };

    let claims = payload
        .claims
        .into_iter()
        .filter(|c| !c.claim.is_empty())
        .take(MAX_CLAIMS)
        .enumerate()
        .map(|(idx, c)| make_claim(idx, c.claim, original_text, ctx))
        .collect();
    Ok(claims)
}
