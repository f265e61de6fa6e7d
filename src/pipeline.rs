use crate::claims::extract_claims;
use crate::credibility::CredibilityTable;
use crate::evidence::gather_evidence;
use crate::llm::Llm;
use crate::search::{FactChecker, Searcher};
use crate::types::{
    Claim, ClaimAssessment, EngagementMetadata, RiskLevel, RunContext, RunReport, RunSummary,
    UserLabel,
};
use crate::verdict::{synthesize_verdict, VerdictPolicy};
use crate::virality;
use anyhow::Result;
use futures::{stream, StreamExt};
use serde::Deserialize;
use std::sync::Arc;

/// One verification request: English text to assess, the source-language
/// rendering, and optional engagement telemetry.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineInput {
    pub text: String,
    /// Untranslated source text; defaults to `text` when absent.
    #[serde(default)]
    pub original_text: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub forensics_tag: Option<String>,
    #[serde(default)]
    pub metadata: Option<EngagementMetadata>,
}

fn default_language() -> String {
    "en".to_string()
}

/// Threads each claim through rank -> synthesize -> score, strictly in that
/// order per claim, concurrently across claims. All collaborators are
/// injected; the credibility table is an immutable snapshot shared without
/// locking.
pub struct Pipeline {
    pub llm_extract: Arc<dyn Llm>,
    pub llm_judge: Arc<dyn Llm>,
    pub searcher: Arc<dyn Searcher>,
    pub factcheck: Option<Arc<dyn FactChecker>>,
    pub credibility: Arc<CredibilityTable>,
    pub policy: VerdictPolicy,
    pub claim_concurrency: usize,
}

impl Pipeline {
    /// Run the full pipeline for one input. Stage failures degrade locally
    /// (empty evidence, neutral verdict); the report is always complete.
    pub async fn process(&self, input: PipelineInput) -> Result<RunReport> {
        let ctx = RunContext {
            primary_language: input.language.clone(),
            forensics_tag: input.forensics_tag.clone(),
        };
        let original = input.original_text.as_deref().unwrap_or(&input.text);

        tracing::info!(language = %ctx.primary_language, "starting claim extraction");
        let claims = extract_claims(self.llm_extract.as_ref(), &input.text, original, &ctx).await?;
        tracing::info!(count = claims.len(), "claims extracted");

        let metadata = input.metadata.as_ref();
        let tasks = claims.into_iter().map(|claim| self.assess_claim(claim, metadata));
        let mut results = stream::iter(tasks)
            .buffer_unordered(self.claim_concurrency.max(1))
            .collect::<Vec<ClaimAssessment>>()
            .await;
        // buffer_unordered scrambles completion order; reports keep claim order.
        results.sort_by(|a, b| a.claim.id.cmp(&b.claim.id));

        let summary = summarize(&results);
        tracing::info!(
            total = summary.total_claims,
            highest_risk = ?summary.highest_risk,
            "pipeline complete"
        );

        Ok(RunReport {
            primary_language: ctx.primary_language,
            forensics_tag: ctx.forensics_tag,
            results,
            summary,
        })
    }

    async fn assess_claim(
        &self,
        claim: Claim,
        metadata: Option<&EngagementMetadata>,
    ) -> ClaimAssessment {
        tracing::info!(id = %claim.id, "gathering evidence");
        let evidence = gather_evidence(
            &claim.canonical_text,
            self.searcher.as_ref(),
            self.factcheck.as_deref(),
            &self.credibility,
        )
        .await;

        tracing::info!(id = %claim.id, evidence = evidence.len(), "synthesizing verdict");
        let verdict =
            synthesize_verdict(self.llm_judge.as_ref(), &claim.canonical_text, &evidence, &self.policy)
                .await;

        let virality =
            virality::score(&claim.canonical_text, &claim.original_text, &verdict, metadata);

        ClaimAssessment { claim, evidence, verdict, virality }
    }
}

/// Downstream synthesis summary: verdict counts and the worst risk tier.
pub fn summarize(results: &[ClaimAssessment]) -> RunSummary {
    let count_label =
        |label: UserLabel| results.iter().filter(|r| r.verdict.user_label == label).count();
    RunSummary {
        total_claims: results.len(),
        true_count: count_label(UserLabel::True),
        false_count: count_label(UserLabel::False),
        neutral_count: count_label(UserLabel::Neutral),
        needs_review_count: results.iter().filter(|r| r.verdict.needs_human_review).count(),
        highest_risk: results
            .iter()
            .map(|r| r.virality.risk_level)
            .max()
            .unwrap_or(RiskLevel::Low),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{FactCheckHit, SearchHit};
    use crate::types::{InternalLabel, SourceType, Verdict, ViralityProfile};
    use async_openai::types::ChatCompletionRequestMessage;

    struct ScriptedLlm(&'static str);
    #[async_trait::async_trait]
    impl Llm for ScriptedLlm {
        async fn chat_many(
            &self,
            prompts: Vec<Vec<ChatCompletionRequestMessage>>,
        ) -> anyhow::Result<Vec<String>> {
            Ok(vec![self.0.to_string(); prompts.len()])
        }
    }

    struct StaticSearch;
    #[async_trait::async_trait]
    impl Searcher for StaticSearch {
        async fn search(&self, _q: &str, _n: usize) -> anyhow::Result<Vec<SearchHit>> {
            Ok(vec![
                SearchHit {
                    url: "https://www.who.int/news/item".into(),
                    title: "WHO statement".into(),
                    snippet: "No evidence of a link.".into(),
                },
                SearchHit {
                    url: "https://randomblog.xyz/post".into(),
                    title: "Blog post".into(),
                    snippet: "Opinions.".into(),
                },
            ])
        }
    }

    struct StaticFactCheck;
    #[async_trait::async_trait]
    impl FactChecker for StaticFactCheck {
        async fn search_factcheck(&self, _q: &str) -> anyhow::Result<Vec<FactCheckHit>> {
            Ok(vec![FactCheckHit {
                url: "https://snopes.com/check".into(),
                title: "Claim rated".into(),
                rating: "False".into(),
                publisher: "Snopes".into(),
            }])
        }
    }

    fn pipeline() -> Pipeline {
        Pipeline {
            llm_extract: Arc::new(ScriptedLlm(
                r#"{"claims":[{"claim":"5G towers cause COVID-19"},{"claim":"Lockdown starts tomorrow"}]}"#,
            )),
            llm_judge: Arc::new(ScriptedLlm(
                r#"{"internal_label":"Refuted","confidence":92,"explanation":"Health authorities found no link."}"#,
            )),
            searcher: Arc::new(StaticSearch),
            factcheck: Some(Arc::new(StaticFactCheck)),
            credibility: Arc::new(CredibilityTable::empty()),
            policy: VerdictPolicy::default(),
            claim_concurrency: 4,
        }
    }

    fn input(text: &str) -> PipelineInput {
        PipelineInput {
            text: text.into(),
            original_text: None,
            language: "en".into(),
            forensics_tag: Some("none".into()),
            metadata: None,
        }
    }

    #[tokio::test]
    async fn full_run_produces_ordered_assessments_and_summary() {
        let report = pipeline()
            .process(input("5G towers are spreading coronavirus. Lockdown starts tomorrow."))
            .await
            .unwrap();

        assert_eq!(report.primary_language, "en");
        assert_eq!(report.forensics_tag.as_deref(), Some("none"));
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[0].claim.id, "clm_001");
        assert_eq!(report.results[1].claim.id, "clm_002");

        let first = &report.results[0];
        // Fact-check item leads the evidence set.
        assert_eq!(first.evidence[0].source_type, SourceType::Factcheck);
        assert_eq!(first.verdict.user_label, UserLabel::False);
        assert!(!first.verdict.needs_human_review); // Refuted at 92

        assert_eq!(report.summary.total_claims, 2);
        assert_eq!(report.summary.false_count, 2);
        assert_eq!(report.summary.true_count, 0);
        // False verdict with default telemetry stays below the high-virality bars.
        assert_eq!(report.summary.highest_risk, RiskLevel::Medium);
    }

    #[tokio::test]
    async fn empty_text_yields_empty_report() {
        let report = pipeline().process(input("short")).await.unwrap();
        assert!(report.results.is_empty());
        assert_eq!(report.summary.total_claims, 0);
        assert_eq!(report.summary.highest_risk, RiskLevel::Low);
    }

    #[tokio::test]
    async fn factcheck_collaborator_is_optional() {
        let mut p = pipeline();
        p.factcheck = None;
        let report = p
            .process(input("5G towers are spreading coronavirus everywhere."))
            .await
            .unwrap();
        assert!(report.results.iter().all(|r| {
            r.evidence.iter().all(|e| e.source_type != SourceType::Factcheck)
        }));
    }

    #[test]
    fn summary_takes_worst_risk() {
        let mk = |risk: RiskLevel, label: UserLabel| ClaimAssessment {
            claim: Claim {
                id: "clm_001".into(),
                canonical_text: "c".into(),
                original_text: "c".into(),
                source_language: "en".into(),
                timestamp: None,
            },
            evidence: vec![],
            verdict: Verdict {
                internal_label: InternalLabel::Insufficient,
                user_label: label,
                confidence: 0,
                explanation: String::new(),
                needs_human_review: false,
            },
            virality: ViralityProfile {
                reach_score: 0,
                engagement_score: 0,
                content_boost_score: 1.0,
                virality_score: 0,
                risk_level: risk,
            },
        };
        let results = vec![
            mk(RiskLevel::Low, UserLabel::True),
            mk(RiskLevel::Critical, UserLabel::False),
            mk(RiskLevel::Medium, UserLabel::Neutral),
        ];
        let s = summarize(&results);
        assert_eq!(s.highest_risk, RiskLevel::Critical);
        assert_eq!(s.true_count, 1);
        assert_eq!(s.false_count, 1);
        assert_eq!(s.neutral_count, 1);
    }
}
