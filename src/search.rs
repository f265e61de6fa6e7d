use anyhow::Result;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;

/// One raw web-search result, credibility not yet attached.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "link")]
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub snippet: String,
}

#[async_trait::async_trait]
pub trait Searcher: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

/// One raw hit from the fact-check aggregator.
#[derive(Debug, Clone)]
pub struct FactCheckHit {
    pub url: String,
    pub title: String,
    pub rating: String,
    pub publisher: String,
}

#[async_trait::async_trait]
pub trait FactChecker: Send + Sync {
    async fn search_factcheck(&self, query: &str) -> Result<Vec<FactCheckHit>>;
}

#[derive(Debug, Deserialize)]
struct SerperResp {
    #[serde(default)]
    organic: Vec<SearchHit>,
}

/// Serper web search with a per-second rate limit and bounded timeout.
pub struct Serper {
    http: Client,
    key: String,
    limiter: DefaultDirectRateLimiter,
}

impl Serper {
    pub fn new(key: String, qps: u32, timeout_ms: u64) -> Self {
        let http = Client::builder().timeout(Duration::from_millis(timeout_ms)).build().unwrap();
        let qps = NonZeroU32::new(qps).unwrap_or(nonzero!(1u32));
        let limiter = RateLimiter::direct(Quota::per_second(qps));
        Self { http, key, limiter }
    }
}

#[async_trait::async_trait]
impl Searcher for Serper {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        self.limiter.until_ready().await;
        let resp = self
            .http
            .post("https://google.serper.dev/search")
            .header("X-API-KEY", &self.key)
            .json(&serde_json::json!({ "q": query, "num": max_results }))
            .send()
            .await?
            .error_for_status()?
            .json::<SerperResp>()
            .await?;
        Ok(resp.organic.into_iter().take(max_results).collect())
    }
}

// Google Fact Check Tools API response shape; fields we never read are left out.
#[derive(Debug, Deserialize)]
struct FactCheckResp {
    #[serde(default)]
    claims: Vec<FactCheckClaim>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FactCheckClaim {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    claim_review: Vec<ClaimReview>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimReview {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    textual_rating: Option<String>,
    #[serde(default)]
    publisher: Option<Publisher>,
}

#[derive(Debug, Deserialize)]
struct Publisher {
    #[serde(default)]
    name: Option<String>,
}

const FACTCHECK_ENDPOINT: &str = "https://factchecktools.googleapis.com/v1alpha1/claims:search";
const FACTCHECK_PAGE_SIZE: u32 = 5;

/// Google Fact Check Tools client. Entirely optional collaborator; the
/// engine runs with it disabled.
pub struct GoogleFactCheck {
    http: Client,
    key: String,
}

impl GoogleFactCheck {
    pub fn new(key: String, timeout_ms: u64) -> Self {
        let http = Client::builder().timeout(Duration::from_millis(timeout_ms)).build().unwrap();
        Self { http, key }
    }
}

#[async_trait::async_trait]
impl FactChecker for GoogleFactCheck {
    async fn search_factcheck(&self, query: &str) -> Result<Vec<FactCheckHit>> {
        let page_size = FACTCHECK_PAGE_SIZE.to_string();
        let resp = self
            .http
            .get(FACTCHECK_ENDPOINT)
            .query(&[
                ("key", self.key.as_str()),
                ("query", query),
                ("languageCode", "en"),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<FactCheckResp>()
            .await?;

        let mut hits = Vec::new();
        for claim in resp.claims {
            // Use the first review only.
            let Some(review) = claim.claim_review.into_iter().next() else { continue };
            let title = review
                .title
                .or(claim.text)
                .unwrap_or_else(|| "Fact Check".to_string());
            hits.push(FactCheckHit {
                url: review.url.unwrap_or_default(),
                title,
                rating: review.textual_rating.unwrap_or_else(|| "Unknown".to_string()),
                publisher: review
                    .publisher
                    .and_then(|p| p.name)
                    .unwrap_or_else(|| "Fact Checker".to_string()),
            });
        }
        Ok(hits)
    }
}
