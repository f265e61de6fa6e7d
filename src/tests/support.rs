use anyhow::Result;
use async_openai::types::ChatCompletionRequestMessage;
use async_trait::async_trait;

use crate::llm::Llm;
use crate::search::{FactCheckHit, FactChecker, SearchHit, Searcher};

/// Maps each prompt to a canned response via a closure.
pub struct FakeLlm {
    pub handler: Box<dyn Fn(&[ChatCompletionRequestMessage]) -> String + Send + Sync>,
    pub delay_ms: u64,
}

#[async_trait]
impl Llm for FakeLlm {
    async fn chat_many(&self, prompts: Vec<Vec<ChatCompletionRequestMessage>>) -> Result<Vec<String>> {
        use tokio::time::{sleep, Duration};
        let mut outs = Vec::with_capacity(prompts.len());
        for p in prompts.iter() {
            if self.delay_ms > 0 {
                sleep(Duration::from_millis(self.delay_ms)).await;
            }
            outs.push((self.handler)(p));
        }
        Ok(outs)
    }
}

pub struct FakeSearcher {
    pub results: Vec<SearchHit>,
}

#[async_trait]
impl Searcher for FakeSearcher {
    async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        Ok(self.results.iter().take(max_results).cloned().collect())
    }
}

pub struct FakeFactChecker {
    pub results: Vec<FactCheckHit>,
}

#[async_trait]
impl FactChecker for FakeFactChecker {
    async fn search_factcheck(&self, _query: &str) -> Result<Vec<FactCheckHit>> {
        Ok(self.results.clone())
    }
}
