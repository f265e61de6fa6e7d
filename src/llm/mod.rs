pub mod openai;

use anyhow::Result;
use async_openai::types::ChatCompletionRequestMessage;

#[async_trait::async_trait]
pub trait Llm: Send + Sync {
    async fn chat_many(&self, prompts: Vec<Vec<ChatCompletionRequestMessage>>) -> Result<Vec<String>>;
}

/// Model responses often arrive fenced in markdown code blocks; strip the
/// fence before JSON parsing.
pub fn unfence_json(raw: &str) -> &str {
    let trimmed = raw.trim();
    for fence in ["```json", "```"] {
        if let Some(rest) = trimmed.strip_prefix(fence) {
            if let Some(end) = rest.find("```") {
                return rest[..end].trim();
            }
            return rest.trim();
        }
    }
    trimmed
}
