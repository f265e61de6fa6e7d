pub mod claims;
pub mod credibility;
pub mod evidence;
pub mod llm;
pub mod pipeline;
pub mod search;
pub mod server;
pub mod types;
pub mod verdict;
pub mod virality;

pub use credibility::{Credibility, CredibilityTable};
pub use pipeline::{Pipeline, PipelineInput};
pub use types::*;

#[cfg(test)]
mod tests;
