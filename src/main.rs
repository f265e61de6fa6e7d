use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use claimguard::credibility::CredibilityTable;
use claimguard::llm::openai::LlmClient;
use claimguard::pipeline::{Pipeline, PipelineInput};
use claimguard::search::{GoogleFactCheck, Serper};
use claimguard::server::run_server;
use claimguard::verdict::VerdictPolicy;

#[derive(Parser)]
#[command(name = "claimguard", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
    /// Credibility override table (domain,type,score CSV); heuristics-only when absent
    #[arg(long, default_value = "./data/credibility.csv")]
    credibility_csv: String,
    /// Model used for claim extraction and judgment
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,
    #[arg(long, default_value_t = 16)]
    llm_concurrency: usize,
    #[arg(long, default_value_t = 4)]
    claim_concurrency: usize,
    /// Confidence below which sensitive-topic claims are escalated
    #[arg(long, default_value_t = 80)]
    review_threshold: u32,
    #[arg(long, default_value_t = 10_000)]
    search_timeout_ms: u64,
}

#[derive(Subcommand)]
enum Cmd {
    /// Expose the pipeline over HTTP (POST /verify)
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: String,
    },
    /// Assess one piece of text end to end and print the report as JSON
    Verify {
        #[arg(long)]
        text: String,
        #[arg(long, default_value = "en")]
        language: String,
    },
}

fn build_pipeline(cli: &Cli) -> Result<Pipeline> {
    let credibility = match CredibilityTable::from_csv_path(&cli.credibility_csv) {
        Ok(t) => t,
        Err(e) => {
            tracing::warn!(error = %e, path = %cli.credibility_csv, "no credibility table, using heuristics only");
            CredibilityTable::empty()
        }
    };

    let llm = Arc::new(LlmClient::new(
        cli.model.clone(),
        std::env::var("OPENAI_BASE_URL").ok(),
        std::env::var("OPENAI_API_KEY").ok(),
        cli.llm_concurrency,
    ));

    let serper_key = std::env::var("SERPER_API_KEY").unwrap_or_default();
    let searcher = Arc::new(Serper::new(serper_key, 5, cli.search_timeout_ms));

    let factcheck = std::env::var("FACTCHECK_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
        .map(|key| {
            Arc::new(GoogleFactCheck::new(key, cli.search_timeout_ms))
                as Arc<dyn claimguard::search::FactChecker>
        });
    if factcheck.is_some() {
        tracing::info!("fact-check aggregator enabled");
    } else {
        tracing::info!("fact-check aggregator not configured");
    }

    Ok(Pipeline {
        llm_extract: llm.clone(),
        llm_judge: llm,
        searcher,
        factcheck,
        credibility: Arc::new(credibility),
        policy: VerdictPolicy { review_confidence_threshold: cli.review_threshold },
        claim_concurrency: cli.claim_concurrency,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let pipeline = build_pipeline(&cli)?;

    match cli.cmd {
        Cmd::Serve { addr } => run_server(Arc::new(pipeline), &addr).await?,
        Cmd::Verify { text, language } => {
            let report = pipeline
                .process(PipelineInput {
                    text,
                    original_text: None,
                    language,
                    forensics_tag: None,
                    metadata: None,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
