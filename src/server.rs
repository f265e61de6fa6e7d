use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use std::sync::Arc;

use crate::pipeline::{Pipeline, PipelineInput};
use crate::types::RunReport;

#[axum::debug_handler]
pub async fn verify(
    State(pipeline): State<Arc<Pipeline>>,
    Json(input): Json<PipelineInput>,
) -> Result<Json<RunReport>, StatusCode> {
    match pipeline.process(input).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            tracing::error!(error = %e, "pipeline run failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new().route("/verify", post(verify)).with_state(pipeline)
}

pub async fn run_server(pipeline: Arc<Pipeline>, addr: &str) -> anyhow::Result<()> {
    let app = router(pipeline);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "serving claim verification");
    axum::serve(listener, app).await?;
    Ok(())
}
