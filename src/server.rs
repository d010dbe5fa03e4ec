use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use log::{error, info};

use crate::config::ServerConfig;
use crate::data::{SchedulingOutput, SchedulingRequest};
use crate::solver;

async fn generate_handler(
    Json(request): Json<SchedulingRequest>,
) -> Result<Json<SchedulingOutput>, (StatusCode, String)> {
    // the search is CPU-bound; keep it off the async workers
    match tokio::task::spawn_blocking(move || solver::solve(&request)).await {
        Ok(Ok(output)) => Ok(Json(output)),
        Ok(Err(e)) => Err((StatusCode::BAD_REQUEST, e.to_string())),
        Err(e) => {
            error!("Timetable generation task failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate timetable".to_string(),
            ))
        }
    }
}

pub fn router() -> Router {
    Router::new().route("/v1/timetable/generate", post(generate_handler))
}

pub async fn run_server(config: &ServerConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("Server running at http://{}", listener.local_addr()?);
    axum::serve(listener, router()).await
}
