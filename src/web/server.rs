//! Axum web server for the tree-size report.
//!
//! Every request opens its own read-only [`Dataset`] on a blocking thread, so
//! concurrent requests never share a cursor.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::dataset::Dataset;
use crate::error::StatsError;
use crate::render;
use crate::report::{generate_report, Report, ReportOptions};

/// Application state shared across handlers.
pub struct AppState {
    /// Statistics database to open for each request.
    pub dataset_path: PathBuf,
    /// Options used when the request doesn't override them.
    pub options: ReportOptions,
    /// Upper bound on generating one report.
    pub request_timeout: Duration,
}

type ApiError = (StatusCode, String);

/// Build the axum router with all routes
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(report_page))
        .route("/api/report", get(report_json))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the web server
pub async fn serve(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = state.dataset_path.display().to_string();
    let app = router(Arc::new(state));

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("bupstats listening on http://{}", addr);
    println!("bup stats");
    println!("   URL: http://localhost:{}", port);
    println!("   Database: {}", dataset);
    println!();
    println!("   Press Ctrl+C to stop");

    axum::serve(listener, app).await?;
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct ReportParams {
    threshold: Option<u64>,
}

fn error_status(err: &StatsError) -> StatusCode {
    if err.is_unavailable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

async fn build_report(state: &AppState, params: ReportParams) -> Result<Report, ApiError> {
    let path = state.dataset_path.clone();
    let mut options = state.options.clone();
    if let Some(threshold) = params.threshold {
        options = options.with_threshold(threshold);
    }

    let task = tokio::task::spawn_blocking(move || {
        let dataset = Dataset::open(&path)?;
        generate_report(&dataset, &options)
    });

    match tokio::time::timeout(state.request_timeout, task).await {
        Err(_) => {
            tracing::warn!(
                timeout_secs = state.request_timeout.as_secs(),
                "report generation timed out"
            );
            Err((
                StatusCode::GATEWAY_TIMEOUT,
                format!(
                    "report not ready after {} seconds",
                    state.request_timeout.as_secs()
                ),
            ))
        }
        Ok(Err(join_err)) => Err((StatusCode::INTERNAL_SERVER_ERROR, join_err.to_string())),
        Ok(Ok(Err(err))) => {
            tracing::error!(error = %err, "report generation failed");
            Err((error_status(&err), err.to_string()))
        }
        Ok(Ok(Ok(report))) => Ok(report),
    }
}

/// GET / - HTML report page
async fn report_page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportParams>,
) -> Result<Html<String>, ApiError> {
    let report = build_report(&state, params).await?;
    let source = state.dataset_path.display().to_string();
    Ok(Html(render::html(&report, Some(&source))))
}

/// GET /api/report - Report as JSON
async fn report_json(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportParams>,
) -> Result<Json<Report>, ApiError> {
    build_report(&state, params).await.map(Json)
}
