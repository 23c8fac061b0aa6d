// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Web UI: upload page, analysis API and report downloads

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::batch::{BatchOrchestrator, CancelSignal};
use crate::client::AnalysisClient;
use crate::config::AppConfig;
use crate::controller::{AnalysisPhase, FileFailure, Session, ANALYSIS_FAILED_MESSAGE};
use crate::model::ResumeResult;
use crate::render::html::{render_page, PageView};
use crate::render::pdf::{render_pdf, report_file_name};
use crate::theme::{Theme, ThemeState, ThemeStore};
use crate::upload::ResumeFile;
use crate::{ResumatchError, Result};

/// Shared application state
pub struct AppState {
    pub session: Mutex<Session>,
    pub orchestrator: BatchOrchestrator,
    pub config: AppConfig,
}

impl AppState {
    /// Wire the real analysis client and persisted theme from config
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let client = AnalysisClient::new(&config.service.url)?;
        let orchestrator = BatchOrchestrator::from_config(Arc::new(client), &config.service);
        let theme = ThemeState::init(ThemeStore::new(&config.theme.store_path));

        Ok(Self {
            session: Mutex::new(Session::new(&config, theme)),
            orchestrator,
            config,
        })
    }
}

/// Create the web application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.web.max_body_bytes;

    Router::new()
        // Pages
        .route("/", get(index_page))
        .route("/health", get(health))
        // API endpoints
        .route("/api/state", get(api_get_state))
        .route("/api/files", post(api_add_files))
        .route("/api/files/:index", delete(api_remove_file))
        .route("/api/job-description", put(api_set_job_description))
        .route("/api/analyze", post(api_analyze))
        .route("/api/results", get(api_get_results))
        .route("/api/results/:id/report.pdf", get(api_report_pdf))
        .route("/api/theme/toggle", post(api_toggle_theme))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// JSON error body `{ "error": "..." }`
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({ "error": self.1 }))).into_response()
    }
}

impl From<ResumatchError> for ApiError {
    fn from(e: ResumatchError) -> Self {
        match e {
            ResumatchError::Validation(msg) => ApiError(StatusCode::BAD_REQUEST, msg),
            other => {
                error!("Request failed: {}", other);
                ApiError(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        }
    }
}

// === Page Handlers ===

async fn index_page(State(state): State<Arc<AppState>>) -> std::result::Result<Html<String>, ApiError> {
    let session = state.session.lock().await;
    let html = render_page(&PageView::new(&session.input, &session.controller))?;
    Ok(Html(html))
}

async fn health() -> &'static str {
    "ok"
}

// === API Handlers ===

#[derive(Serialize)]
struct FileEntry {
    name: String,
    size: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StateResponse {
    files: Vec<FileEntry>,
    job_description: String,
    loading: bool,
    phase: AnalysisPhase,
    error: Option<String>,
    theme: Theme,
    results: Vec<ResumeResult>,
    failures: Vec<FileFailure>,
}

impl StateResponse {
    fn of(session: &Session) -> Self {
        let controller = &session.controller;
        Self {
            files: controller
                .files()
                .iter()
                .map(|f| FileEntry {
                    name: f.name().to_string(),
                    size: f.size(),
                })
                .collect(),
            job_description: controller.job_description().to_string(),
            loading: controller.is_loading(),
            phase: controller.phase(),
            error: controller.error().map(String::from),
            theme: controller.theme(),
            results: controller.results().to_vec(),
            failures: controller.failures().to_vec(),
        }
    }
}

async fn api_get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    let session = state.session.lock().await;
    Json(StateResponse::of(&session))
}

async fn api_add_files(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> std::result::Result<Json<StateResponse>, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        let Some(name) = field.file_name().map(String::from) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError(StatusCode::BAD_REQUEST, e.to_string()))?;
        debug!("Received {} ({} bytes)", name, bytes.len());
        files.push(ResumeFile::new(name, bytes.to_vec()));
    }

    let mut session = state.session.lock().await;
    session.add_dropped(files);
    Ok(Json(StateResponse::of(&session)))
}

async fn api_remove_file(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Json<StateResponse> {
    let mut session = state.session.lock().await;
    session.remove_file(index);
    Json(StateResponse::of(&session))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobDescriptionBody {
    job_description: String,
}

async fn api_set_job_description(
    State(state): State<Arc<AppState>>,
    Json(body): Json<JobDescriptionBody>,
) -> Json<StateResponse> {
    let mut session = state.session.lock().await;
    session.set_job_description(body.job_description);
    Json(StateResponse::of(&session))
}

async fn api_analyze(
    State(state): State<Arc<AppState>>,
) -> std::result::Result<Json<StateResponse>, ApiError> {
    let request = {
        let mut session = state.session.lock().await;
        if session.controller.is_loading() {
            return Err(ApiError(
                StatusCode::CONFLICT,
                "An analysis is already running".to_string(),
            ));
        }
        session.controller.begin_analysis()?
    };

    // the batch runs in its own task so a dropped request still finishes the run
    let task_state = state.clone();
    let run = tokio::spawn(async move {
        let outcome = request.run(&task_state.orchestrator, &CancelSignal::never()).await;
        let mut session = task_state.session.lock().await;
        session.controller.finish_analysis(outcome);
        (session.controller.phase(), StateResponse::of(&session))
    });

    let (phase, snapshot) = match run.await {
        Ok(finished) => finished,
        Err(e) => {
            error!("Analysis task failed: {}", e);
            let mut session = state.session.lock().await;
            session
                .controller
                .finish_analysis(Err(ResumatchError::Server(e.to_string())));
            (session.controller.phase(), StateResponse::of(&session))
        }
    };

    if phase == AnalysisPhase::Failed {
        return Err(ApiError(StatusCode::BAD_GATEWAY, ANALYSIS_FAILED_MESSAGE.to_string()));
    }
    Ok(Json(snapshot))
}

async fn api_get_results(State(state): State<Arc<AppState>>) -> Json<Vec<ResumeResult>> {
    let session = state.session.lock().await;
    Json(session.controller.results().to_vec())
}

async fn api_report_pdf(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> std::result::Result<Response, ApiError> {
    let result = {
        let session = state.session.lock().await;
        session
            .controller
            .find_result(&id)
            .cloned()
            .ok_or_else(|| ApiError(StatusCode::NOT_FOUND, format!("No result with id {}", id)))?
    };

    let bytes = render_pdf(&result)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        report_file_name(&result.file_name).replace('"', "'")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThemeResponse {
    theme: Theme,
    dark_mode: bool,
}

async fn api_toggle_theme(
    State(state): State<Arc<AppState>>,
) -> std::result::Result<Json<ThemeResponse>, ApiError> {
    let mut session = state.session.lock().await;
    let theme = session.controller.toggle_theme()?;
    Ok(Json(ThemeResponse {
        theme,
        dark_mode: theme.is_dark(),
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}

/// Start the web server with config
pub async fn start_server(config: AppConfig) -> Result<()> {
    let addr = format!("{}:{}", config.web.host, config.web.port);
    let state = Arc::new(AppState::from_config(config)?);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Web UI available at http://{}", addr);

    let router = create_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ResumatchError::Server(format!("Server error: {}", e)))?;

    Ok(())
}
