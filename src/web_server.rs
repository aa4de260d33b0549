use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    serve, Form, Json, Router,
};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, instrument, warn};

use crate::app_state::{Phase, Submission, Workbench};
use crate::constants::{EXAMPLE_PROMPTS, GENERATION_FAILED_MESSAGE, SMBP_FILE_NAME, SMBP_MIME_TYPE};
use crate::gemini::GeminiClient;
use crate::schema::LogicResponse;
use crate::smbp;

#[derive(Debug, Error)]
pub enum WebError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("a generation is already in progress")]
    Busy,
    #[error("{}", GENERATION_FAILED_MESSAGE)]
    GenerationFailed,
    #[error("nothing has been generated yet")]
    NoResult,
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebError::Template(e) => {
                error!("Failed to get or render template: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(format!("Internal Server Error: {}", e)),
                )
                    .into_response();
            }
            WebError::EmptyPrompt => StatusCode::BAD_REQUEST,
            WebError::Busy => StatusCode::CONFLICT,
            WebError::GenerationFailed => StatusCode::BAD_GATEWAY,
            WebError::NoResult => StatusCode::NOT_FOUND,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

// Shared application state
#[derive(Clone)]
pub struct WebState {
    templates: Arc<AutoReloader>,
    workbench: Arc<RwLock<Workbench>>,
    client: Arc<GeminiClient>,
}

impl WebState {
    pub fn new(client: GeminiClient) -> Result<Self> {
        let templates = create_minijinja_env().context("Failed to initialize template engine")?;
        Ok(Self {
            templates: Arc::new(templates),
            workbench: Arc::new(RwLock::new(Workbench::new())),
            client: Arc::new(client),
        })
    }
}

/// Snapshot of the workbench as exposed to the page and `/api/state`.
#[derive(Debug, Serialize)]
struct StateView {
    phase: Phase,
    prompt: String,
    error: Option<String>,
    result: Option<LogicResponse>,
}

impl From<&Workbench> for StateView {
    fn from(bench: &Workbench) -> Self {
        Self {
            phase: bench.phase(),
            prompt: bench.prompt().to_string(),
            error: bench.error().map(str::to_string),
            result: bench.result().cloned(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PromptForm {
    #[serde(default)]
    prompt: String,
}

// Minijinja Environment setup
fn create_minijinja_env() -> Result<AutoReloader> {
    let reloader = AutoReloader::new(|notifier| {
        let loader = path_loader("templates");
        let mut env = Environment::new();
        env.set_loader(loader);
        notifier.watch_path("templates", true);
        Ok(env)
    });
    Ok(reloader)
}

async fn index_handler(State(state): State<WebState>) -> Result<Html<String>, WebError> {
    let view = StateView::from(&*state.workbench.read().await);
    let all_instruction_lines = view
        .result
        .as_ref()
        .map(LogicResponse::joined_instruction_lines)
        .unwrap_or_default();

    let env = state.templates.acquire_env()?;
    let tmpl = env.get_template("index.html")?;
    let html = tmpl.render(minijinja::context! {
        title => "EcoLogic M221",
        model => state.client.model(),
        examples => EXAMPLE_PROMPTS,
        file_name => SMBP_FILE_NAME,
        all_instruction_lines => all_instruction_lines,
        state => view,
    })?;
    Ok(Html(html))
}

/// Runs an accepted submission to completion and records it in the workbench.
///
/// The call runs in its own task so a client that disconnects cannot leave the
/// workbench stuck in the loading phase.
async fn generate_and_store(state: WebState, prompt: String) -> Result<LogicResponse, WebError> {
    let task = tokio::spawn(async move {
        let outcome = state.client.generate(&prompt).await;
        let reply = outcome.as_ref().ok().cloned();
        state.workbench.write().await.complete(outcome);
        reply
    });

    match task.await {
        Ok(Some(logic)) => Ok(logic),
        Ok(None) => Err(WebError::GenerationFailed),
        Err(e) => {
            error!("Generation task failed: {:?}", e);
            Err(WebError::GenerationFailed)
        }
    }
}

#[instrument(skip_all)]
async fn generate_form_handler(
    State(state): State<WebState>,
    Form(form): Form<PromptForm>,
) -> Redirect {
    let submission = state.workbench.write().await.submit(&form.prompt);
    if let Submission::Accepted(prompt) = submission {
        // Failures are already recorded in the workbench and shown on the page.
        if generate_and_store(state, prompt).await.is_err() {
            warn!("Form submission finished with a generation error");
        }
    }
    Redirect::to("/")
}

#[instrument(skip_all)]
async fn api_generate_handler(
    State(state): State<WebState>,
    Json(form): Json<PromptForm>,
) -> Result<Json<LogicResponse>, WebError> {
    let submission = state.workbench.write().await.submit(&form.prompt);
    match submission {
        Submission::Accepted(prompt) => Ok(Json(generate_and_store(state, prompt).await?)),
        Submission::EmptyPrompt => Err(WebError::EmptyPrompt),
        Submission::Busy => Err(WebError::Busy),
    }
}

async fn state_handler(State(state): State<WebState>) -> Json<StateView> {
    Json(StateView::from(&*state.workbench.read().await))
}

async fn download_handler(State(state): State<WebState>) -> Result<impl IntoResponse, WebError> {
    let bench = state.workbench.read().await;
    let logic = bench.result().ok_or(WebError::NoResult)?;
    let body = smbp::to_download_bytes(logic);
    info!(bytes = body.len(), rungs = logic.rungs.len(), "Serving .smbp download");

    Ok((
        [
            (header::CONTENT_TYPE, SMBP_MIME_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", SMBP_FILE_NAME),
            ),
        ],
        body,
    ))
}

/// Builds the application router; static assets are served from `static/`.
pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/generate", post(generate_form_handler))
        .route("/download", get(download_handler))
        .route("/api/generate", post(api_generate_handler))
        .route("/api/state", get(state_handler))
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state)
        .layer(TraceLayer::new_for_http()) // Add request logging
}

pub async fn start_web_server(port: u16, state: WebState) -> Result<()> {
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
