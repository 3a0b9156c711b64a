use std::io::ErrorKind;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::{routing::get, Form, Router};
use thiserror::Error;
use tokio::task;
use tracing::{debug, error};

use librarian_core::{
    Diagnostics, FieldSchema, FormView, LibrarianConfig, LibrarianPage, Submission, ToolCommand,
    ToolRunner,
};

pub struct AppState {
    schema: &'static FieldSchema,
    config: LibrarianConfig,
    runner: ToolRunner,
}

impl AppState {
    pub fn new(config: LibrarianConfig) -> Self {
        Self {
            schema: FieldSchema::global(),
            runner: config.runner(),
            config,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let image_route = format!("/{}", state.config.image_name);
    Router::new()
        .route("/", get(show_form).post(submit_form))
        .route(&image_route, get(serve_image))
        .with_state(state)
}

async fn show_form(
    State(state): State<Arc<AppState>>,
    Query(submission): Query<Submission>,
) -> Result<Html<String>, AppError> {
    handle_submission(state, submission).await
}

async fn submit_form(
    State(state): State<Arc<AppState>>,
    Form(submission): Form<Submission>,
) -> Result<Html<String>, AppError> {
    handle_submission(state, submission).await
}

async fn handle_submission(
    state: Arc<AppState>,
    submission: Submission,
) -> Result<Html<String>, AppError> {
    let descriptors = submission.decode_all(state.schema);
    let diagnostics = if submission.is_first_visit() {
        None
    } else {
        let command = ToolCommand::for_schema(
            state.schema,
            &state.config.tool_dir,
            &state.config.tool_name,
            &descriptors,
        )
        .map_err(AppError::internal)?;
        Some(run_tool(state.runner.clone(), command).await?)
    };
    let form = FormView::build(state.schema, &descriptors).map_err(AppError::internal)?;
    let mut page = LibrarianPage::new(&form, &state.config.image_name);
    if submission.update_requested() {
        page = page.cache_bust(rand::random());
    }
    if let Some(diagnostics) = diagnostics
        .as_ref()
        .filter(|_| state.config.echo_diagnostics)
    {
        page = page.diagnostics(diagnostics);
    }
    let html = page.to_html().map_err(AppError::internal)?;
    Ok(Html(html))
}

/// Runs the tool on a blocking thread and waits for it; no timeout.
async fn run_tool(runner: ToolRunner, command: ToolCommand) -> Result<Diagnostics, AppError> {
    let command_line = command.command_line();
    let result = task::spawn_blocking(move || runner.run(&command))
        .await
        .map_err(AppError::internal)?;
    let diagnostics = match result {
        Ok(outcome) => Diagnostics::from_outcome(&outcome),
        Err(err) => {
            error!(command = %command_line, "lookup_failed" = %err);
            Diagnostics::from_error(&command_line, &err)
        }
    };
    for line in diagnostics.lines() {
        debug!("//{line}");
    }
    Ok(diagnostics)
}

async fn serve_image(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let path = state.config.image_path();
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            Ok((
                [
                    (header::CONTENT_TYPE, mime.as_ref().to_string()),
                    (header::CACHE_CONTROL, "no-cache".to_string()),
                ],
                bytes,
            )
                .into_response())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Err(AppError::NotFound(format!(
            "{} has not been generated yet",
            state.config.image_name
        ))),
        Err(err) => Err(AppError::internal(err)),
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn internal<E: Into<anyhow::Error>>(err: E) -> Self {
        Self::Internal(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            AppError::Internal(err) => {
                error!("internal_error" = %err);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
            }
        }
    }
}
