// ============================================================
// Layer 1 - Web Shell
// ============================================================
// HTTP front end over the application layer (axum 0.7).
//
//   GET  /             form page
//   POST /             form field `review_text` -> label name
//   POST /retrain      rerun the pipeline, publish, checkpoint
//   POST /api/predict  {"text": ...} -> {"label", "sentiment"}
//   GET  /healthz      liveness
//
// The pipeline is CPU-bound, so /retrain runs it on the blocking
// pool. Only one retrain runs at a time: a second request while
// one is in flight gets 409. Predictions keep using the previous
// Selection until the new one is published.

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::application::predict_use_case::PredictUseCase;
use crate::application::selection_store::SelectionStore;
use crate::application::train_use_case::{PipelineConfig, PipelineOutcome, TrainUseCase};
use crate::domain::error::SentimentError;
use crate::domain::traits::{SentimentPredictor, TrackingSink};

const NOT_READY: &str = "Please retrain the pipeline first!";
const RETRAINED: &str = "Pipeline retrained successfully!";

#[derive(Clone)]
pub struct AppState {
    store:      Arc<SelectionStore>,
    predictor:  Arc<PredictUseCase>,
    config:     Arc<PipelineConfig>,
    sink:       Arc<dyn TrackingSink>,
    retraining: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(config: PipelineConfig, sink: Arc<dyn TrackingSink>, store: Arc<SelectionStore>) -> Self {
        let predictor = PredictUseCase::new(Arc::clone(&store), config.reconstruction);
        Self {
            store,
            predictor: Arc::new(predictor),
            config: Arc::new(config),
            sink,
            retraining: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Full pipeline run, then checkpoint (best effort) and publish.
    fn retrain_blocking(&self) -> Result<PipelineOutcome> {
        let use_case = TrainUseCase::new((*self.config).clone(), Arc::clone(&self.sink));
        let outcome  = use_case.execute()?;
        if let Err(e) = use_case.persist(&outcome) {
            tracing::warn!("Retrained model not checkpointed: {e:#}");
        }
        self.store.publish(outcome.selection.clone());
        Ok(outcome)
    }
}

/// Clears the retrain flag when the retrain ends, even by panic.
struct RetrainGuard(Arc<AtomicBool>);

impl Drop for RetrainGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .route("/retrain", post(retrain))
        .route("/api/predict", post(api_predict))
        .route("/healthz", get(healthz))
        .with_state(state)
}

pub async fn serve(bind: &str, state: AppState) -> Result<()> {
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address {bind}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("review-sentiment listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server shutdown")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

// ─── Handlers ─────────────────────────────────────────────────────────────────
#[derive(Debug, Default, Deserialize)]
pub struct ReviewForm {
    #[serde(default, alias = "news_text")]
    review_text: String,
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    text: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    label:     usize,
    sentiment: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    message: String,
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn index() -> Html<String> {
    Html(render_page("", None, None))
}

async fn submit(State(state): State<AppState>, Form(form): Form<ReviewForm>) -> Html<String> {
    let page = match state.predictor.predict(&form.review_text) {
        Ok(label) => render_page(&form.review_text, Some(label.name()), None),
        Err(SentimentError::NotReady) => render_page(&form.review_text, None, Some(NOT_READY)),
        Err(e) => {
            tracing::warn!("Form prediction failed: {e}");
            render_page(&form.review_text, None, Some(&e.to_string()))
        }
    };
    Html(page)
}

async fn retrain(State(state): State<AppState>) -> (StatusCode, Html<String>) {
    if state.retraining.swap(true, Ordering::AcqRel) {
        return (
            StatusCode::CONFLICT,
            Html(render_page("", None, Some("A retrain is already running."))),
        );
    }
    let guard  = RetrainGuard(Arc::clone(&state.retraining));
    let worker = state.clone();

    let joined = tokio::task::spawn_blocking(move || {
        let _guard = guard;
        worker.retrain_blocking()
    })
    .await;

    match joined {
        Ok(Ok(_)) => (StatusCode::OK, Html(render_page("", None, Some(RETRAINED)))),
        Ok(Err(e)) => {
            tracing::warn!("Retrain failed: {e:#}");
            let message = format!("Retrain failed: {e:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(render_page("", None, Some(&message))))
        }
        Err(e) => {
            tracing::warn!("Retrain task aborted: {e}");
            let message = format!("Retrain aborted: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(render_page("", None, Some(&message))))
        }
    }
}

async fn api_predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, (StatusCode, Json<ErrorBody>)> {
    match state.predictor.predict_value(&request.text) {
        Ok(label) => Ok(Json(PredictResponse {
            label:     label.index(),
            sentiment: label.name().to_string(),
        })),
        Err(e @ SentimentError::InvalidInput(_)) => Err(bad_request(e.to_string())),
        Err(SentimentError::NotReady) => Err(service_unavailable(NOT_READY)),
        Err(e) => Err(internal_error(e.into())),
    }
}

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::BAD_REQUEST, Json(ErrorBody { message: message.into() }))
}

fn service_unavailable(message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::SERVICE_UNAVAILABLE, Json(ErrorBody { message: message.into() }))
}

fn internal_error(err: anyhow::Error) -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { message: err.to_string() }))
}

// ─── Page ─────────────────────────────────────────────────────────────────────
fn render_page(review_text: &str, prediction: Option<&str>, message: Option<&str>) -> String {
    let mut body = String::new();
    if let Some(label) = prediction {
        body.push_str(&format!("<p class=\"prediction\">Predicted sentiment: <b>{}</b></p>\n", escape_html(label)));
    }
    if let Some(message) = message {
        body.push_str(&format!("<p class=\"message\">{}</p>\n", escape_html(message)));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Product Review Sentiment</title></head>
<body>
<h1>Product Review Sentiment</h1>
<form method="post" action="/">
<textarea name="review_text" rows="6" cols="60">{text}</textarea><br>
<button type="submit">Predict</button>
</form>
<form method="post" action="/retrain">
<button type="submit">Retrain pipeline</button>
</form>
{body}</body>
</html>
"#,
        text = escape_html(review_text),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
