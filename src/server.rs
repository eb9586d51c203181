//! HTTP surface: `/ranges`, `/bundle`, `/stream` and `/guess`.

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use futures_util::stream;
use log::{error, info};
use serde_json::json;

use crate::assets::{AssetSource, SoundLibrary};
use crate::bundle::{Bundle, BundleGenerator};
use crate::config::EngineConfig;
use crate::error::{GameError, Result, StatusClass};
use crate::guess::{GuessEvaluator, GuessOutcome};
use crate::session::GameSession;
use crate::transport::{BundlePayload, CACHE_CONTROL, MultipartBody, STREAM_CHUNK_SIZE};

#[derive(Clone)]
pub struct AppState {
    generator: Arc<BundleGenerator>,
    evaluator: GuessEvaluator,
}

impl AppState {
    /// Wire a generator and an evaluator to the same session.
    pub fn new(generator: BundleGenerator) -> Self {
        let evaluator = GuessEvaluator::new(generator.session().clone());
        Self {
            generator: Arc::new(generator),
            evaluator,
        }
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = match self.status_class() {
            StatusClass::NotFound => StatusCode::NOT_FOUND,
            StatusClass::BadRequest => StatusCode::BAD_REQUEST,
            StatusClass::Internal => {
                error!("Request failed: {self}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({"ok": false, "error": self.to_string()}))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ranges", get(ranges))
        .route("/bundle", get(bundle))
        .route("/stream", get(stream_bundle))
        .route("/guess", get(guess))
        .with_state(state)
}

pub async fn run_server(cfg: EngineConfig) -> Result<()> {
    let addr: SocketAddr = cfg
        .listen_addr
        .parse()
        .map_err(|e| GameError::InvalidConfig(format!("invalid listen_addr: {e}")))?;

    let assets: Arc<dyn AssetSource> = Arc::new(SoundLibrary::new(&cfg.sounds_dir));
    let generator = BundleGenerator::new(&cfg, assets, Arc::new(GameSession::new()))?;
    let app = router(AppState::new(generator));

    info!("EQ trainer listening on {addr}, sounds from {}", cfg.sounds_dir.display());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Rendering is CPU-bound, so it runs off the async workers.
async fn render_round(st: &AppState) -> Result<Bundle> {
    let generator = Arc::clone(&st.generator);
    tokio::task::spawn_blocking(move || generator.generate())
        .await
        .map_err(|e| GameError::Io(std::io::Error::other(e)))?
}

// ── GET /ranges ─────────────────────────────────────────────

async fn ranges(State(st): State<AppState>) -> impl IntoResponse {
    Json(st.generator.catalog().clone())
}

// ── GET /bundle ─────────────────────────────────────────────

async fn bundle(State(st): State<AppState>) -> Result<Response> {
    let bundle = render_round(&st).await?;
    let payload = BundlePayload::new(&bundle, st.generator.catalog());
    Ok(([(header::CACHE_CONTROL, CACHE_CONTROL)], Json(payload)).into_response())
}

// ── GET /stream ─────────────────────────────────────────────

async fn stream_bundle(State(st): State<AppState>) -> Result<Response> {
    let bundle = render_round(&st).await?;
    let chunks = MultipartBody::new(&bundle).into_chunks(STREAM_CHUNK_SIZE);
    let body = Body::from_stream(stream::iter(chunks.into_iter().map(Ok::<_, Infallible>)));
    let headers = [
        (header::CONTENT_TYPE, MultipartBody::content_type()),
        (header::CACHE_CONTROL, CACHE_CONTROL.to_string()),
    ];
    Ok((headers, body).into_response())
}

// ── GET /guess?min=&max= ────────────────────────────────────

async fn guess(
    State(st): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<GuessOutcome>> {
    let outcome = st.evaluator.evaluate_raw(
        params.get("min").map(String::as_str),
        params.get("max").map(String::as_str),
    )?;
    Ok(Json(outcome))
}
