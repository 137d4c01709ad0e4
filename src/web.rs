use crate::backend::Backend;
use crate::markup::Palette;
use crate::query::normalize_selection;
use crate::resolve::{Resolution, Resolver, ResultKind};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn};

type SharedState<B> = Arc<AppState<B>>;

pub struct AppState<B> {
    pub resolver: Resolver<B>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WebTheme {
    #[default]
    Light,
    Dark,
}

impl WebTheme {
    pub fn palette(self) -> Palette {
        match self {
            WebTheme::Light => Palette::light(),
            WebTheme::Dark => Palette::dark(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebConfig {
    pub addr: SocketAddr,
    /// Attach a permissive CORS layer.
    pub cors: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            cors: false,
        }
    }
}

#[derive(Debug)]
pub enum WebError {
    Io(std::io::Error),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for WebError {}

impl From<std::io::Error> for WebError {
    fn from(value: std::io::Error) -> Self {
        WebError::Io(value)
    }
}

pub async fn serve<B: Backend + 'static>(
    config: WebConfig,
    resolver: Resolver<B>,
) -> Result<(), WebError> {
    let state = Arc::new(AppState { resolver });
    let router = build_router(state, config.cors);
    info!(%config.addr, cors = config.cors, "Binding HTTP listener");
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server exited");
    Ok(())
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.message });
        (self.status, Json(payload)).into_response()
    }
}

fn build_router<B: Backend + 'static>(state: SharedState<B>, cors: bool) -> Router {
    let router = Router::new()
        .route("/api/define", get(api_define::<B>))
        .route("/api/random", get(api_random::<B>))
        .route("/healthz", get(health))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        );
    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "reo-web" }))
}

#[derive(Debug, Deserialize)]
struct DefineParams {
    q: Option<String>,
    #[serde(default)]
    theme: WebTheme,
}

#[derive(Debug, Deserialize)]
struct ThemeParams {
    #[serde(default)]
    theme: WebTheme,
}

#[derive(Debug, Serialize)]
struct RandomPayload {
    word: String,
    resolution: Resolution,
}

async fn api_define<B: Backend + 'static>(
    State(state): State<SharedState<B>>,
    Query(params): Query<DefineParams>,
) -> Result<Json<Resolution>, ApiError> {
    let raw = normalize_selection(params.q.as_deref().unwrap_or_default());
    let resolution = state
        .resolver
        .resolve(&raw, &params.theme.palette())
        .await;
    match resolution.kind {
        ResultKind::EmptyInput | ResultKind::InvalidInput => {
            Err(ApiError::bad_request(resolution.text))
        }
        ResultKind::Exit => Err(ApiError::bad_request("exit phrases have no meaning here")),
        ResultKind::Found | ResultKind::Miss => Ok(Json(resolution)),
    }
}

async fn api_random<B: Backend + 'static>(
    State(state): State<SharedState<B>>,
    Query(params): Query<ThemeParams>,
) -> Result<Json<RandomPayload>, ApiError> {
    let word = state.resolver.random_word().await.map_err(|err| {
        warn!(error = %err, "random word failed");
        ApiError::internal(err.to_string())
    })?;
    let resolution = state
        .resolver
        .resolve(&word, &params.theme.palette())
        .await;
    Ok(Json(RandomPayload { word, resolution }))
}
