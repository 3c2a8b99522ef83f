mod config;

use std::sync::Arc;

use anyhow::{ensure, Context};
use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use connect4::{GameEngine, GameError, GameStatus, MoveResult, Player, PlayerLabels};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::Mutex};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Largest board a client may ask for.
const MAX_DIMENSION: usize = 32;

const NO_STORE: [(header::HeaderName, &str); 1] = [(header::CACHE_CONTROL, "no-store")];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::parse();
    let app = app_router(&config)?;

    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    info!("Listening on http://{}", config.addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// The one session, shared by every request. The lock serializes drops.
#[derive(Clone)]
struct AppState {
    game: Arc<Mutex<GameEngine>>,
    width: usize,
    height: usize,
}

fn app_router(config: &Config) -> anyhow::Result<Router> {
    check_size(config.width, config.height).context("invalid default board size")?;
    let engine = GameEngine::create(config.width, config.height)
        .context("invalid default board size")?;
    let state = AppState {
        game: Arc::new(Mutex::new(engine)),
        width: config.width,
        height: config.height,
    };

    let api = Router::new()
        .route("/game", get(show_game).post(new_game))
        .route("/game/drop", post(drop_piece))
        .route("/game/reset", post(reset_game))
        .with_state(state);
    let page = ServeDir::new(&config.static_dir).append_index_html_on_directories(true);

    Ok(Router::new()
        .nest("/api", api)
        .fallback_service(page)
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_origin(axum::http::HeaderValue::from_static("*"))
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http()))
}

/// Everything the page needs to draw the board and the status line.
#[derive(Debug, Serialize, Deserialize)]
struct GameView {
    width: usize,
    height: usize,
    status: GameStatus,
    current_player: Player,
    labels: PlayerLabels,
    moves_played: usize,
    board: Vec<Vec<Option<Player>>>,
}

impl From<&GameEngine> for GameView {
    fn from(game: &GameEngine) -> Self {
        Self {
            width: game.width(),
            height: game.height(),
            status: game.status(),
            current_player: game.current_player(),
            labels: game.labels().clone(),
            moves_played: game.moves_played(),
            board: game.board().rows(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NewGameRequest {
    player1: Option<String>,
    player2: Option<String>,
    width: Option<usize>,
    height: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct DropRequest {
    column: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct MoveResponse {
    result: MoveResult,
    game: GameView,
}

async fn show_game(State(state): State<AppState>) -> impl IntoResponse {
    let game = state.game.lock().await;
    (NO_STORE, Json(GameView::from(&*game)))
}

async fn new_game(
    State(state): State<AppState>,
    Json(req): Json<NewGameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let width = req.width.unwrap_or(state.width);
    let height = req.height.unwrap_or(state.height);
    check_size(width, height)?;

    let defaults = PlayerLabels::default();
    let labels = PlayerLabels::new(
        req.player1.unwrap_or(defaults.one),
        req.player2.unwrap_or(defaults.two),
    );
    let engine = GameEngine::with_labels(width, height, labels)?;

    let mut game = state.game.lock().await;
    *game = engine;
    info!(width, height, "new game started");
    Ok((NO_STORE, Json(GameView::from(&*game))))
}

async fn drop_piece(
    State(state): State<AppState>,
    Json(req): Json<DropRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut game = state.game.lock().await;
    let result = game.drop_piece(req.column)?;
    let response = MoveResponse {
        result,
        game: GameView::from(&*game),
    };
    Ok((NO_STORE, Json(response)))
}

async fn reset_game(State(state): State<AppState>) -> impl IntoResponse {
    let mut game = state.game.lock().await;
    game.reset();
    (NO_STORE, Json(GameView::from(&*game)))
}

fn check_size(width: usize, height: usize) -> anyhow::Result<()> {
    ensure!(
        width <= MAX_DIMENSION && height <= MAX_DIMENSION,
        "board {width}x{height} exceeds the {MAX_DIMENSION}x{MAX_DIMENSION} limit"
    );
    Ok(())
}

#[derive(Debug)]
struct ApiError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<GameError>() {
            Some(GameError::ColumnFull { .. } | GameError::GameAlreadyOver) => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        };
        let body = format!("{}", self.0);
        (status, body).into_response()
    }
}
