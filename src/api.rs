//! HTTP API driving the game flow.
//!
//! These endpoints replace the setup and game pages: a frontend posts the
//! setup, then steps through the reveal one request at a time.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::controller::{GameController, SessionView, StartReport};
use crate::error::GameError;
use crate::history::MAX_HISTORY_SIZE;
use crate::session::SavedDefaults;
use crate::setup::{imposter_options, GameSetup, MIN_PLAYERS};
use crate::store::StoreError;

/// Error body, `{ "code": "...", "msg": "..." }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub msg: String,
}

pub struct ApiError(GameError);

impl From<GameError> for ApiError {
    fn from(e: GameError) -> Self {
        Self(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self(GameError::Storage(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            GameError::InvalidConfiguration(_) | GameError::PlayerOutOfRange { .. } => {
                StatusCode::BAD_REQUEST
            }
            GameError::NoActiveSession => StatusCode::NOT_FOUND,
            GameError::InvalidTransition { .. }
            | GameError::StartInFlight
            | GameError::StartCancelled => StatusCode::CONFLICT,
            GameError::WordSourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GameError::CorruptPersistedState(_) | GameError::Storage(_) => {
                tracing::error!("Request failed: {}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorBody {
            code: self.0.code().to_string(),
            msg: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Build the API router
pub fn router(controller: Arc<GameController>) -> Router {
    Router::new()
        .route("/api/setup", get(setup_info))
        .route(
            "/api/game",
            get(current_game).post(start_game).delete(reset_game),
        )
        .route("/api/game/cancel", post(cancel_start))
        .route("/api/game/begin", post(begin))
        .route("/api/game/reveal", post(reveal))
        .route("/api/game/advance", post(advance))
        .route("/api/game/restart", post(restart))
        .route("/api/history", get(history).delete(clear_history))
        .with_state(controller)
}

#[derive(Debug, Deserialize)]
pub struct SetupQuery {
    pub players: Option<usize>,
}

/// Setup screen data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupInfo {
    pub defaults: SavedDefaults,
    pub min_players: usize,
    /// Imposter counts offered for the requested (or remembered) roster size
    pub imposter_options: Vec<usize>,
}

/// GET /api/setup?players=N
pub async fn setup_info(
    State(controller): State<Arc<GameController>>,
    Query(query): Query<SetupQuery>,
) -> Json<SetupInfo> {
    let defaults = controller.saved_defaults().await;
    let player_count = query
        .players
        .or_else(|| defaults.players.as_ref().map(Vec::len))
        .unwrap_or(MIN_PLAYERS);

    Json(SetupInfo {
        defaults,
        min_players: MIN_PLAYERS,
        imposter_options: imposter_options(player_count).collect(),
    })
}

/// POST /api/game
pub async fn start_game(
    State(controller): State<Arc<GameController>>,
    Json(setup): Json<GameSetup>,
) -> ApiResult<StartReport> {
    Ok(Json(controller.start_game(setup).await?))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}

/// POST /api/game/cancel
pub async fn cancel_start(State(controller): State<Arc<GameController>>) -> Json<CancelResponse> {
    Json(CancelResponse {
        cancelled: controller.cancel_start(),
    })
}

/// GET /api/game
///
/// 404 `NO_SESSION` tells the frontend to go back to setup.
pub async fn current_game(State(controller): State<Arc<GameController>>) -> ApiResult<SessionView> {
    Ok(Json(controller.resume().await?))
}

/// POST /api/game/begin
pub async fn begin(State(controller): State<Arc<GameController>>) -> ApiResult<SessionView> {
    Ok(Json(controller.begin().await?))
}

/// POST /api/game/reveal
pub async fn reveal(State(controller): State<Arc<GameController>>) -> ApiResult<SessionView> {
    Ok(Json(controller.reveal().await?))
}

/// POST /api/game/advance
pub async fn advance(State(controller): State<Arc<GameController>>) -> ApiResult<SessionView> {
    Ok(Json(controller.advance().await?))
}

/// POST /api/game/restart
pub async fn restart(State(controller): State<Arc<GameController>>) -> ApiResult<SessionView> {
    Ok(Json(controller.restart().await?))
}

/// DELETE /api/game
pub async fn reset_game(
    State(controller): State<Arc<GameController>>,
) -> Result<StatusCode, ApiError> {
    controller.reset().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryInfo {
    pub count: usize,
    pub capacity: usize,
}

/// GET /api/history
pub async fn history(State(controller): State<Arc<GameController>>) -> Json<HistoryInfo> {
    Json(HistoryInfo {
        count: controller.history_len().await,
        capacity: MAX_HISTORY_SIZE,
    })
}

/// DELETE /api/history
pub async fn clear_history(
    State(controller): State<Arc<GameController>>,
) -> Result<StatusCode, ApiError> {
    controller.clear_history().await?;
    Ok(StatusCode::NO_CONTENT)
}
