use crate::clock::Clock;
use crate::error::AppError;
use crate::structs::DailyPrayerTimes;
use crate::{assets, pages, PrayerBoard};
use axum::{
    extract::{Json, Path, Query, State},
    response::Html,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub board: PrayerBoard,
    pub clock: Arc<dyn Clock>,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct MosqueQuery {
    pub mosque_id: Option<String>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/mosque/:mosque_id", get(mosque_details))
        .route("/schedule", get(schedule))
        .route("/api/prayer-times/:mosque_id/:date", get(api_prayer_times))
        .route("/health", get(health))
        .route("/static/*path", get(assets::serve))
        .with_state(state)
}

// `curl -X GET http://localhost:8081/health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "up" }))
}

// `curl -X GET 'http://localhost:8081/?mosque_id=al-noor'`
pub async fn home(
    State(state): State<AppState>,
    Query(query): Query<MosqueQuery>,
) -> Result<Html<String>, AppError> {
    let view = state.board.home(query.mosque_id.as_deref(), state.clock.now())?;
    Ok(Html(pages::home(&view)))
}

// `curl -X GET http://localhost:8081/mosque/al-noor`
pub async fn mosque_details(
    Path(mosque_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Html<String>, AppError> {
    let view = state.board.mosque(&mosque_id, state.clock.now().date())?;
    Ok(Html(pages::mosque(&view)))
}

// `curl -X GET 'http://localhost:8081/schedule?mosque_id=al-noor'`
pub async fn schedule(
    State(state): State<AppState>,
    Query(query): Query<MosqueQuery>,
) -> Result<Html<String>, AppError> {
    let view = state
        .board
        .schedule(query.mosque_id.as_deref(), state.clock.now().date())?;
    Ok(Html(pages::schedule(&view)))
}

// `curl -X GET http://localhost:8081/api/prayer-times/al-noor/2024-03-11`
pub async fn api_prayer_times(
    Path((mosque_id, date)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<DailyPrayerTimes>, AppError> {
    state.board.prayer_times(&mosque_id, &date).map(Json)
}
