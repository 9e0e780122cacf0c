use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use super::JsonBody;
use crate::error::BookingError;
use crate::models::NewMovieSession;
use crate::views::{MovieSessionCreated, MovieSessionDetail, MovieSessionListItem};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movie_sessions", get(list_movie_sessions).post(create_movie_session))
        .route("/movie_sessions/{id}", get(get_movie_session))
}

// GET /api/movie_sessions
// tickets_available пересчитывается на каждый запрос
async fn list_movie_sessions(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, BookingError> {
    let sessions = state.store.list_movie_sessions().await?;
    Ok(Json(sessions.iter().map(MovieSessionListItem::from).collect::<Vec<_>>()))
}

// GET /api/movie_sessions/{id}
async fn get_movie_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, BookingError> {
    let session = state
        .store
        .find_movie_session(id)
        .await?
        .ok_or(BookingError::NotFound { resource: "movie session", id })?;
    let movie = state
        .store
        .find_movie(session.movie_id)
        .await?
        .ok_or(BookingError::NotFound { resource: "movie", id: session.movie_id })?;
    let taken_places = state.store.taken_places(session.id).await?;

    Ok(Json(MovieSessionDetail::project(&session, &movie, taken_places)))
}

// POST /api/movie_sessions
async fn create_movie_session(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<NewMovieSession>,
) -> Result<impl IntoResponse, BookingError> {
    let session = state.store.create_movie_session(&req).await?;
    Ok((StatusCode::CREATED, Json(MovieSessionCreated::from(&session))))
}
