//! Справочные данные: жанры, актёры, залы и фильмы.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use validator::Validate;

use super::JsonBody;
use crate::error::BookingError;
use crate::models::{NewActor, NewCinemaHall, NewGenre, NewMovie};
use crate::views::{ActorView, CinemaHallView, MovieCreated, MovieDetail, MovieListItem};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/genres", get(list_genres).post(create_genre))
        .route("/actors", get(list_actors).post(create_actor))
        .route("/cinema_halls", get(list_cinema_halls).post(create_cinema_hall))
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movies/{id}", get(get_movie))
}

/* ---------- GENRES ---------- */

async fn list_genres(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, BookingError> {
    let genres = state.store.list_genres().await?;
    Ok(Json(genres))
}

async fn create_genre(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<NewGenre>,
) -> Result<impl IntoResponse, BookingError> {
    req.validate()?;
    let genre = state.store.create_genre(&req).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

/* ---------- ACTORS ---------- */

async fn list_actors(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, BookingError> {
    let actors = state.store.list_actors().await?;
    Ok(Json(actors.iter().map(ActorView::from).collect::<Vec<_>>()))
}

async fn create_actor(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<NewActor>,
) -> Result<impl IntoResponse, BookingError> {
    req.validate()?;
    let actor = state.store.create_actor(&req).await?;
    Ok((StatusCode::CREATED, Json(ActorView::from(&actor))))
}

/* ---------- CINEMA HALLS ---------- */

async fn list_cinema_halls(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, BookingError> {
    let halls = state.store.list_cinema_halls().await?;
    Ok(Json(halls.iter().map(CinemaHallView::from).collect::<Vec<_>>()))
}

async fn create_cinema_hall(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<NewCinemaHall>,
) -> Result<impl IntoResponse, BookingError> {
    req.validate()?;
    let hall = state.store.create_cinema_hall(&req).await?;
    Ok((StatusCode::CREATED, Json(CinemaHallView::from(&hall))))
}

/* ---------- MOVIES ---------- */

async fn list_movies(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, BookingError> {
    let movies = state.store.list_movies().await?;
    Ok(Json(movies.iter().map(MovieListItem::from).collect::<Vec<_>>()))
}

async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, BookingError> {
    let movie = state
        .store
        .find_movie(id)
        .await?
        .ok_or(BookingError::NotFound { resource: "movie", id })?;
    Ok(Json(MovieDetail::from(&movie)))
}

async fn create_movie(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<NewMovie>,
) -> Result<impl IntoResponse, BookingError> {
    req.validate()?;
    let movie = state.store.create_movie(&req).await?;
    Ok((StatusCode::CREATED, Json(MovieCreated::from(&movie))))
}
