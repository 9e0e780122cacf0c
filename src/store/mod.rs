//! Хранилище каталога, сеансов и заказов.
//!
//! Две реализации одного трейта: PostgreSQL для сервиса и in-memory для
//! тестов. Обе сами гарантируют уникальность (сеанс, ряд, место) и то, что
//! заказ пишется целиком или не пишется совсем. Проверка в коде перед
//! записью лишь быстрый отказ, последнее слово за хранилищем.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Actor, CinemaHall, Genre, Movie, MovieSession, NewActor, NewCinemaHall, NewGenre, NewMovie,
    NewMovieSession, NewTicket, Order, Place,
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryBookingStore;
pub use postgres::PgBookingStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("seat ({row}, {seat}) of movie session {session_id} is already taken")]
    SeatTaken { session_id: i64, row: i32, seat: i32 },
    #[error("referenced {field} {id} does not exist")]
    MissingReference { field: &'static str, id: i64 },
    #[error("{resource} with this {field} already exists")]
    Duplicate { resource: &'static str, field: &'static str },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait BookingStore: Send + Sync + 'static {
    async fn create_genre(&self, genre: &NewGenre) -> StoreResult<Genre>;
    async fn list_genres(&self) -> StoreResult<Vec<Genre>>;

    async fn create_actor(&self, actor: &NewActor) -> StoreResult<Actor>;
    async fn list_actors(&self) -> StoreResult<Vec<Actor>>;

    async fn create_cinema_hall(&self, hall: &NewCinemaHall) -> StoreResult<CinemaHall>;
    async fn list_cinema_halls(&self) -> StoreResult<Vec<CinemaHall>>;

    /// Жанры и актёры ссылаются по id; неизвестный id даёт `MissingReference`.
    async fn create_movie(&self, movie: &NewMovie) -> StoreResult<Movie>;
    async fn list_movies(&self) -> StoreResult<Vec<Movie>>;
    async fn find_movie(&self, id: i64) -> StoreResult<Option<Movie>>;

    async fn create_movie_session(&self, session: &NewMovieSession) -> StoreResult<MovieSession>;
    /// Сеансы упорядочены по времени показа.
    async fn list_movie_sessions(&self) -> StoreResult<Vec<MovieSession>>;
    async fn find_movie_session(&self, id: i64) -> StoreResult<Option<MovieSession>>;

    /// Занятые места сеанса, отсортированные по ряду и месту.
    async fn taken_places(&self, session_id: i64) -> StoreResult<Vec<Place>>;

    /// Атомарно пишет заказ и все его билеты.
    ///
    /// Конфликт по (сеанс, ряд, место) с уже сохранёнными билетами или внутри
    /// самого пакета возвращает `SeatTaken`, и ни одна строка не сохраняется.
    async fn create_order(&self, tickets: &[NewTicket]) -> StoreResult<Order>;
    /// Заказы от новых к старым.
    async fn list_orders(&self) -> StoreResult<Vec<Order>>;
}
