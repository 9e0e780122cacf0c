use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::collections::HashMap;
use tracing::{debug, error};

use super::{BookingStore, StoreError, StoreResult};
use crate::database::Database;
use crate::models::{
    Actor, CinemaHall, Genre, Movie, MovieSession, NewActor, NewCinemaHall, NewGenre, NewMovie,
    NewMovieSession, NewTicket, Order, Place, Ticket,
};

#[derive(Clone)]
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(db: &Database) -> Self {
        Self { pool: db.pool.clone() }
    }
}

// Строки для запросов с join'ами
#[derive(FromRow)]
struct MovieRow {
    id: i64,
    title: String,
    description: String,
    duration: i32,
}

#[derive(FromRow)]
struct MovieGenreRow {
    movie_id: i64,
    id: i64,
    name: String,
}

#[derive(FromRow)]
struct MovieActorRow {
    movie_id: i64,
    id: i64,
    first_name: String,
    last_name: String,
}

#[derive(FromRow)]
struct SessionRow {
    id: i64,
    show_time: DateTime<Utc>,
    movie_id: i64,
    movie_title: String,
    hall_id: i64,
    hall_name: String,
    rows: i32,
    seats_in_row: i32,
    tickets_sold: i64,
}

impl From<SessionRow> for MovieSession {
    fn from(row: SessionRow) -> Self {
        MovieSession {
            id: row.id,
            show_time: row.show_time,
            movie_id: row.movie_id,
            movie_title: row.movie_title,
            cinema_hall: CinemaHall {
                id: row.hall_id,
                name: row.hall_name,
                rows: row.rows,
                seats_in_row: row.seats_in_row,
            },
            tickets_sold: row.tickets_sold,
        }
    }
}

#[derive(FromRow)]
struct OrderRow {
    id: i64,
    created_at: DateTime<Utc>,
}

const SESSION_SELECT: &str = r#"
    SELECT ms.id, ms.show_time, ms.movie_id, m.title AS movie_title,
           h.id AS hall_id, h.name AS hall_name, h.rows, h.seats_in_row,
           (SELECT COUNT(*) FROM tickets t WHERE t.movie_session_id = ms.id) AS tickets_sold
    FROM movie_sessions ms
    JOIN movies m ON m.id = ms.movie_id
    JOIN cinema_halls h ON h.id = ms.cinema_hall_id
    WHERE ($1::BIGINT IS NULL OR ms.id = $1)
    ORDER BY ms.show_time, ms.id
"#;

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

fn violated_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint(),
        _ => None,
    }
}

/// Отказ вставки билета: уникальный индекс значит проигранную гонку за место.
fn ticket_insert_error(err: sqlx::Error, ticket: &NewTicket) -> StoreError {
    if is_unique_violation(&err) {
        debug!(
            "seat ({}, {}) of session {} lost to a concurrent order",
            ticket.row, ticket.seat, ticket.movie_session
        );
        return StoreError::SeatTaken {
            session_id: ticket.movie_session,
            row: ticket.row,
            seat: ticket.seat,
        };
    }
    if is_foreign_key_violation(&err) {
        return StoreError::MissingReference { field: "movie_session", id: ticket.movie_session };
    }
    err.into()
}

async fn rollback(tx: Transaction<'_, Postgres>) {
    if let Err(e) = tx.rollback().await {
        error!("failed to roll back transaction: {:?}", e);
    }
}

impl PgBookingStore {
    async fn load_movies(&self, id: Option<i64>) -> StoreResult<Vec<Movie>> {
        let movies = sqlx::query_as::<_, MovieRow>(
            "SELECT id, title, description, duration
             FROM movies
             WHERE ($1::BIGINT IS NULL OR id = $1)
             ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let genres = sqlx::query_as::<_, MovieGenreRow>(
            "SELECT mg.movie_id, g.id, g.name
             FROM movie_genres mg
             JOIN genres g ON g.id = mg.genre_id
             WHERE ($1::BIGINT IS NULL OR mg.movie_id = $1)
             ORDER BY g.id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let actors = sqlx::query_as::<_, MovieActorRow>(
            "SELECT ma.movie_id, a.id, a.first_name, a.last_name
             FROM movie_actors ma
             JOIN actors a ON a.id = ma.actor_id
             WHERE ($1::BIGINT IS NULL OR ma.movie_id = $1)
             ORDER BY a.id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let mut genres_by_movie: HashMap<i64, Vec<Genre>> = HashMap::new();
        for g in genres {
            genres_by_movie
                .entry(g.movie_id)
                .or_default()
                .push(Genre { id: g.id, name: g.name });
        }
        let mut actors_by_movie: HashMap<i64, Vec<Actor>> = HashMap::new();
        for a in actors {
            actors_by_movie.entry(a.movie_id).or_default().push(Actor {
                id: a.id,
                first_name: a.first_name,
                last_name: a.last_name,
            });
        }

        Ok(movies
            .into_iter()
            .map(|m| Movie {
                genres: genres_by_movie.remove(&m.id).unwrap_or_default(),
                actors: actors_by_movie.remove(&m.id).unwrap_or_default(),
                id: m.id,
                title: m.title,
                description: m.description,
                duration: m.duration,
            })
            .collect())
    }

    async fn load_sessions(&self, id: Option<i64>) -> StoreResult<Vec<MovieSession>> {
        let rows = sqlx::query_as::<_, SessionRow>(SESSION_SELECT)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(MovieSession::from).collect())
    }

    async fn load_orders(&self) -> StoreResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, OrderRow>(
            "SELECT id, created_at FROM orders ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        let tickets = sqlx::query_as::<_, Ticket>(
            "SELECT id, row, seat, movie_session_id, order_id
             FROM tickets
             WHERE order_id = ANY($1)
             ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<i64, Vec<Ticket>> = HashMap::new();
        for t in tickets {
            by_order.entry(t.order_id).or_default().push(t);
        }

        Ok(orders
            .into_iter()
            .map(|o| Order {
                tickets: by_order.remove(&o.id).unwrap_or_default(),
                id: o.id,
                created_at: o.created_at,
            })
            .collect())
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn create_genre(&self, genre: &NewGenre) -> StoreResult<Genre> {
        sqlx::query_as::<_, Genre>("INSERT INTO genres (name) VALUES ($1) RETURNING id, name")
            .bind(&genre.name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::Duplicate { resource: "genre", field: "name" }
                } else {
                    StoreError::Database(e)
                }
            })
    }

    async fn list_genres(&self) -> StoreResult<Vec<Genre>> {
        Ok(sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY id")
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_actor(&self, actor: &NewActor) -> StoreResult<Actor> {
        Ok(sqlx::query_as::<_, Actor>(
            "INSERT INTO actors (first_name, last_name)
             VALUES ($1, $2)
             RETURNING id, first_name, last_name",
        )
        .bind(&actor.first_name)
        .bind(&actor.last_name)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_actors(&self) -> StoreResult<Vec<Actor>> {
        Ok(sqlx::query_as::<_, Actor>(
            "SELECT id, first_name, last_name FROM actors ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_cinema_hall(&self, hall: &NewCinemaHall) -> StoreResult<CinemaHall> {
        Ok(sqlx::query_as::<_, CinemaHall>(
            "INSERT INTO cinema_halls (name, rows, seats_in_row)
             VALUES ($1, $2, $3)
             RETURNING id, name, rows, seats_in_row",
        )
        .bind(&hall.name)
        .bind(hall.rows)
        .bind(hall.seats_in_row)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_cinema_halls(&self) -> StoreResult<Vec<CinemaHall>> {
        Ok(sqlx::query_as::<_, CinemaHall>(
            "SELECT id, name, rows, seats_in_row FROM cinema_halls ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_movie(&self, movie: &NewMovie) -> StoreResult<Movie> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_scalar::<_, i64>(
            "INSERT INTO movies (title, description, duration)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(&movie.title)
        .bind(&movie.description)
        .bind(movie.duration)
        .fetch_one(&mut *tx)
        .await;

        let movie_id = match inserted {
            Ok(id) => id,
            Err(e) => {
                rollback(tx).await;
                return Err(e.into());
            }
        };

        // ON CONFLICT: повторный id в запросе не ошибка, связь просто одна
        for &genre_id in &movie.genres {
            let res = sqlx::query(
                "INSERT INTO movie_genres (movie_id, genre_id) VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(movie_id)
            .bind(genre_id)
            .execute(&mut *tx)
            .await;
            if let Err(e) = res {
                rollback(tx).await;
                return Err(if is_foreign_key_violation(&e) {
                    StoreError::MissingReference { field: "genres", id: genre_id }
                } else {
                    e.into()
                });
            }
        }

        for &actor_id in &movie.actors {
            let res = sqlx::query(
                "INSERT INTO movie_actors (movie_id, actor_id) VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(movie_id)
            .bind(actor_id)
            .execute(&mut *tx)
            .await;
            if let Err(e) = res {
                rollback(tx).await;
                return Err(if is_foreign_key_violation(&e) {
                    StoreError::MissingReference { field: "actors", id: actor_id }
                } else {
                    e.into()
                });
            }
        }

        tx.commit().await?;

        self.load_movies(Some(movie_id))
            .await?
            .pop()
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }

    async fn list_movies(&self) -> StoreResult<Vec<Movie>> {
        self.load_movies(None).await
    }

    async fn find_movie(&self, id: i64) -> StoreResult<Option<Movie>> {
        Ok(self.load_movies(Some(id)).await?.pop())
    }

    async fn create_movie_session(&self, session: &NewMovieSession) -> StoreResult<MovieSession> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO movie_sessions (show_time, movie_id, cinema_hall_id)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(session.show_time)
        .bind(session.movie)
        .bind(session.cinema_hall)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if !is_foreign_key_violation(&e) {
                return StoreError::Database(e);
            }
            if violated_constraint(&e) == Some("movie_sessions_movie_id_fkey") {
                StoreError::MissingReference { field: "movie", id: session.movie }
            } else {
                StoreError::MissingReference { field: "cinema_hall", id: session.cinema_hall }
            }
        })?;

        self.load_sessions(Some(id))
            .await?
            .pop()
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }

    async fn list_movie_sessions(&self) -> StoreResult<Vec<MovieSession>> {
        self.load_sessions(None).await
    }

    async fn find_movie_session(&self, id: i64) -> StoreResult<Option<MovieSession>> {
        Ok(self.load_sessions(Some(id)).await?.pop())
    }

    async fn taken_places(&self, session_id: i64) -> StoreResult<Vec<Place>> {
        Ok(sqlx::query_as::<_, Place>(
            "SELECT row, seat FROM tickets WHERE movie_session_id = $1 ORDER BY row, seat",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn create_order(&self, tickets: &[NewTicket]) -> StoreResult<Order> {
        let mut tx = self.pool.begin().await?;

        // 1) Сам заказ
        let inserted = sqlx::query_as::<_, OrderRow>(
            "INSERT INTO orders (created_at) VALUES (NOW()) RETURNING id, created_at",
        )
        .fetch_one(&mut *tx)
        .await;

        let order = match inserted {
            Ok(order) => order,
            Err(e) => {
                rollback(tx).await;
                return Err(e.into());
            }
        };

        // 2) Билеты; уникальный индекс (movie_session_id, row, seat) решает гонки
        let mut created = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            let res = sqlx::query_as::<_, Ticket>(
                "INSERT INTO tickets (row, seat, movie_session_id, order_id)
                 VALUES ($1, $2, $3, $4)
                 RETURNING id, row, seat, movie_session_id, order_id",
            )
            .bind(ticket.row)
            .bind(ticket.seat)
            .bind(ticket.movie_session)
            .bind(order.id)
            .fetch_one(&mut *tx)
            .await;

            match res {
                Ok(t) => created.push(t),
                Err(e) => {
                    rollback(tx).await;
                    return Err(ticket_insert_error(e, ticket));
                }
            }
        }

        // 3) Коммит
        tx.commit().await?;

        Ok(Order { id: order.id, created_at: order.created_at, tickets: created })
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        self.load_orders().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    /// Ошибка сервера в том виде, в каком её отдаёт драйвер.
    #[derive(Debug)]
    struct ServerError {
        kind: ErrorKind,
        constraint: Option<&'static str>,
    }

    impl fmt::Display for ServerError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{:?}", self.kind)
        }
    }

    impl StdError for ServerError {}

    impl DatabaseError for ServerError {
        fn message(&self) -> &str {
            "constraint violated"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            None
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn constraint(&self) -> Option<&str> {
            self.constraint
        }

        fn kind(&self) -> ErrorKind {
            match self.kind {
                ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
                ErrorKind::ForeignKeyViolation => ErrorKind::ForeignKeyViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    fn server_error(kind: ErrorKind, constraint: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(ServerError { kind, constraint: Some(constraint) }))
    }

    fn ticket() -> NewTicket {
        NewTicket { row: 4, seat: 7, movie_session: 12 }
    }

    #[test]
    fn unique_violation_on_ticket_becomes_seat_taken() {
        let err = server_error(ErrorKind::UniqueViolation, "tickets_session_row_seat_key");
        assert!(is_unique_violation(&err));
        assert!(!is_foreign_key_violation(&err));
        assert_eq!(violated_constraint(&err), Some("tickets_session_row_seat_key"));

        assert!(matches!(
            ticket_insert_error(err, &ticket()),
            StoreError::SeatTaken { session_id: 12, row: 4, seat: 7 }
        ));
    }

    #[test]
    fn foreign_key_violation_on_ticket_is_missing_session() {
        let err = server_error(ErrorKind::ForeignKeyViolation, "tickets_movie_session_id_fkey");
        assert!(is_foreign_key_violation(&err));

        assert!(matches!(
            ticket_insert_error(err, &ticket()),
            StoreError::MissingReference { field: "movie_session", id: 12 }
        ));
    }

    #[test]
    fn other_failures_stay_database_errors() {
        let err = server_error(ErrorKind::CheckViolation, "tickets_row_check");
        assert!(!is_unique_violation(&err));
        assert!(matches!(ticket_insert_error(err, &ticket()), StoreError::Database(_)));

        assert!(matches!(
            ticket_insert_error(sqlx::Error::RowNotFound, &ticket()),
            StoreError::Database(sqlx::Error::RowNotFound)
        ));
        assert_eq!(violated_constraint(&sqlx::Error::RowNotFound), None);
    }
}
