use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tokio::sync::Mutex;

use super::{BookingStore, StoreError, StoreResult};
use crate::models::{
    Actor, CinemaHall, Genre, Movie, MovieSession, NewActor, NewCinemaHall, NewGenre, NewMovie,
    NewMovieSession, NewTicket, Order, Place, Ticket,
};

struct MovieRow {
    id: i64,
    title: String,
    description: String,
    duration: i32,
    genre_ids: Vec<i64>,
    actor_ids: Vec<i64>,
}

struct SessionRow {
    id: i64,
    show_time: DateTime<Utc>,
    movie_id: i64,
    cinema_hall_id: i64,
}

struct OrderRow {
    id: i64,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    genres: Vec<Genre>,
    actors: Vec<Actor>,
    halls: Vec<CinemaHall>,
    movies: Vec<MovieRow>,
    sessions: Vec<SessionRow>,
    orders: Vec<OrderRow>,
    tickets: Vec<Ticket>,
}

// строки никогда не удаляются, поэтому id = позиция + 1, как у serial
fn next_id(len: usize) -> i64 {
    len as i64 + 1
}

fn distinct(ids: &[i64]) -> Vec<i64> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

impl Tables {
    fn movie(&self, row: &MovieRow) -> Movie {
        Movie {
            id: row.id,
            title: row.title.clone(),
            description: row.description.clone(),
            duration: row.duration,
            genres: self
                .genres
                .iter()
                .filter(|g| row.genre_ids.contains(&g.id))
                .cloned()
                .collect(),
            actors: self
                .actors
                .iter()
                .filter(|a| row.actor_ids.contains(&a.id))
                .cloned()
                .collect(),
        }
    }

    fn session(&self, row: &SessionRow) -> Option<MovieSession> {
        let movie = self.movies.iter().find(|m| m.id == row.movie_id)?;
        let hall = self.halls.iter().find(|h| h.id == row.cinema_hall_id)?;
        let tickets_sold = self
            .tickets
            .iter()
            .filter(|t| t.movie_session_id == row.id)
            .count() as i64;
        Some(MovieSession {
            id: row.id,
            show_time: row.show_time,
            movie_id: movie.id,
            movie_title: movie.title.clone(),
            cinema_hall: hall.clone(),
            tickets_sold,
        })
    }

    fn is_taken(&self, session_id: i64, place: Place) -> bool {
        self.tickets
            .iter()
            .any(|t| t.movie_session_id == session_id && t.place() == place)
    }

    fn order(&self, row: &OrderRow) -> Order {
        Order {
            id: row.id,
            created_at: row.created_at,
            tickets: self
                .tickets
                .iter()
                .filter(|t| t.order_id == row.id)
                .cloned()
                .collect(),
        }
    }
}

/// Хранилище в памяти процесса.
///
/// Все проверки и вставки заказа идут под одной блокировкой, что даёт те же
/// гарантии, что уникальный индекс и транзакция в PostgreSQL.
#[derive(Default)]
pub struct InMemoryBookingStore {
    tables: Mutex<Tables>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn order_count(&self) -> usize {
        self.tables.lock().await.orders.len()
    }

    pub async fn ticket_count(&self) -> usize {
        self.tables.lock().await.tickets.len()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn create_genre(&self, genre: &NewGenre) -> StoreResult<Genre> {
        let mut tables = self.tables.lock().await;
        if tables.genres.iter().any(|g| g.name == genre.name) {
            return Err(StoreError::Duplicate { resource: "genre", field: "name" });
        }
        let genre = Genre { id: next_id(tables.genres.len()), name: genre.name.clone() };
        tables.genres.push(genre.clone());
        Ok(genre)
    }

    async fn list_genres(&self) -> StoreResult<Vec<Genre>> {
        Ok(self.tables.lock().await.genres.clone())
    }

    async fn create_actor(&self, actor: &NewActor) -> StoreResult<Actor> {
        let mut tables = self.tables.lock().await;
        let actor = Actor {
            id: next_id(tables.actors.len()),
            first_name: actor.first_name.clone(),
            last_name: actor.last_name.clone(),
        };
        tables.actors.push(actor.clone());
        Ok(actor)
    }

    async fn list_actors(&self) -> StoreResult<Vec<Actor>> {
        Ok(self.tables.lock().await.actors.clone())
    }

    async fn create_cinema_hall(&self, hall: &NewCinemaHall) -> StoreResult<CinemaHall> {
        let mut tables = self.tables.lock().await;
        let hall = CinemaHall {
            id: next_id(tables.halls.len()),
            name: hall.name.clone(),
            rows: hall.rows,
            seats_in_row: hall.seats_in_row,
        };
        tables.halls.push(hall.clone());
        Ok(hall)
    }

    async fn list_cinema_halls(&self) -> StoreResult<Vec<CinemaHall>> {
        Ok(self.tables.lock().await.halls.clone())
    }

    async fn create_movie(&self, movie: &NewMovie) -> StoreResult<Movie> {
        let mut tables = self.tables.lock().await;
        let genre_ids = distinct(&movie.genres);
        let actor_ids = distinct(&movie.actors);
        if let Some(&id) = genre_ids.iter().find(|id| !tables.genres.iter().any(|g| g.id == **id)) {
            return Err(StoreError::MissingReference { field: "genres", id });
        }
        if let Some(&id) = actor_ids.iter().find(|id| !tables.actors.iter().any(|a| a.id == **id)) {
            return Err(StoreError::MissingReference { field: "actors", id });
        }

        let row = MovieRow {
            id: next_id(tables.movies.len()),
            title: movie.title.clone(),
            description: movie.description.clone(),
            duration: movie.duration,
            genre_ids,
            actor_ids,
        };
        let movie = tables.movie(&row);
        tables.movies.push(row);
        Ok(movie)
    }

    async fn list_movies(&self) -> StoreResult<Vec<Movie>> {
        let tables = self.tables.lock().await;
        Ok(tables.movies.iter().map(|row| tables.movie(row)).collect())
    }

    async fn find_movie(&self, id: i64) -> StoreResult<Option<Movie>> {
        let tables = self.tables.lock().await;
        Ok(tables.movies.iter().find(|m| m.id == id).map(|row| tables.movie(row)))
    }

    async fn create_movie_session(&self, session: &NewMovieSession) -> StoreResult<MovieSession> {
        let mut tables = self.tables.lock().await;
        if !tables.movies.iter().any(|m| m.id == session.movie) {
            return Err(StoreError::MissingReference { field: "movie", id: session.movie });
        }
        if !tables.halls.iter().any(|h| h.id == session.cinema_hall) {
            return Err(StoreError::MissingReference {
                field: "cinema_hall",
                id: session.cinema_hall,
            });
        }

        let row = SessionRow {
            id: next_id(tables.sessions.len()),
            show_time: session.show_time,
            movie_id: session.movie,
            cinema_hall_id: session.cinema_hall,
        };
        let session = tables
            .session(&row)
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;
        tables.sessions.push(row);
        Ok(session)
    }

    async fn list_movie_sessions(&self) -> StoreResult<Vec<MovieSession>> {
        let tables = self.tables.lock().await;
        let mut sessions: Vec<MovieSession> =
            tables.sessions.iter().filter_map(|row| tables.session(row)).collect();
        sessions.sort_by_key(|s| (s.show_time, s.id));
        Ok(sessions)
    }

    async fn find_movie_session(&self, id: i64) -> StoreResult<Option<MovieSession>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .sessions
            .iter()
            .find(|s| s.id == id)
            .and_then(|row| tables.session(row)))
    }

    async fn taken_places(&self, session_id: i64) -> StoreResult<Vec<Place>> {
        let tables = self.tables.lock().await;
        let mut places: Vec<Place> = tables
            .tickets
            .iter()
            .filter(|t| t.movie_session_id == session_id)
            .map(Ticket::place)
            .collect();
        places.sort();
        Ok(places)
    }

    async fn create_order(&self, tickets: &[NewTicket]) -> StoreResult<Order> {
        let mut tables = self.tables.lock().await;

        // сначала все проверки, потом все вставки: частичный заказ невозможен
        let mut claimed = HashSet::new();
        for ticket in tickets {
            if !tables.sessions.iter().any(|s| s.id == ticket.movie_session) {
                return Err(StoreError::MissingReference {
                    field: "movie_session",
                    id: ticket.movie_session,
                });
            }
            let place = ticket.place();
            if tables.is_taken(ticket.movie_session, place)
                || !claimed.insert((ticket.movie_session, place))
            {
                return Err(StoreError::SeatTaken {
                    session_id: ticket.movie_session,
                    row: ticket.row,
                    seat: ticket.seat,
                });
            }
        }

        let order = OrderRow { id: next_id(tables.orders.len()), created_at: Utc::now() };
        for ticket in tickets {
            let id = next_id(tables.tickets.len());
            tables.tickets.push(Ticket {
                id,
                row: ticket.row,
                seat: ticket.seat,
                movie_session_id: ticket.movie_session,
                order_id: order.id,
            });
        }
        let created = tables.order(&order);
        tables.orders.push(order);
        Ok(created)
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        let tables = self.tables.lock().await;
        let mut orders: Vec<Order> = tables.orders.iter().map(|row| tables.order(row)).collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }
}
