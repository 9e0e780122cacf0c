use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{CinemaHallView, MovieListItem};
use crate::booking::tickets_available;
use crate::models::{Movie, MovieSession, Place};

#[derive(Debug, Clone, Serialize)]
pub struct MovieSessionListItem {
    pub id: i64,
    pub show_time: DateTime<Utc>,
    pub movie_title: String,
    pub cinema_hall_name: String,
    pub cinema_hall_capacity: i64,
    pub tickets_available: i64,
}

impl From<&MovieSession> for MovieSessionListItem {
    fn from(session: &MovieSession) -> Self {
        Self {
            id: session.id,
            show_time: session.show_time,
            movie_title: session.movie_title.clone(),
            cinema_hall_name: session.cinema_hall.name.clone(),
            cinema_hall_capacity: session.cinema_hall.capacity(),
            tickets_available: tickets_available(session),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MovieSessionDetail {
    pub id: i64,
    pub show_time: DateTime<Utc>,
    pub movie: MovieListItem,
    pub cinema_hall: CinemaHallView,
    pub taken_places: Vec<Place>,
}

impl MovieSessionDetail {
    pub fn project(session: &MovieSession, movie: &Movie, taken_places: Vec<Place>) -> Self {
        Self {
            id: session.id,
            show_time: session.show_time,
            movie: MovieListItem::from(movie),
            cinema_hall: CinemaHallView::from(&session.cinema_hall),
            taken_places,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MovieSessionCreated {
    pub id: i64,
    pub show_time: DateTime<Utc>,
    pub movie: i64,
    pub cinema_hall: i64,
}

impl From<&MovieSession> for MovieSessionCreated {
    fn from(session: &MovieSession) -> Self {
        Self {
            id: session.id,
            show_time: session.show_time,
            movie: session.movie_id,
            cinema_hall: session.cinema_hall.id,
        }
    }
}
