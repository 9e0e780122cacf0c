use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CinemaHall;

/// Сеанс с уже подгруженным залом и названием фильма.
///
/// `tickets_sold` считается запросом в момент чтения и не кешируется.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSession {
    pub id: i64,
    pub show_time: DateTime<Utc>,
    pub movie_id: i64,
    pub movie_title: String,
    pub cinema_hall: CinemaHall,
    pub tickets_sold: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMovieSession {
    pub show_time: DateTime<Utc>,
    pub movie: i64,
    pub cinema_hall: i64,
}
