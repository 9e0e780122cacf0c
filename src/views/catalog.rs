use serde::Serialize;

use crate::models::{Actor, CinemaHall, Genre, Movie};

#[derive(Debug, Clone, Serialize)]
pub struct ActorView {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
}

impl From<&Actor> for ActorView {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id,
            first_name: actor.first_name.clone(),
            last_name: actor.last_name.clone(),
            full_name: actor.full_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CinemaHallView {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    pub capacity: i64,
}

impl From<&CinemaHall> for CinemaHallView {
    fn from(hall: &CinemaHall) -> Self {
        Self {
            id: hall.id,
            name: hall.name.clone(),
            rows: hall.rows,
            seats_in_row: hall.seats_in_row,
            capacity: hall.capacity(),
        }
    }
}

/// Фильм в списке: жанры по названию, актёры по полному имени.
#[derive(Debug, Clone, Serialize)]
pub struct MovieListItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration: i32,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
}

impl From<&Movie> for MovieListItem {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            description: movie.description.clone(),
            duration: movie.duration,
            genres: movie.genres.iter().map(|g| g.name.clone()).collect(),
            actors: movie.actors.iter().map(Actor::full_name).collect(),
        }
    }
}

/// Фильм целиком: вложенные жанры и актёры.
#[derive(Debug, Clone, Serialize)]
pub struct MovieDetail {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration: i32,
    pub genres: Vec<Genre>,
    pub actors: Vec<ActorView>,
}

impl From<&Movie> for MovieDetail {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            description: movie.description.clone(),
            duration: movie.duration,
            genres: movie.genres.clone(),
            actors: movie.actors.iter().map(ActorView::from).collect(),
        }
    }
}

/// Ответ на создание: связи отдаются id, как они пришли в запросе.
#[derive(Debug, Clone, Serialize)]
pub struct MovieCreated {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration: i32,
    pub genres: Vec<i64>,
    pub actors: Vec<i64>,
}

impl From<&Movie> for MovieCreated {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            description: movie.description.clone(),
            duration: movie.duration,
            genres: movie.genres.iter().map(|g| g.id).collect(),
            actors: movie.actors.iter().map(|a| a.id).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn movie() -> Movie {
        Movie {
            id: 3,
            title: "Heat".into(),
            description: "Cops and robbers".into(),
            duration: 170,
            genres: vec![Genre { id: 1, name: "Crime".into() }],
            actors: vec![Actor { id: 2, first_name: "Al".into(), last_name: "Pacino".into() }],
        }
    }

    #[test]
    fn list_shape_flattens_relations() {
        let value = serde_json::to_value(MovieListItem::from(&movie())).unwrap();
        assert_eq!(value["genres"], json!(["Crime"]));
        assert_eq!(value["actors"], json!(["Al Pacino"]));
    }

    #[test]
    fn detail_shape_nests_relations() {
        let value = serde_json::to_value(MovieDetail::from(&movie())).unwrap();
        assert_eq!(value["genres"], json!([{ "id": 1, "name": "Crime" }]));
        assert_eq!(
            value["actors"],
            json!([{ "id": 2, "first_name": "Al", "last_name": "Pacino", "full_name": "Al Pacino" }])
        );
    }

    #[test]
    fn hall_view_carries_derived_capacity() {
        let hall = CinemaHall { id: 1, name: "Blue".into(), rows: 10, seats_in_row: 15 };
        assert_eq!(CinemaHallView::from(&hall).capacity, 150);
    }
}
