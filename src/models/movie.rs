use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Actor, Genre};

/// Фильм вместе с жанрами и актёрами (связи многие-ко-многим, порядок не важен).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration: i32,
    pub genres: Vec<Genre>,
    pub actors: Vec<Actor>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewMovie {
    #[validate(length(min = 1, max = 255, message = "Ensure this field has between 1 and 255 characters."))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 1, message = "Ensure this value is greater than or equal to 1."))]
    pub duration: i32,
    #[serde(default)]
    pub genres: Vec<i64>,
    #[serde(default)]
    pub actors: Vec<i64>,
}
