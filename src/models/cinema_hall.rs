use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CinemaHall {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
}

impl CinemaHall {
    /// Вместимость всегда считается из размеров зала и нигде не хранится.
    pub fn capacity(&self) -> i64 {
        i64::from(self.rows) * i64::from(self.seats_in_row)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCinemaHall {
    #[validate(length(min = 1, max = 255, message = "Ensure this field has between 1 and 255 characters."))]
    pub name: String,
    #[validate(range(min = 1, message = "Ensure this value is greater than or equal to 1."))]
    pub rows: i32,
    #[validate(range(min = 1, message = "Ensure this value is greater than or equal to 1."))]
    pub seats_in_row: i32,
}
