use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewGenre {
    #[validate(length(min = 1, max = 255, message = "Ensure this field has between 1 and 255 characters."))]
    pub name: String,
}
