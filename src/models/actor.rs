use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl Actor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewActor {
    #[validate(length(min = 1, max = 255, message = "Ensure this field has between 1 and 255 characters."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 255, message = "Ensure this field has between 1 and 255 characters."))]
    pub last_name: String,
}
