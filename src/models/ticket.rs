use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    pub movie_session_id: i64,
    pub order_id: i64,
}

impl Ticket {
    pub fn place(&self) -> Place {
        Place::new(self.row, self.seat)
    }
}

/// Координаты места в зале: ряд и номер, оба с единицы.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, FromRow, Serialize, Deserialize)]
pub struct Place {
    pub row: i32,
    pub seat: i32,
}

impl Place {
    pub fn new(row: i32, seat: i32) -> Self {
        Self { row, seat }
    }
}

/// Запрос на один билет внутри заказа.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NewTicket {
    pub row: i32,
    pub seat: i32,
    pub movie_session: i64,
}

impl NewTicket {
    pub fn place(&self) -> Place {
        Place::new(self.row, self.seat)
    }
}
