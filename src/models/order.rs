use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Ticket;

/// Заказ владеет своими билетами: они создаются и удаляются только вместе с ним.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub tickets: Vec<Ticket>,
}
