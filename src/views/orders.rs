use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use super::MovieSessionListItem;
use crate::error::BookingError;
use crate::models::{MovieSession, Order, Ticket};

#[derive(Debug, Clone, Serialize)]
pub struct TicketView {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    pub movie_session: MovieSessionListItem,
}

impl TicketView {
    pub fn project(ticket: &Ticket, session: &MovieSession) -> Self {
        Self {
            id: ticket.id,
            row: ticket.row,
            seat: ticket.seat,
            movie_session: MovieSessionListItem::from(session),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: i64,
    pub tickets: Vec<TicketView>,
    pub created_at: DateTime<Utc>,
}

impl OrderView {
    /// `sessions` должен содержать все сеансы, на которые есть билеты в заказе.
    pub fn project(order: &Order, sessions: &HashMap<i64, MovieSession>) -> Result<Self, BookingError> {
        let tickets = order
            .tickets
            .iter()
            .map(|t| {
                sessions
                    .get(&t.movie_session_id)
                    .map(|s| TicketView::project(t, s))
                    .ok_or(BookingError::NotFound {
                        resource: "movie session",
                        id: t.movie_session_id,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { id: order.id, tickets, created_at: order.created_at })
    }
}
