use std::collections::HashSet;

use crate::models::{MovieSession, Place};
use crate::store::{BookingStore, StoreResult};

/// Сколько билетов ещё можно продать на сеанс.
pub fn tickets_available(session: &MovieSession) -> i64 {
    session.cinema_hall.capacity() - session.tickets_sold
}

/// Границы зала и занятые места одного сеанса на момент чтения.
///
/// Это всё, что нужно валидатору: никаких ленивых обращений к связям.
#[derive(Debug, Clone)]
pub struct SessionSeating {
    pub rows: i32,
    pub seats_in_row: i32,
    taken: HashSet<Place>,
}

impl SessionSeating {
    pub fn new(session: &MovieSession, taken: impl IntoIterator<Item = Place>) -> Self {
        Self {
            rows: session.cinema_hall.rows,
            seats_in_row: session.cinema_hall.seats_in_row,
            taken: taken.into_iter().collect(),
        }
    }

    pub async fn load(store: &dyn BookingStore, session: &MovieSession) -> StoreResult<Self> {
        let taken = store.taken_places(session.id).await?;
        Ok(Self::new(session, taken))
    }

    pub fn is_taken(&self, place: Place) -> bool {
        self.taken.contains(&place)
    }

    /// Помечает место занятым до конца сборки заказа.
    pub fn claim(&mut self, place: Place) {
        self.taken.insert(place);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CinemaHall;
    use chrono::Utc;

    fn session(tickets_sold: i64) -> MovieSession {
        MovieSession {
            id: 1,
            show_time: Utc::now(),
            movie_id: 1,
            movie_title: "Alien".into(),
            cinema_hall: CinemaHall { id: 1, name: "Blue".into(), rows: 10, seats_in_row: 15 },
            tickets_sold,
        }
    }

    #[test]
    fn empty_session_has_full_capacity() {
        assert_eq!(tickets_available(&session(0)), 150);
    }

    #[test]
    fn sold_tickets_reduce_availability() {
        for k in [1, 17, 150] {
            assert_eq!(tickets_available(&session(k)), 150 - k);
        }
    }

    #[test]
    fn claimed_place_stays_taken() {
        let mut seating = SessionSeating::new(&session(0), [Place::new(5, 5)]);
        assert!(seating.is_taken(Place::new(5, 5)));
        seating.claim(Place::new(5, 5));
        assert!(seating.is_taken(Place::new(5, 5)));
        assert!(!seating.is_taken(Place::new(1, 2)));
        seating.claim(Place::new(1, 2));
        assert!(seating.is_taken(Place::new(1, 2)));
        assert!(!seating.is_taken(Place::new(2, 1)));
    }
}
