use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use super::{seat_validator, SessionSeating};
use crate::error::{BookingError, ValidationError};
use crate::models::{NewTicket, Order};
use crate::store::BookingStore;

/// Собирает заказ из запросов на билеты и сохраняет его одной транзакцией.
#[derive(Clone)]
pub struct OrderAssembler {
    store: Arc<dyn BookingStore>,
}

impl OrderAssembler {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    /// Проверяет все билеты и сохраняет заказ.
    ///
    /// Каждый сеанс загружается один раз на запрос. Места внутри пакета
    /// тоже не могут повторяться: второй билет на то же место даёт
    /// `SeatTaken`, как если бы первый уже был сохранён.
    ///
    /// # Errors
    ///
    /// `EmptyOrder`, `SessionNotFound`, `OutOfRange`, `SeatTaken` при
    /// отказе; ни одна строка в этом случае не сохраняется.
    pub async fn create_order(&self, requests: &[NewTicket]) -> Result<Order, BookingError> {
        let order = self.assemble(requests).await?;
        info!("Order {} created with {} tickets", order.id, order.tickets.len());
        Ok(order)
    }

    async fn assemble(&self, requests: &[NewTicket]) -> Result<Order, BookingError> {
        if requests.is_empty() {
            return Err(ValidationError::EmptyOrder.into());
        }

        let mut seatings: HashMap<i64, SessionSeating> = HashMap::new();
        for request in requests {
            let seating = match seatings.entry(request.movie_session) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let session = self
                        .store
                        .find_movie_session(request.movie_session)
                        .await?
                        .ok_or(ValidationError::SessionNotFound(request.movie_session))?;
                    let seating = SessionSeating::load(self.store.as_ref(), &session).await?;
                    entry.insert(seating)
                }
            };

            seat_validator::validate(request.row, request.seat, seating)?;
            seating.claim(request.place());
        }

        Ok(self.store.create_order(requests).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::tickets_available;
    use crate::error::SeatField;
    use crate::models::{MovieSession, NewCinemaHall, NewMovie, NewMovieSession, Place};
    use crate::store::InMemoryBookingStore;
    use chrono::{TimeZone, Utc};

    async fn setup() -> (Arc<InMemoryBookingStore>, OrderAssembler, MovieSession) {
        let store = Arc::new(InMemoryBookingStore::new());
        let hall = store
            .create_cinema_hall(&NewCinemaHall { name: "Blue".into(), rows: 10, seats_in_row: 15 })
            .await
            .unwrap();
        let movie = store
            .create_movie(&NewMovie {
                title: "Alien".into(),
                description: "In space no one can hear you scream.".into(),
                duration: 117,
                genres: vec![],
                actors: vec![],
            })
            .await
            .unwrap();
        let session = store
            .create_movie_session(&NewMovieSession {
                show_time: Utc.with_ymd_and_hms(2026, 10, 18, 20, 0, 0).unwrap(),
                movie: movie.id,
                cinema_hall: hall.id,
            })
            .await
            .unwrap();
        let assembler = OrderAssembler::new(store.clone());
        (store, assembler, session)
    }

    fn ticket(row: i32, seat: i32, session_id: i64) -> NewTicket {
        NewTicket { row, seat, movie_session: session_id }
    }

    async fn availability(store: &InMemoryBookingStore, session_id: i64) -> i64 {
        let session = store.find_movie_session(session_id).await.unwrap().unwrap();
        tickets_available(&session)
    }

    #[tokio::test]
    async fn booking_a_seat_reduces_availability() {
        let (store, assembler, session) = setup().await;
        assert_eq!(availability(&store, session.id).await, 150);

        let order = assembler.create_order(&[ticket(5, 5, session.id)]).await.unwrap();
        assert_eq!(order.tickets.len(), 1);
        assert_eq!(availability(&store, session.id).await, 149);
        assert_eq!(store.taken_places(session.id).await.unwrap(), vec![Place::new(5, 5)]);

        let err = assembler.create_order(&[ticket(5, 5, session.id)]).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::Validation(ValidationError::SeatTaken { row: 5, seat: 5 })
        ));
        assert_eq!(availability(&store, session.id).await, 149);
    }

    #[tokio::test]
    async fn row_outside_hall_persists_nothing() {
        let (store, assembler, session) = setup().await;
        let err = assembler.create_order(&[ticket(11, 1, session.id)]).await.unwrap_err();

        assert!(matches!(
            err,
            BookingError::Validation(ValidationError::OutOfRange(SeatField::Row))
        ));
        assert_eq!(store.order_count().await, 0);
        assert_eq!(store.ticket_count().await, 0);
    }

    #[tokio::test]
    async fn last_invalid_ticket_rejects_whole_order() {
        let (store, assembler, session) = setup().await;
        let err = assembler
            .create_order(&[
                ticket(1, 1, session.id),
                ticket(1, 2, session.id),
                ticket(1, 16, session.id),
            ])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BookingError::Validation(ValidationError::OutOfRange(SeatField::Seat))
        ));
        assert_eq!(store.order_count().await, 0);
        assert_eq!(store.ticket_count().await, 0);
    }

    #[tokio::test]
    async fn empty_order_is_rejected() {
        let (store, assembler, _) = setup().await;
        let err = assembler.create_order(&[]).await.unwrap_err();

        assert!(matches!(err, BookingError::Validation(ValidationError::EmptyOrder)));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn unknown_session_is_rejected() {
        let (store, assembler, session) = setup().await;
        let err = assembler
            .create_order(&[ticket(1, 1, session.id), ticket(1, 1, 999)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BookingError::Validation(ValidationError::SessionNotFound(999))
        ));
        assert_eq!(store.ticket_count().await, 0);
    }

    #[tokio::test]
    async fn same_seat_twice_in_one_order_is_rejected() {
        let (store, assembler, session) = setup().await;
        let err = assembler
            .create_order(&[ticket(3, 3, session.id), ticket(3, 3, session.id)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BookingError::Validation(ValidationError::SeatTaken { row: 3, seat: 3 })
        ));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn k_tickets_leave_capacity_minus_k() {
        let (store, assembler, session) = setup().await;
        let tickets: Vec<NewTicket> = (1..=7).map(|seat| ticket(2, seat, session.id)).collect();

        let order = assembler.create_order(&tickets).await.unwrap();
        assert_eq!(order.tickets.len(), 7);
        assert!(order.tickets.iter().all(|t| t.order_id == order.id));
        assert_eq!(availability(&store, session.id).await, 150 - 7);
    }

    #[tokio::test]
    async fn concurrent_orders_for_one_seat_have_single_winner() {
        let (store, assembler, session) = setup().await;
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let assembler = assembler.clone();
                let id = session.id;
                tokio::spawn(async move { assembler.create_order(&[ticket(4, 4, id)]).await })
            })
            .collect();

        let mut won = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => won += 1,
                Err(e) => assert!(matches!(
                    e,
                    BookingError::Validation(ValidationError::SeatTaken { row: 4, seat: 4 })
                )),
            }
        }
        assert_eq!(won, 1);
        assert_eq!(store.ticket_count().await, 1);
    }
}
