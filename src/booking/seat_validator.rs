use super::SessionSeating;
use crate::error::{SeatField, ValidationError};
use crate::models::Place;

/// Проверяет одно место сеанса: сначала ряд, потом номер места, потом занятость.
///
/// Порядок важен: при двух нарушениях сразу всегда сообщается о ряде.
pub fn validate(row: i32, seat: i32, session: &SessionSeating) -> Result<(), ValidationError> {
    if !(1..=session.rows).contains(&row) {
        return Err(ValidationError::OutOfRange(SeatField::Row));
    }
    if !(1..=session.seats_in_row).contains(&seat) {
        return Err(ValidationError::OutOfRange(SeatField::Seat));
    }
    if session.is_taken(Place::new(row, seat)) {
        return Err(ValidationError::SeatTaken { row, seat });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CinemaHall, MovieSession};
    use chrono::Utc;
    use proptest::prelude::*;

    fn seating(taken: &[(i32, i32)]) -> SessionSeating {
        let session = MovieSession {
            id: 7,
            show_time: Utc::now(),
            movie_id: 1,
            movie_title: "Alien".into(),
            cinema_hall: CinemaHall { id: 1, name: "Blue".into(), rows: 10, seats_in_row: 15 },
            tickets_sold: taken.len() as i64,
        };
        SessionSeating::new(&session, taken.iter().map(|&(r, s)| Place::new(r, s)))
    }

    #[test]
    fn free_seat_inside_hall_is_valid() {
        assert_eq!(validate(5, 5, &seating(&[])), Ok(()));
        assert_eq!(validate(1, 1, &seating(&[])), Ok(()));
        assert_eq!(validate(10, 15, &seating(&[])), Ok(()));
    }

    #[test]
    fn row_eleven_of_ten_is_out_of_range() {
        assert_eq!(
            validate(11, 5, &seating(&[])),
            Err(ValidationError::OutOfRange(SeatField::Row))
        );
    }

    #[test]
    fn row_is_reported_before_seat() {
        assert_eq!(
            validate(0, 99, &seating(&[])),
            Err(ValidationError::OutOfRange(SeatField::Row))
        );
    }

    #[test]
    fn range_is_checked_before_uniqueness() {
        // занятость вне зала не проверяется вовсе
        assert_eq!(
            validate(5, 16, &seating(&[(5, 5)])),
            Err(ValidationError::OutOfRange(SeatField::Seat))
        );
    }

    #[test]
    fn taken_seat_is_rejected() {
        assert_eq!(
            validate(5, 5, &seating(&[(5, 5)])),
            Err(ValidationError::SeatTaken { row: 5, seat: 5 })
        );
        assert_eq!(validate(5, 6, &seating(&[(5, 5)])), Ok(()));
    }

    fn outside(limit: i32) -> impl Strategy<Value = i32> {
        prop_oneof![i32::MIN..=0, (limit + 1)..=i32::MAX]
    }

    proptest! {
        #[test]
        fn any_row_outside_hall_is_out_of_range(row in outside(10), seat in any::<i32>()) {
            prop_assert_eq!(
                validate(row, seat, &seating(&[])),
                Err(ValidationError::OutOfRange(SeatField::Row))
            );
        }

        #[test]
        fn any_seat_outside_row_is_out_of_range(row in 1..=10i32, seat in outside(15)) {
            prop_assert_eq!(
                validate(row, seat, &seating(&[])),
                Err(ValidationError::OutOfRange(SeatField::Seat))
            );
        }

        #[test]
        fn any_ticketed_place_is_taken(row in 1..=10i32, seat in 1..=15i32) {
            let session = seating(&[(row, seat)]);
            prop_assert_eq!(
                validate(row, seat, &session),
                Err(ValidationError::SeatTaken { row, seat })
            );
        }
    }
}
