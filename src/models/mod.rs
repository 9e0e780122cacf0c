pub mod genre;
pub mod actor;
pub mod cinema_hall;
pub mod movie;
pub mod movie_session;
pub mod ticket;
pub mod order;

pub use genre::{Genre, NewGenre};
pub use actor::{Actor, NewActor};
pub use cinema_hall::{CinemaHall, NewCinemaHall};
pub use movie::{Movie, NewMovie};
pub use movie_session::{MovieSession, NewMovieSession};
pub use ticket::{NewTicket, Place, Ticket};
pub use order::Order;
