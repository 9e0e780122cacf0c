//! Проекции сущностей в формы ответов.
//!
//! Одна и та же сущность отдаётся в разных формах для списка и для
//! детального просмотра; каждая форма строится отдельной функцией.

pub mod catalog;
pub mod orders;
pub mod sessions;

pub use catalog::{ActorView, CinemaHallView, MovieCreated, MovieDetail, MovieListItem};
pub use orders::{OrderView, TicketView};
pub use sessions::{MovieSessionCreated, MovieSessionDetail, MovieSessionListItem};
