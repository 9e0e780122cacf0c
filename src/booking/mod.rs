//! Бронирование мест: проверка отдельного места, доступность сеанса и
//! атомарное создание заказа с билетами.

pub mod order_assembler;
pub mod seat_validator;
pub mod session_view;

pub use order_assembler::OrderAssembler;
pub use seat_validator::validate;
pub use session_view::{tickets_available, SessionSeating};
