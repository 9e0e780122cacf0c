pub mod catalog;
pub mod sessions;
pub mod orders;

use axum::{extract::FromRequest, Router};
use std::sync::Arc;

use crate::error::BookingError;

/// `Json`, чей отказ отдаётся тем же телом по полям, что и ошибки валидации.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(BookingError))]
pub struct JsonBody<T>(pub T);

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(catalog::routes())
        .merge(sessions::routes())
        .merge(orders::routes())
}
