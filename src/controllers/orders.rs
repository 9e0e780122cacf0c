use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use futures::future::try_join_all;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use super::JsonBody;
use crate::error::BookingError;
use crate::models::{MovieSession, NewTicket, Order};
use crate::store::BookingStore;
use crate::views::OrderView;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/orders", get(list_orders).post(create_order))
}

/* ---------- helpers ---------- */

// Сеансы всех билетов заказов, каждый загружается один раз
async fn sessions_for(
    store: &dyn BookingStore,
    orders: &[Order],
) -> Result<HashMap<i64, MovieSession>, BookingError> {
    let ids: BTreeSet<i64> = orders
        .iter()
        .flat_map(|o| o.tickets.iter().map(|t| t.movie_session_id))
        .collect();

    let sessions = try_join_all(ids.into_iter().map(|id| store.find_movie_session(id))).await?;
    Ok(sessions
        .into_iter()
        .flatten()
        .map(|s| (s.id, s))
        .collect())
}

/* ---------- ORDERS ---------- */

// GET /api/orders
async fn list_orders(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, BookingError> {
    let orders = state.store.list_orders().await?;
    let sessions = sessions_for(state.store.as_ref(), &orders).await?;

    let payload = orders
        .iter()
        .map(|o| OrderView::project(o, &sessions))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(payload))
}

// POST /api/orders
#[derive(Debug, Deserialize)]
struct CreateOrderRequest {
    tickets: Vec<NewTicket>,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CreateOrderRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let order = state.orders.create_order(&req.tickets).await?;

    // сеансы читаются после коммита, поэтому tickets_available уже учитывает заказ
    let orders = [order];
    let sessions = sessions_for(state.store.as_ref(), &orders).await?;
    let view = OrderView::project(&orders[0], &sessions)?;
    Ok((StatusCode::CREATED, Json(view)))
}
