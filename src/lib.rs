pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod store;
pub mod booking;
pub mod views;
pub mod controllers;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use booking::OrderAssembler;
use store::BookingStore;

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BookingStore>,
    pub orders: OrderAssembler,
}

impl AppState {
    pub fn new(store: Arc<dyn BookingStore>) -> Arc<Self> {
        let orders = OrderAssembler::new(store.clone());
        Arc::new(Self { store, orders })
    }
}

/// Полный роутер сервиса: служебные маршруты и API под `/api`.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Cinema Booking API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
