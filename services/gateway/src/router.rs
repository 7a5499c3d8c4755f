//! HTTP router

use crate::handlers::{market, orders, users, ws};
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/orders", post(orders::place_order))
        .route("/orders/:id", delete(orders::cancel_order))
        .route("/orderbook/:symbol", get(market::order_book))
        .route("/trades/:symbol", get(market::recent_trades))
        .route("/users/:id/orders", get(users::user_orders))
        .route("/users/:id/trades", get(users::user_trades))
        .route("/users/:id/balances", get(users::user_balances))
        .route("/tickers", get(market::all_tickers))
        .route("/tickers/:symbol", get(market::ticker))
        .route("/symbols", get(market::symbols));

    Router::new()
        .route("/health", get(market::health))
        .route("/ws", get(ws::ws_handler))
        .nest("/api/v1", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
