//! Per-user queries

use crate::error::AppError;
use crate::models::ApiResponse;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use types::balance::Balance;
use types::ids::UserId;
use types::order::Order;
use types::store::{BalanceStore, OrderStore, TradeStore};
use types::trade::Trade;

const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// `GET /api/v1/users/:id/orders`
pub async fn user_orders(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<Order>>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let orders = state
        .orders
        .get_orders_by_user(&UserId::new(user_id), limit)?;
    Ok(Json(ApiResponse::ok(orders)))
}

/// `GET /api/v1/users/:id/trades`
pub async fn user_trades(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<Trade>>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let trades = state.trades.get_user_trades(&UserId::new(user_id), limit)?;
    Ok(Json(ApiResponse::ok(trades)))
}

/// `GET /api/v1/users/:id/balances`
pub async fn user_balances(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Balance>>>, AppError> {
    let balances = state.balances.get_balances(&UserId::new(user_id))?;
    Ok(Json(ApiResponse::ok(balances)))
}
