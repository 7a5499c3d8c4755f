//! Order admission and cancellation

use crate::error::AppError;
use crate::models::{ApiResponse, PlaceOrderRequest};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use types::ids::{OrderId, Symbol};
use types::order::Order;
use uuid::Uuid;

/// `POST /api/v1/orders`
pub async fn place_order(
    State(state): State<AppState>,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<Json<ApiResponse<Order>>, AppError> {
    let order = payload.into_order()?;
    let admitted = state.exchange.submit(order)?;
    Ok(Json(ApiResponse::ok(admitted)))
}

#[derive(Debug, Deserialize)]
pub struct CancelQuery {
    pub symbol: String,
}

/// `DELETE /api/v1/orders/:id?symbol=…`
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<CancelQuery>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let symbol = Symbol::try_new(query.symbol)
        .ok_or_else(|| AppError::BadRequest("symbol must be in BASE-QUOTE format".into()))?;
    let order_id = OrderId::from_uuid(id);

    if state.exchange.cancel(&order_id, &symbol) {
        Ok(Json(ApiResponse::success()))
    } else {
        Err(AppError::NotFound(format!("order not found: {order_id}")))
    }
}
