//! Public market data endpoints

use crate::error::AppError;
use crate::models::ApiResponse;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use types::book::{OrderBookSnapshot, Ticker};
use types::ids::Symbol;
use types::store::{TickerStore, TradeStore};
use types::trade::Trade;

const DEFAULT_DEPTH: usize = 20;
const DEFAULT_TRADE_LIMIT: usize = 20;
const MAX_TRADE_LIMIT: usize = 500;

fn parse_symbol(raw: String) -> Result<Symbol, AppError> {
    Symbol::try_new(raw).ok_or_else(|| AppError::BadRequest("symbol must be in BASE-QUOTE format".into()))
}

#[derive(Debug, Deserialize)]
pub struct DepthQuery {
    pub depth: Option<usize>,
}

/// `GET /api/v1/orderbook/:symbol?depth=N`
pub async fn order_book(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<DepthQuery>,
) -> Result<Json<ApiResponse<OrderBookSnapshot>>, AppError> {
    let symbol = parse_symbol(symbol)?;
    let depth = query.depth.unwrap_or(DEFAULT_DEPTH).max(1);

    match state.exchange.order_book(&symbol, depth) {
        Some(book) => Ok(Json(ApiResponse::ok(book))),
        None => Err(AppError::NotFound(format!("unknown symbol: {symbol}"))),
    }
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// `GET /api/v1/trades/:symbol?limit=N`
pub async fn recent_trades(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<Trade>>>, AppError> {
    let symbol = parse_symbol(symbol)?;
    if !state.exchange.symbols().contains(&symbol) {
        return Err(AppError::NotFound(format!("unknown symbol: {symbol}")));
    }
    let limit = query
        .limit
        .unwrap_or(DEFAULT_TRADE_LIMIT)
        .clamp(1, MAX_TRADE_LIMIT);

    let trades = state.trades.get_recent_trades(&symbol, limit)?;
    Ok(Json(ApiResponse::ok(trades)))
}

/// `GET /api/v1/tickers/:symbol`
pub async fn ticker(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<Ticker>>, AppError> {
    let symbol = parse_symbol(symbol)?;
    match state.tickers.get_ticker(&symbol)? {
        Some(ticker) => Ok(Json(ApiResponse::ok(ticker))),
        None => Err(AppError::NotFound(format!("unknown symbol: {symbol}"))),
    }
}

/// `GET /api/v1/tickers`
pub async fn all_tickers(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Ticker>>>, AppError> {
    Ok(Json(ApiResponse::ok(state.tickers.get_all_tickers()?)))
}

/// `GET /api/v1/symbols`
pub async fn symbols(State(state): State<AppState>) -> Json<ApiResponse<Vec<Symbol>>> {
    Json(ApiResponse::ok(state.exchange.symbols()))
}

/// `GET /health`
pub async fn health() -> Json<ApiResponse<Value>> {
    Json(ApiResponse::ok(json!({"status": "healthy"})))
}
