//! Request and response models

use crate::error::AppError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::ids::{Symbol, UserId};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderType, Side, TimeInForce};

/// Body of `POST /api/v1/orders`
///
/// Prices and quantities arrive as raw decimals (string or number) and are
/// validated into the domain newtypes here.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub user_id: String,
    pub symbol: String,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub quantity: Decimal,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub stop_price: Option<Decimal>,
    #[serde(default)]
    pub time_in_force: Option<TimeInForce>,
}

impl PlaceOrderRequest {
    /// Validate into a domain order; any failure is a 400
    pub fn into_order(self) -> Result<Order, AppError> {
        let symbol = Symbol::try_new(self.symbol)
            .ok_or_else(|| AppError::BadRequest("symbol must be in BASE-QUOTE format".into()))?;
        let quantity = Quantity::try_new(self.quantity)
            .ok_or_else(|| AppError::BadRequest("quantity must be positive".into()))?;
        let price = self
            .price
            .map(|p| {
                Price::try_new(p).ok_or_else(|| AppError::BadRequest("price must be positive".into()))
            })
            .transpose()?;
        let stop_price = self
            .stop_price
            .map(|p| {
                Price::try_new(p)
                    .ok_or_else(|| AppError::BadRequest("stop price must be positive".into()))
            })
            .transpose()?;

        Ok(Order::new(
            UserId::new(self.user_id),
            symbol,
            self.side,
            self.order_type,
            quantity,
            price,
            stop_price,
            self.time_in_force.unwrap_or_default(),
        ))
    }
}

/// The REST envelope: `{success, data?, error?}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    /// Success with no payload (e.g. cancel)
    pub fn success() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }
}
