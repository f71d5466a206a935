//! API models for storefront orders.

use crate::db::models::orders::{OrderDBResponse, OrderItemDBResponse};
use crate::types::{BookId, OrderId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub username: Option<String>,
    pub total_amount: Decimal,
    pub order_date: DateTime<Utc>,
    pub status: String,
}

impl From<OrderDBResponse> for OrderResponse {
    fn from(db: OrderDBResponse) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            username: db.username,
            total_amount: db.total_amount,
            order_date: db.order_date,
            status: db.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemResponse {
    pub id: i32,
    pub book_id: Option<BookId>,
    pub title: String,
    pub quantity: i32,
    pub price: Decimal,
    pub total_price: Decimal,
    pub cover_url: Option<String>,
}

impl From<OrderItemDBResponse> for OrderItemResponse {
    fn from(db: OrderItemDBResponse) -> Self {
        Self {
            id: db.id,
            book_id: db.book_id,
            title: db.book_name,
            quantity: db.quantity,
            total_price: db.price * Decimal::from(db.quantity),
            price: db.price,
            cover_url: db.cover_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetailResponse {
    pub order: OrderResponse,
    pub items: Vec<OrderItemResponse>,
}
