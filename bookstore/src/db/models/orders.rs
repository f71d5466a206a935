//! Database models for storefront orders.

use crate::types::{BookId, OrderId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// One priced line going into a new order
#[derive(Debug, Clone)]
pub struct OrderItemDBRequest {
    pub book_id: BookId,
    pub quantity: i32,
    pub price: Decimal,
    pub book_name: String,
}

#[derive(Debug, Clone)]
pub struct OrderCreateDBRequest {
    pub user_id: UserId,
    pub total_amount: Decimal,
    pub items: Vec<OrderItemDBRequest>,
}

#[derive(Debug, Clone)]
pub struct OrderDBResponse {
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub username: Option<String>,
    pub total_amount: Decimal,
    pub order_date: DateTime<Utc>,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct OrderItemDBResponse {
    pub id: i32,
    pub order_id: OrderId,
    /// `None` once the book has been deleted from the catalog
    pub book_id: Option<BookId>,
    pub quantity: i32,
    pub price: Decimal,
    pub book_name: String,
    pub cover_url: Option<String>,
}
