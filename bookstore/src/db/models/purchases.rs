//! Database models for the bazar order service.

use crate::types::BookId;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// One purchased copy. Several rows may share an `order_id`.
#[derive(Debug, Clone)]
pub struct PurchaseCreateDBRequest {
    pub order_id: String,
    pub item_id: BookId,
    pub timestamp: NaiveDateTime,
    pub price: Decimal,
    pub title: String,
    pub author: String,
    pub shipping_address: Option<String>,
    pub payment_method: Option<String>,
    pub original_price: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    pub discount_applied: bool,
}

#[derive(Debug, Clone)]
pub struct PurchaseDBResponse {
    pub id: i32,
    pub order_id: String,
    pub item_id: BookId,
    pub timestamp: NaiveDateTime,
    pub price: Decimal,
    pub title: String,
    pub author: String,
    pub shipping_address: Option<String>,
    pub payment_method: Option<String>,
    pub original_price: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    pub discount_applied: bool,
}

/// Purchase rows rolled up by `order_id`
#[derive(Debug, Clone)]
pub struct OrderSummaryDBResponse {
    pub order_id: String,
    pub order_date: NaiveDateTime,
    pub total_amount: Decimal,
    pub item_count: i64,
}
