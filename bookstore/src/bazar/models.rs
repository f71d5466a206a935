//! Wire models shared by the bazar services.
//!
//! Prices go over the wire as JSON numbers (`59.99`), which is what the browser client and
//! the services themselves parse.

use crate::db::models::{catalog_books::CatalogBookDBResponse, purchases::PurchaseDBResponse};
use crate::types::BookId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Timestamp format used in every bazar response
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogBook {
    pub id: BookId,
    pub title: String,
    pub author: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: i32,
    pub topic: String,
    pub description: String,
}

impl From<CatalogBookDBResponse> for CatalogBook {
    fn from(db: CatalogBookDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            author: db.author,
            price: db.price,
            quantity: db.quantity,
            topic: db.topic,
            description: db.description,
        }
    }
}

/// `{"book": ...}` as returned by `/info` and `/update`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookEnvelope {
    pub book: Option<CatalogBook>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BooksEnvelope {
    pub books: Vec<CatalogBook>,
}

/// Body of `PUT /update/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogUpdateRequest {
    #[serde(default, with = "rust_decimal::serde::float_option", skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
}

/// Body of `POST /add-stock`: either a whole new book (`is_new`) or a restock of `item_id`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AddStockRequest {
    pub is_new: bool,
    pub item_id: Option<BookId>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub topic: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddStockResponse {
    pub success: bool,
    pub message: String,
    pub book: CatalogBook,
}

/// One row of `GET /orders`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: String,
    pub order_date: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub item_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersEnvelope {
    pub orders: Vec<OrderSummary>,
}

/// The `order` object of `GET /orders/{order_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub summary: OrderSummary,
    pub shipping_address: Option<String>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: String,
    pub item_id: BookId,
    pub title: String,
    pub author: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub timestamp: String,
}

impl From<PurchaseDBResponse> for OrderItem {
    fn from(db: PurchaseDBResponse) -> Self {
        Self {
            id: db.id,
            order_id: db.order_id,
            item_id: db.item_id,
            title: db.title,
            author: db.author,
            price: db.price,
            timestamp: db.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetailEnvelope {
    pub order: OrderDetail,
    pub items: Vec<OrderItem>,
}
