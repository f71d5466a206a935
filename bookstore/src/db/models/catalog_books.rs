//! Database models for the bazar catalog service.

use crate::types::BookId;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct CatalogBookCreateDBRequest {
    pub title: String,
    pub author: String,
    pub price: Decimal,
    pub quantity: i32,
    pub topic: String,
    pub description: String,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct CatalogBookUpdateDBRequest {
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogBookDBResponse {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub price: Decimal,
    pub quantity: i32,
    pub topic: String,
    pub description: String,
}
