//! Database models for cart lines.

use crate::types::{BookId, CartItemId, UserId};
use rust_decimal::Decimal;

/// A cart line joined with the book it refers to
#[derive(Debug, Clone)]
pub struct CartLineDBResponse {
    pub id: CartItemId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub quantity: i32,
    pub book_name: String,
    pub isbn: String,
    pub price: Decimal,
    pub cover_url: Option<String>,
    /// Stock currently on the shelf
    pub stock: i32,
    pub author_name: String,
}

impl CartLineDBResponse {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}
