//! API models for the cart and checkout summary.

use crate::db::models::cart::CartLineDBResponse;
use crate::types::{BookId, CartItemId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn one() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddToCartRequest {
    pub book_id: BookId,
    #[serde(default = "one")]
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCartRequest {
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineResponse {
    pub cart_id: CartItemId,
    pub book_id: BookId,
    pub quantity: i32,
    pub title: String,
    pub isbn: String,
    pub price: Decimal,
    pub cover_url: Option<String>,
    pub stock: i32,
    pub author_name: String,
    pub total_price: Decimal,
}

impl From<CartLineDBResponse> for CartLineResponse {
    fn from(db: CartLineDBResponse) -> Self {
        let total_price = db.line_total();
        Self {
            cart_id: db.id,
            book_id: db.book_id,
            quantity: db.quantity,
            title: db.book_name,
            isbn: db.isbn,
            price: db.price,
            cover_url: db.cover_url,
            stock: db.stock,
            author_name: db.author_name,
            total_price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    pub items: Vec<CartLineResponse>,
    pub total: Decimal,
}

impl From<Vec<CartLineDBResponse>> for CartResponse {
    fn from(lines: Vec<CartLineDBResponse>) -> Self {
        let items: Vec<CartLineResponse> = lines.into_iter().map(Into::into).collect();
        let total = items.iter().map(|line| line.total_price).sum();
        Self { items, total }
    }
}
