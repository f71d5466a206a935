//! API models for favorites.

use crate::db::models::favorites::FavoriteDBResponse;
use crate::types::{BookId, FavoriteId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteRequest {
    pub book_id: BookId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteResponse {
    pub id: FavoriteId,
    pub book_id: BookId,
    pub title: String,
    pub author_name: String,
    pub price: Decimal,
    pub cover_url: Option<String>,
    pub quantity: i32,
    pub added_at: DateTime<Utc>,
}

impl From<FavoriteDBResponse> for FavoriteResponse {
    fn from(db: FavoriteDBResponse) -> Self {
        Self {
            id: db.id,
            book_id: db.book_id,
            title: db.book_name,
            author_name: db.author_name,
            price: db.price,
            cover_url: db.cover_url,
            quantity: db.quantity,
            added_at: db.added_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleFavoriteResponse {
    pub book_id: BookId,
    pub is_favorite: bool,
}
