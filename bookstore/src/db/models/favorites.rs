//! Database models for favorites.

use crate::types::{BookId, FavoriteId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A favorite joined with its book and author
#[derive(Debug, Clone)]
pub struct FavoriteDBResponse {
    pub id: FavoriteId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub added_at: DateTime<Utc>,
    pub book_name: String,
    pub price: Decimal,
    pub cover_url: Option<String>,
    pub quantity: i32,
    pub author_name: String,
}
