//! Database models for storefront books.

use crate::types::{AuthorId, BookId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Every writable column of a book.
///
/// Used for both inserts and updates: an update replaces the whole row.
#[derive(Debug, Clone)]
pub struct BookDBRequest {
    pub isbn: String,
    pub name: String,
    pub cant_pages: Option<i32>,
    pub price: Decimal,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub quantity: i32,
    pub author_id: AuthorId,
}

/// A book joined with its author's name
#[derive(Debug, Clone)]
pub struct BookDBResponse {
    pub id: BookId,
    pub isbn: String,
    pub name: String,
    pub cant_pages: Option<i32>,
    pub price: Decimal,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub quantity: i32,
    pub author_id: AuthorId,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
}
