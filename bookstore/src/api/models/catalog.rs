//! API models for authors and books.

use crate::db::models::{authors::AuthorDBResponse, books::BookDBResponse};
use crate::types::{AuthorId, BookId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorCreate {
    pub name: Option<String>,
    pub age: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorResponse {
    pub id: AuthorId,
    pub name: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
}

impl From<AuthorDBResponse> for AuthorResponse {
    fn from(db: AuthorDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            age: db.age,
            created_at: db.created_at,
        }
    }
}

/// Body for creating or replacing a book
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookRequest {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub pages: Option<i32>,
    pub price: Option<Decimal>,
    pub author_id: Option<AuthorId>,
    pub cover_url: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: BookId,
    pub isbn: String,
    pub title: String,
    pub pages: Option<i32>,
    pub price: Decimal,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub quantity: i32,
    pub author_id: AuthorId,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<BookDBResponse> for BookResponse {
    fn from(db: BookDBResponse) -> Self {
        Self {
            id: db.id,
            isbn: db.isbn,
            title: db.name,
            pages: db.cant_pages,
            price: db.price,
            description: db.description,
            cover_url: db.cover_url,
            quantity: db.quantity,
            author_id: db.author_id,
            author_name: db.author_name,
            created_at: db.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDetailResponse {
    #[serde(flatten)]
    pub book: BookResponse,
    /// Always false for anonymous visitors
    pub is_favorite: bool,
}
