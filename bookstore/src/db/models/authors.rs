//! Database models for authors.

use crate::types::AuthorId;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct AuthorCreateDBRequest {
    pub name: String,
    pub age: i32,
}

#[derive(Debug, Clone, Default)]
pub struct AuthorUpdateDBRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct AuthorDBResponse {
    pub id: AuthorId,
    pub name: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
}
