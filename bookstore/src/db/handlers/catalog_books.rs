//! Database repository for the bazar catalog's stock table.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::catalog_books::{CatalogBookCreateDBRequest, CatalogBookDBResponse, CatalogBookUpdateDBRequest},
};
use crate::types::BookId;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

/// Filter for listing catalog books
#[derive(Debug, Clone, Default)]
pub struct CatalogBookFilter {
    /// Case-insensitive substring matched against topic, title and author
    pub search: Option<String>,
}

impl CatalogBookFilter {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct CatalogBook {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub price: Decimal,
    pub quantity: i32,
    pub topic: String,
    pub description: String,
}

impl From<CatalogBook> for CatalogBookDBResponse {
    fn from(book: CatalogBook) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            price: book.price,
            quantity: book.quantity,
            topic: book.topic,
            description: book.description,
        }
    }
}

pub struct CatalogBooks<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for CatalogBooks<'c> {
    type CreateRequest = CatalogBookCreateDBRequest;
    type UpdateRequest = CatalogBookUpdateDBRequest;
    type Response = CatalogBookDBResponse;
    type Id = BookId;
    type Filter = CatalogBookFilter;

    #[instrument(skip(self, request), fields(title = %request.title), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let book = sqlx::query_as::<_, CatalogBook>(
            r#"
            INSERT INTO books (title, author, price, quantity, topic, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&request.title)
        .bind(&request.author)
        .bind(request.price)
        .bind(request.quantity)
        .bind(&request.topic)
        .bind(&request.description)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(book.into())
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let book = sqlx::query_as::<_, CatalogBook>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(book.map(Into::into))
    }

    #[instrument(skip(self, filter), fields(search = ?filter.search), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let pattern = filter.search.as_ref().map(|term| format!("%{}%", term.to_lowercase()));

        let books = sqlx::query_as::<_, CatalogBook>(
            r#"
            SELECT * FROM books
            WHERE $1::TEXT IS NULL
               OR LOWER(topic) LIKE $1
               OR LOWER(title) LIKE $1
               OR LOWER(author) LIKE $1
            ORDER BY id
            "#,
        )
        .bind(pattern)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(books.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let book = sqlx::query_as::<_, CatalogBook>(
            r#"
            UPDATE books SET
                price = COALESCE($2, price),
                quantity = COALESCE($3, quantity)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.price)
        .bind(request.quantity)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(book.into())
    }
}

impl<'c> CatalogBooks<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books").fetch_one(&mut *self.db).await?;
        Ok(count)
    }

    /// Put `delta` more copies on the shelf. `None` when the book does not exist.
    #[instrument(skip(self), err)]
    pub async fn add_quantity(&mut self, id: BookId, delta: i32) -> Result<Option<CatalogBookDBResponse>> {
        let book = sqlx::query_as::<_, CatalogBook>("UPDATE books SET quantity = quantity + $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(delta)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(book.map(Into::into))
    }
}
