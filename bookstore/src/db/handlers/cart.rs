//! Database repository for cart lines.

use crate::db::{errors::Result, models::cart::CartLineDBResponse};
use crate::types::{BookId, CartItemId, UserId};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

const SELECT_LINES: &str = r#"
    SELECT c.cart_id, c.user_id, c.book_id, c.quantity,
           b.name AS book_name, b.isbn, b.price, b.cover_url, b.quantity AS stock,
           a.name AS author_name
    FROM cart_items c
    JOIN books b ON b.book_id = c.book_id
    JOIN authors a ON a.author_id = b.author_id
"#;

#[derive(Debug, Clone, FromRow)]
struct CartLine {
    pub cart_id: CartItemId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub quantity: i32,
    pub book_name: String,
    pub isbn: String,
    pub price: Decimal,
    pub cover_url: Option<String>,
    pub stock: i32,
    pub author_name: String,
}

impl From<CartLine> for CartLineDBResponse {
    fn from(line: CartLine) -> Self {
        Self {
            id: line.cart_id,
            user_id: line.user_id,
            book_id: line.book_id,
            quantity: line.quantity,
            book_name: line.book_name,
            isbn: line.isbn,
            price: line.price,
            cover_url: line.cover_url,
            stock: line.stock,
            author_name: line.author_name,
        }
    }
}

pub struct Carts<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Carts<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn list_for_user(&mut self, user_id: UserId) -> Result<Vec<CartLineDBResponse>> {
        let lines = sqlx::query_as::<_, CartLine>(&format!("{SELECT_LINES} WHERE c.user_id = $1 ORDER BY c.added_at, c.cart_id"))
            .bind(user_id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(lines.into_iter().map(Into::into).collect())
    }

    /// Read the user's cart while holding row locks on the books it references.
    ///
    /// Concurrent checkouts touching the same books queue up behind the lock, so the stock
    /// check and the decrement that follow see a consistent quantity.
    #[instrument(skip(self), err)]
    pub async fn lock_for_checkout(&mut self, user_id: UserId) -> Result<Vec<CartLineDBResponse>> {
        let lines = sqlx::query_as::<_, CartLine>(&format!(
            "{SELECT_LINES} WHERE c.user_id = $1 ORDER BY b.book_id FOR UPDATE OF b"
        ))
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(lines.into_iter().map(Into::into).collect())
    }

    /// A single line, whoever owns it. Callers check `user_id`.
    #[instrument(skip(self), err)]
    pub async fn get_line(&mut self, cart_id: CartItemId) -> Result<Option<CartLineDBResponse>> {
        let line = sqlx::query_as::<_, CartLine>(&format!("{SELECT_LINES} WHERE c.cart_id = $1"))
            .bind(cart_id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(line.map(Into::into))
    }

    /// Add copies of a book, merging with an existing line for the same book.
    #[instrument(skip(self), err)]
    pub async fn add(&mut self, user_id: UserId, book_id: BookId, quantity: i32) -> Result<CartItemId> {
        let cart_id: CartItemId = sqlx::query_scalar(
            r#"
            INSERT INTO cart_items (user_id, book_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT ON CONSTRAINT cart_items_user_book_key
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
            RETURNING cart_id
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(quantity)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(cart_id)
    }

    #[instrument(skip(self), err)]
    pub async fn set_quantity(&mut self, cart_id: CartItemId, quantity: i32) -> Result<bool> {
        let result = sqlx::query("UPDATE cart_items SET quantity = $2 WHERE cart_id = $1")
            .bind(cart_id)
            .bind(quantity)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    pub async fn remove(&mut self, cart_id: CartItemId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Empty the user's cart, returning how many lines went away
    #[instrument(skip(self), err)]
    pub async fn clear(&mut self, user_id: UserId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected())
    }
}
