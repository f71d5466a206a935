//! Database repository for favorites.

use crate::db::{errors::Result, models::favorites::FavoriteDBResponse};
use crate::types::{BookId, FavoriteId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct Favorite {
    pub favorite_id: FavoriteId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub added_at: DateTime<Utc>,
    pub book_name: String,
    pub price: Decimal,
    pub cover_url: Option<String>,
    pub quantity: i32,
    pub author_name: String,
}

impl From<Favorite> for FavoriteDBResponse {
    fn from(fav: Favorite) -> Self {
        Self {
            id: fav.favorite_id,
            user_id: fav.user_id,
            book_id: fav.book_id,
            added_at: fav.added_at,
            book_name: fav.book_name,
            price: fav.price,
            cover_url: fav.cover_url,
            quantity: fav.quantity,
            author_name: fav.author_name,
        }
    }
}

pub struct Favorites<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Favorites<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn list_for_user(&mut self, user_id: UserId) -> Result<Vec<FavoriteDBResponse>> {
        let favorites = sqlx::query_as::<_, Favorite>(
            r#"
            SELECT f.favorite_id, f.user_id, f.book_id, f.added_at,
                   b.name AS book_name, b.price, b.cover_url, b.quantity,
                   a.name AS author_name
            FROM favorites f
            JOIN books b ON b.book_id = f.book_id
            JOIN authors a ON a.author_id = b.author_id
            WHERE f.user_id = $1
            ORDER BY f.added_at DESC, f.favorite_id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(favorites.into_iter().map(Into::into).collect())
    }

    /// Bookmark a book. A second add for the same pair fails with a unique violation.
    #[instrument(skip(self), err)]
    pub async fn add(&mut self, user_id: UserId, book_id: BookId) -> Result<FavoriteId> {
        let id: FavoriteId = sqlx::query_scalar("INSERT INTO favorites (user_id, book_id) VALUES ($1, $2) RETURNING favorite_id")
            .bind(user_id)
            .bind(book_id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(id)
    }

    #[instrument(skip(self), err)]
    pub async fn is_favorite(&mut self, user_id: UserId, book_id: BookId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM favorites WHERE user_id = $1 AND book_id = $2)")
            .bind(user_id)
            .bind(book_id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(exists)
    }

    /// Delete a favorite only if it belongs to `user_id`
    #[instrument(skip(self), err)]
    pub async fn remove(&mut self, user_id: UserId, favorite_id: FavoriteId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE favorite_id = $1 AND user_id = $2")
            .bind(favorite_id)
            .bind(user_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    pub async fn remove_book(&mut self, user_id: UserId, book_id: BookId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND book_id = $2")
            .bind(user_id)
            .bind(book_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::errors::DbError;
    use crate::test_utils::{create_test_author, create_test_book, create_test_user};
    use sqlx::PgPool;

    #[sqlx::test(migrations = "./migrations/storefront")]
    #[test_log::test]
    async fn test_favorite_cannot_be_added_twice(pool: PgPool) {
        let user = create_test_user(&pool, false).await;
        let author = create_test_author(&pool, "Author").await;
        let book = create_test_book(&pool, author.id, "Loved", 1, Decimal::ONE).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut favorites = Favorites::new(&mut conn);

        favorites.add(user.id, book.id).await.unwrap();
        let err = favorites.add(user.id, book.id).await.unwrap_err();
        match err {
            DbError::UniqueViolation { table, .. } => assert_eq!(table.as_deref(), Some("favorites")),
            other => panic!("expected unique violation, got {other:?}"),
        }

        assert!(favorites.is_favorite(user.id, book.id).await.unwrap());
        assert_eq!(favorites.list_for_user(user.id).await.unwrap().len(), 1);
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    #[test_log::test]
    async fn test_remove_checks_owner(pool: PgPool) {
        let owner = create_test_user(&pool, false).await;
        let stranger = create_test_user(&pool, false).await;
        let author = create_test_author(&pool, "Author").await;
        let book = create_test_book(&pool, author.id, "Mine", 1, Decimal::ONE).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut favorites = Favorites::new(&mut conn);
        let id = favorites.add(owner.id, book.id).await.unwrap();

        assert!(!favorites.remove(stranger.id, id).await.unwrap());
        assert!(favorites.remove(owner.id, id).await.unwrap());
        assert!(!favorites.remove_book(owner.id, book.id).await.unwrap());
    }

    #[sqlx::test(migrations = "./migrations/storefront")]
    #[test_log::test]
    async fn test_deleting_book_cascades(pool: PgPool) {
        let user = create_test_user(&pool, false).await;
        let author = create_test_author(&pool, "Author").await;
        let book = create_test_book(&pool, author.id, "Gone", 1, Decimal::ONE).await;

        let mut conn = pool.acquire().await.unwrap();
        Favorites::new(&mut conn).add(user.id, book.id).await.unwrap();

        sqlx::query("DELETE FROM books WHERE book_id = $1")
            .bind(book.id)
            .execute(&mut *conn)
            .await
            .unwrap();

        assert!(Favorites::new(&mut conn).list_for_user(user.id).await.unwrap().is_empty());
    }
}
